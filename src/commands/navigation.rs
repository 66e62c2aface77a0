use crate::navigation::layout::LayoutSnapshot;
use crate::navigation::navigator::Navigator;
use crate::navigation::SectionId;
use serde::Serialize;
use tauri::State;

#[derive(Debug, Serialize)]
pub struct NavItem {
    pub id: SectionId,
    pub label: &'static str,
}

#[tauri::command]
pub fn get_sections(nav: State<'_, Navigator>) -> Vec<NavItem> {
    nav.sections()
        .iter()
        .map(|&id| NavItem {
            id,
            label: id.label(),
        })
        .collect()
}

#[tauri::command]
pub fn get_active_section(nav: State<'_, Navigator>) -> SectionId {
    nav.active()
}

/// Called by the webview on every scroll event with fresh measurements.
#[tauri::command]
pub fn update_scroll(nav: State<'_, Navigator>, layout: LayoutSnapshot) -> SectionId {
    nav.update(&layout)
}

/// Returns where the webview should smooth-scroll, or `null` to do nothing.
#[tauri::command]
pub fn navigate_to_section(
    nav: State<'_, Navigator>,
    section: String,
    layout: LayoutSnapshot,
) -> Option<f64> {
    nav.navigate(&section, &layout)
}
