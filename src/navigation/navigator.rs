use super::layout::LayoutSnapshot;
use super::{navigate_to, ScrollSpy, SectionId};
use std::sync::Mutex;

/// Shell-side scroll-spy state, fed one layout snapshot per scroll tick.
///
/// The spy is created from the first snapshot so its initial evaluation
/// sees real geometry.
pub struct Navigator {
    sections: Vec<SectionId>,
    offset: f64,
    header_height: f64,
    spy: Mutex<Option<ScrollSpy>>,
}

impl Navigator {
    pub fn new(sections: Vec<SectionId>, offset: f64, header_height: f64) -> Self {
        Self {
            sections,
            offset,
            header_height,
            spy: Mutex::new(None),
        }
    }

    pub fn sections(&self) -> &[SectionId] {
        &self.sections
    }

    /// Last computed active section; the first section before any snapshot.
    pub fn active(&self) -> SectionId {
        let spy = self.spy.lock().unwrap_or_else(|e| e.into_inner());
        match spy.as_ref() {
            Some(spy) => spy.active(),
            None => self.sections.first().copied().unwrap_or(SectionId::Home),
        }
    }

    pub fn update(&self, layout: &LayoutSnapshot) -> SectionId {
        let mut spy = self.spy.lock().unwrap_or_else(|e| e.into_inner());
        match spy.as_mut() {
            Some(spy) => spy.on_scroll(layout),
            None => spy
                .insert(ScrollSpy::new(self.sections.clone(), self.offset, layout))
                .active(),
        }
    }

    /// Target scroll position for a nav click on `section`.
    ///
    /// Unknown ids and unmounted sections yield `None`.
    pub fn navigate(&self, section: &str, layout: &LayoutSnapshot) -> Option<f64> {
        let target = match section.parse::<SectionId>() {
            Ok(target) => target,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring navigation request");
                return None;
            }
        };
        let mut layout = layout.clone();
        navigate_to(&mut layout, target, self.header_height)?;
        layout.requested_scroll
    }
}
