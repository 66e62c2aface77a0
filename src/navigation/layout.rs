use super::{SectionId, Viewport};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct SectionMeasurement {
    pub id: SectionId,
    /// Document-relative top edge (`offsetTop`).
    pub top: f64,
}

/// Page geometry measured by the webview on a scroll tick.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct LayoutSnapshot {
    pub scroll_y: f64,
    pub viewport_height: f64,
    pub document_height: f64,
    #[serde(default)]
    pub sections: Vec<SectionMeasurement>,
    /// Where the page was asked to scroll; the webview performs the animation.
    #[serde(skip)]
    pub requested_scroll: Option<f64>,
}

impl Viewport for LayoutSnapshot {
    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn document_height(&self) -> f64 {
        self.document_height
    }

    fn section_top(&self, id: SectionId) -> Option<f64> {
        self.sections
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.top)
            .filter(|top| top.is_finite())
    }

    fn scroll_to(&mut self, y: f64) {
        self.requested_scroll = Some(y.max(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_webview_json() {
        let layout: LayoutSnapshot = serde_json::from_str(
            r#"{"scroll_y":120.5,"viewport_height":900,"document_height":4200,
                "sections":[{"id":"home","top":0},{"id":"about","top":760}]}"#,
        )
        .unwrap();
        assert_eq!(layout.section_top(SectionId::About), Some(760.0));
        assert_eq!(layout.section_client_top(SectionId::About), Some(639.5));
        assert_eq!(layout.section_top(SectionId::Skills), None);
        assert_eq!(layout.requested_scroll, None);
    }

    #[test]
    fn test_scroll_request_clamped_at_top() {
        let mut layout = LayoutSnapshot::default();
        layout.scroll_to(-80.0);
        assert_eq!(layout.requested_scroll, Some(0.0));
    }
}
