//! Scroll-synchronised section tracking for the single-page layout.
//!
//! [`ScrollSpy`] derives the highlighted navigation item from the scroll
//! position; [`navigate_to`] computes where to smooth-scroll for a nav click.
//! Both read geometry through [`Viewport`], re-querying section positions on
//! every call because layout can shift after images or fonts load.

pub mod layout;
pub mod navigator;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pixels past a section's top edge before it counts as active.
pub const DEFAULT_SCROLL_OFFSET: f64 = 100.0;
/// Height of the fixed page header that would otherwise cover a target.
pub const DEFAULT_HEADER_HEIGHT: f64 = 80.0;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SectionId {
    Home,
    About,
    Skills,
    Projects,
    Resume,
    Contact,
}

impl SectionId {
    /// Document order of the page.
    pub const ALL: [SectionId; 6] = [
        SectionId::Home,
        SectionId::About,
        SectionId::Skills,
        SectionId::Projects,
        SectionId::Resume,
        SectionId::Contact,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionId::Home => "home",
            SectionId::About => "about",
            SectionId::Skills => "skills",
            SectionId::Projects => "projects",
            SectionId::Resume => "resume",
            SectionId::Contact => "contact",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SectionId::Home => "Home",
            SectionId::About => "About",
            SectionId::Skills => "Skills",
            SectionId::Projects => "Projects",
            SectionId::Resume => "Resume",
            SectionId::Contact => "Contact",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown section: {0}")]
pub struct ParseSectionError(pub String);

impl FromStr for SectionId {
    type Err = ParseSectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ParseSectionError(s.to_string()))
    }
}

/// Read access to the page geometry plus the ability to request a scroll.
pub trait Viewport {
    fn scroll_y(&self) -> f64;
    fn viewport_height(&self) -> f64;
    fn document_height(&self) -> f64;

    /// Top edge of a section within the document, `None` if not mounted.
    fn section_top(&self, id: SectionId) -> Option<f64>;

    /// Top edge of a section relative to the top of the viewport.
    fn section_client_top(&self, id: SectionId) -> Option<f64> {
        self.section_top(id).map(|top| top - self.scroll_y())
    }

    /// Smoothly animate the viewport to `y`.
    fn scroll_to(&mut self, y: f64);
}

/// Tracks which section is active as the page scrolls.
#[derive(Debug, Clone)]
pub struct ScrollSpy {
    sections: Vec<SectionId>,
    offset: f64,
    active: SectionId,
}

impl ScrollSpy {
    pub fn new(sections: Vec<SectionId>, offset: f64, viewport: &impl Viewport) -> Self {
        let active = sections.first().copied().unwrap_or(SectionId::Home);
        let mut spy = Self {
            sections,
            offset,
            active,
        };
        spy.on_scroll(viewport);
        spy
    }

    pub fn active(&self) -> SectionId {
        self.active
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn sections(&self) -> &[SectionId] {
        &self.sections
    }

    pub fn set_offset(&mut self, offset: f64, viewport: &impl Viewport) -> SectionId {
        self.offset = offset;
        self.on_scroll(viewport)
    }

    pub fn set_sections(&mut self, sections: Vec<SectionId>, viewport: &impl Viewport) -> SectionId {
        self.sections = sections;
        self.on_scroll(viewport)
    }

    /// Re-evaluates the active section. Cheap enough to run every frame.
    pub fn on_scroll(&mut self, viewport: &impl Viewport) -> SectionId {
        let scroll_y = viewport.scroll_y();

        // Last qualifying section wins, so the lowest one scrolled past is active.
        let mut candidate = None;
        for &id in &self.sections {
            if let Some(top) = viewport.section_top(id) {
                if scroll_y >= top - self.offset {
                    candidate = Some(id);
                }
            }
        }

        // Short trailing content may never reach the last trigger point.
        if scroll_y + viewport.viewport_height() >= viewport.document_height() {
            if let Some(&last) = self.sections.last() {
                candidate = Some(last);
            }
        }

        match candidate {
            Some(id) if id != self.active => self.active = id,
            _ => {
                if let Some(&first) = self.sections.first() {
                    let above_first = viewport
                        .section_top(first)
                        .is_some_and(|top| scroll_y < top - self.offset);
                    if above_first {
                        self.active = first;
                    }
                }
            }
        }

        self.active
    }
}

/// Scrolls so `target` sits just below the fixed header.
///
/// Returns the requested position, or `None` (and does nothing) when the
/// section is not mounted.
pub fn navigate_to(
    viewport: &mut impl Viewport,
    target: SectionId,
    header_height: f64,
) -> Option<f64> {
    let Some(client_top) = viewport.section_client_top(target) else {
        tracing::debug!(section = %target, "navigation target not mounted");
        return None;
    };
    let y = client_top + viewport.scroll_y() - header_height;
    viewport.scroll_to(y);
    Some(y)
}
