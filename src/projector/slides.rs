//! Content-Type Registry
//!
//! Projector elements reference their content by name (`core/clock`,
//! `core/countdown`, ...). The registry maps those names to slide
//! definitions and resolves a projector's element list into renderable
//! elements. An element whose content type nobody registered is excluded
//! and reported as an error rather than rendered blank -- the rest of the
//! list still renders.

use crate::projector::model::{Projector, ProjectorElement};
use std::collections::HashMap;

/// Content-type name of the clock element
pub const CLOCK_SLIDE: &str = "core/clock";
/// Content-type name of the countdown element
pub const COUNTDOWN_SLIDE: &str = "core/countdown";
/// Content-type name of the message element
pub const MESSAGE_SLIDE: &str = "core/projector-message";

/// Definition of one registered content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideDef {
    /// Template the rendering layer uses for this content type
    pub template: String,
}

/// Registry of renderable content types
#[derive(Debug, Default)]
pub struct SlideRegistry {
    slides: HashMap<String, SlideDef>,
}

impl SlideRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the core content types registered
    pub fn with_core_slides() -> Self {
        let mut registry = Self::new();
        registry.register(CLOCK_SLIDE, "core/slide_clock.html");
        registry.register(COUNTDOWN_SLIDE, "core/slide_countdown.html");
        registry.register(MESSAGE_SLIDE, "core/slide_message.html");
        registry
    }

    /// Register a content type
    pub fn register(&mut self, name: impl Into<String>, template: impl Into<String>) {
        self.slides.insert(
            name.into(),
            SlideDef {
                template: template.into(),
            },
        );
    }

    /// Whether a content type is registered
    pub fn contains(&self, name: &str) -> bool {
        self.slides.contains_key(name)
    }

    /// Resolve a projector's elements into renderable elements.
    ///
    /// Each element gets its template attached; elements with an
    /// unregistered content type are excluded and logged, the rest still
    /// render.
    pub fn elements_for(&self, projector: &Projector) -> Vec<ProjectorElement> {
        let mut elements = Vec::with_capacity(projector.elements.len());
        for element in &projector.elements {
            match self.slides.get(&element.name) {
                Some(slide) => {
                    let mut element = element.clone();
                    element.template = Some(slide.template.clone());
                    elements.push(element);
                }
                None => {
                    tracing::error!("[Projector] Unknown slide: {}", element.name);
                }
            }
        }
        elements
    }
}
