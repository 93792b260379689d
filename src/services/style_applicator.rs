//! Style Applicator — turns theme settings into inline style directives and
//! writes them onto a page's root element.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::services::popup::PopupForm;
use crate::types::settings::{BackgroundPattern, ThemeSettings, DEFAULT_FONT_SIZE};
use crate::types::style::{PreviewStyle, StyleDirectives, StyleProperty, ThemeState, MARKER_ATTRIBUTE};

const DOTS_GRADIENT: &str = "radial-gradient(circle, rgba(255,255,255,0.1) 1px, transparent 1px)";
const STRIPES_GRADIENT: &str = "repeating-linear-gradient(45deg, transparent, transparent 10px, rgba(255,255,255,0.05) 10px, rgba(255,255,255,0.05) 20px)";
const GRID_GRADIENT: &str = "linear-gradient(rgba(255,255,255,0.05) 1px, transparent 1px), linear-gradient(90deg, rgba(255,255,255,0.05) 1px, transparent 1px)";

/// CSS `background-image` for a pattern, or `None` when it has no gradient.
pub fn background_pattern_css(pattern: &BackgroundPattern) -> Option<&'static str> {
    match pattern {
        BackgroundPattern::Dots => Some(DOTS_GRADIENT),
        BackgroundPattern::Stripes => Some(STRIPES_GRADIENT),
        BackgroundPattern::Grid => Some(GRID_GRADIENT),
        BackgroundPattern::None | BackgroundPattern::Other(_) => None,
    }
}

/// Computes the inline style directives for `settings`.
///
/// Pure: the same settings always produce the same directives. Out-of-range
/// darkness and font size values are clamped first.
pub fn compute_style(settings: &ThemeSettings) -> StyleDirectives {
    let darkness = settings.clamped_darkness();
    let font_size = settings.clamped_font_size();

    let filter = if darkness > 0 {
        format!("brightness({}%)", 100 - darkness)
    } else {
        String::new()
    };

    // Only override the page's font size when it differs from the default.
    let font_size = if font_size != DEFAULT_FONT_SIZE {
        format!("{}px", font_size)
    } else {
        String::new()
    };

    StyleDirectives {
        filter,
        color_scheme: match settings.color_scheme.as_str() {
            "default" => "dark".to_string(),
            other => other.to_string(),
        },
        font_size,
        background_image: background_pattern_css(&settings.background_pattern)
            .unwrap_or_default()
            .to_string(),
    }
}

/// Computes the popup preview box style from the form's current values.
///
/// Unlike [`compute_style`] the preview always shows every property, so the
/// user sees the effect of each control.
pub fn compute_preview(form: &PopupForm) -> PreviewStyle {
    if !form.enabled {
        return PreviewStyle {
            directives: StyleDirectives::default(),
            label: "Theme Disabled".to_string(),
        };
    }

    let darkness = if form.darkness_level.is_finite() {
        form.darkness_level.trunc() as i64
    } else {
        ThemeSettings::default().darkness_level
    };
    let font_size = if form.font_size.is_finite() {
        form.font_size.trunc() as i64
    } else {
        DEFAULT_FONT_SIZE
    };

    PreviewStyle {
        directives: StyleDirectives {
            filter: format!("brightness({}%)", 100 - darkness),
            color_scheme: form.color_scheme.as_str().to_string(),
            font_size: format!("{}px", font_size),
            background_image: background_pattern_css(&form.background_pattern)
                .unwrap_or("none")
                .to_string(),
        },
        label: "Preview".to_string(),
    }
}

/// The root element of a page, reduced to what the theme touches.
pub trait DocumentRoot {
    /// Current inline value of `property`, empty when unset.
    fn style_property(&self, property: StyleProperty) -> String;
    /// Sets an inline property; an empty value clears it.
    fn set_style_property(&mut self, property: StyleProperty, value: &str);
    fn attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&mut self, name: &str, value: &str);
    fn remove_attribute(&mut self, name: &str);
}

/// A detached root element holding inline styles and attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryDocument {
    inline_style: HashMap<StyleProperty, String>,
    attributes: HashMap<String, String>,
}

impl InMemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document whose root already carries some inline style.
    pub fn with_inline_style(style: &[(StyleProperty, &str)]) -> Self {
        let mut doc = Self::new();
        for (property, value) in style {
            doc.set_style_property(*property, value);
        }
        doc
    }

    /// The root's inline `style` attribute text.
    pub fn css_text(&self) -> String {
        let mut current = StyleDirectives::default();
        for property in StyleProperty::ALL {
            current.set(property, self.style_property(property));
        }
        current.to_css_text()
    }
}

impl DocumentRoot for InMemoryDocument {
    fn style_property(&self, property: StyleProperty) -> String {
        self.inline_style.get(&property).cloned().unwrap_or_default()
    }

    fn set_style_property(&mut self, property: StyleProperty, value: &str) {
        if value.is_empty() {
            self.inline_style.remove(&property);
        } else {
            self.inline_style.insert(property, value.to_string());
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }
}

/// A document shared between the page and the content script task.
#[derive(Debug, Clone, Default)]
pub struct SharedDocument(Arc<Mutex<InMemoryDocument>>);

impl SharedDocument {
    pub fn new(doc: InMemoryDocument) -> Self {
        Self(Arc::new(Mutex::new(doc)))
    }

    /// Locks the document. A poisoned lock still yields the document since
    /// style writes cannot leave it half-updated.
    pub fn lock(&self) -> MutexGuard<'_, InMemoryDocument> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the document's current state.
    pub fn snapshot(&self) -> InMemoryDocument {
        self.lock().clone()
    }
}

impl DocumentRoot for SharedDocument {
    fn style_property(&self, property: StyleProperty) -> String {
        self.lock().style_property(property)
    }

    fn set_style_property(&mut self, property: StyleProperty, value: &str) {
        self.lock().set_style_property(property, value);
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.lock().attribute(name)
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        self.lock().set_attribute(name, value);
    }

    fn remove_attribute(&mut self, name: &str) {
        self.lock().remove_attribute(name);
    }
}

/// Applies and reverts the theme on one document root.
///
/// The page's own inline values are captured once, at construction, and
/// restored verbatim by [`revert`](Self::revert).
pub struct StyleApplicator<D: DocumentRoot> {
    root: D,
    original: StyleDirectives,
}

impl<D: DocumentRoot> StyleApplicator<D> {
    pub fn new(root: D) -> Self {
        let mut original = StyleDirectives::default();
        for property in StyleProperty::ALL {
            original.set(property, root.style_property(property));
        }
        Self { root, original }
    }

    /// Writes all four properties and marks the root as themed.
    pub fn apply(&mut self, directives: &StyleDirectives) {
        for property in StyleProperty::ALL {
            self.root.set_style_property(property, directives.get(property));
        }
        self.root.set_attribute(MARKER_ATTRIBUTE, "true");
    }

    /// Restores the captured inline values and removes the marker.
    pub fn revert(&mut self) {
        for property in StyleProperty::ALL {
            self.root.set_style_property(property, self.original.get(property));
        }
        self.root.remove_attribute(MARKER_ATTRIBUTE);
    }

    pub fn is_active(&self) -> bool {
        self.root.attribute(MARKER_ATTRIBUTE).as_deref() == Some("true")
    }

    /// Whether the theme is applied, read from the marker attribute.
    pub fn state(&self) -> ThemeState {
        ThemeState::from_enabled(self.is_active())
    }

    /// Inline values captured before the theme was first applied.
    pub fn original(&self) -> &StyleDirectives {
        &self.original
    }

    pub fn root(&self) -> &D {
        &self.root
    }
}
