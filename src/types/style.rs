use serde::{Deserialize, Serialize};

/// Attribute set on the document root while the theme is applied.
pub const MARKER_ATTRIBUTE: &str = "data-dark-theme-active";

/// Inline style properties the theme writes on the document root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    Filter,
    ColorScheme,
    FontSize,
    BackgroundImage,
}

impl StyleProperty {
    pub const ALL: [StyleProperty; 4] = [
        StyleProperty::Filter,
        StyleProperty::ColorScheme,
        StyleProperty::FontSize,
        StyleProperty::BackgroundImage,
    ];

    /// Name as exposed on `CSSStyleDeclaration`.
    pub fn dom_name(&self) -> &'static str {
        match self {
            StyleProperty::Filter => "filter",
            StyleProperty::ColorScheme => "colorScheme",
            StyleProperty::FontSize => "fontSize",
            StyleProperty::BackgroundImage => "backgroundImage",
        }
    }

    /// Name as written in CSS text.
    pub fn css_name(&self) -> &'static str {
        match self {
            StyleProperty::Filter => "filter",
            StyleProperty::ColorScheme => "color-scheme",
            StyleProperty::FontSize => "font-size",
            StyleProperty::BackgroundImage => "background-image",
        }
    }
}

/// Computed inline style values for the document root.
///
/// An empty string means "no override": writing it clears the property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDirectives {
    pub filter: String,
    pub color_scheme: String,
    pub font_size: String,
    pub background_image: String,
}

impl StyleDirectives {
    pub fn get(&self, property: StyleProperty) -> &str {
        match property {
            StyleProperty::Filter => &self.filter,
            StyleProperty::ColorScheme => &self.color_scheme,
            StyleProperty::FontSize => &self.font_size,
            StyleProperty::BackgroundImage => &self.background_image,
        }
    }

    pub fn set(&mut self, property: StyleProperty, value: String) {
        match property {
            StyleProperty::Filter => self.filter = value,
            StyleProperty::ColorScheme => self.color_scheme = value,
            StyleProperty::FontSize => self.font_size = value,
            StyleProperty::BackgroundImage => self.background_image = value,
        }
    }

    /// Renders the non-empty directives as CSS declarations.
    pub fn to_css_text(&self) -> String {
        StyleProperty::ALL
            .iter()
            .filter(|p| !self.get(**p).is_empty())
            .map(|p| format!("{}: {};", p.css_name(), self.get(*p)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Whether the theme is currently applied to a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThemeState {
    Active,
    Inactive,
}

impl ThemeState {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            ThemeState::Active
        } else {
            ThemeState::Inactive
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ThemeState::Active)
    }
}

/// Style shown in the popup's preview box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewStyle {
    pub directives: StyleDirectives,
    pub label: String,
}
