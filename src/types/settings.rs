use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::errors::InputError;

/// Lowest accepted darkness level.
pub const DARKNESS_MIN: i64 = 0;
/// Highest accepted darkness level.
pub const DARKNESS_MAX: i64 = 100;
/// Smallest accepted font size in pixels.
pub const FONT_SIZE_MIN: i64 = 10;
/// Largest accepted font size in pixels.
pub const FONT_SIZE_MAX: i64 = 30;
/// Font size the page is assumed to use when no override is applied.
pub const DEFAULT_FONT_SIZE: i64 = 16;
/// Darkness level used on first install.
pub const DEFAULT_DARKNESS_LEVEL: i64 = 50;

/// Wire keys of every field in [`ThemeSettings`], in storage order.
pub const SETTINGS_KEYS: [&str; 5] = [
    "enabled",
    "darknessLevel",
    "colorScheme",
    "fontSize",
    "backgroundPattern",
];

/// The user's page theme preferences.
///
/// This is the flat record shared by the popup, the background worker and
/// every content script. Fields missing from a stored or received record
/// take their default values.
///
/// Deserialization accepts the same values as [`set_field`](Self::set_field),
/// so a record sent in a message and one read from the store agree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeSettings {
    #[serde(deserialize_with = "enabled_field")]
    pub enabled: bool,
    #[serde(deserialize_with = "darkness_level_field")]
    pub darkness_level: i64,
    #[serde(deserialize_with = "color_scheme_field")]
    pub color_scheme: ColorScheme,
    #[serde(deserialize_with = "font_size_field")]
    pub font_size: i64,
    #[serde(deserialize_with = "background_pattern_field")]
    pub background_pattern: BackgroundPattern,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            darkness_level: DEFAULT_DARKNESS_LEVEL,
            color_scheme: ColorScheme::Default,
            font_size: DEFAULT_FONT_SIZE,
            background_pattern: BackgroundPattern::None,
        }
    }
}

impl ThemeSettings {
    /// Darkness level clamped to `[DARKNESS_MIN, DARKNESS_MAX]`.
    pub fn clamped_darkness(&self) -> i64 {
        self.darkness_level.clamp(DARKNESS_MIN, DARKNESS_MAX)
    }

    /// Font size clamped to `[FONT_SIZE_MIN, FONT_SIZE_MAX]`.
    pub fn clamped_font_size(&self) -> i64 {
        self.font_size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX)
    }

    /// Builds a record from raw store items, defaulting every field that is
    /// absent or unusable.
    pub fn from_items(items: &Map<String, Value>) -> Self {
        let mut settings = Self::default();
        settings.merge_items(items);
        settings
    }

    /// Overlays raw store items onto this record.
    ///
    /// Keys outside the record are ignored. A value of the wrong type leaves
    /// the field untouched and is logged. Returns the number of fields updated.
    pub fn merge_items(&mut self, items: &Map<String, Value>) -> usize {
        let mut updated = 0;
        for (key, value) in items {
            match self.set_field(key, value) {
                Ok(true) => updated += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!("Ignoring stored value for '{}': {}", key, e),
            }
        }
        updated
    }

    /// Updates a single field by its wire key.
    ///
    /// `null` resets the field to its default. Returns `Ok(false)` when the key
    /// does not belong to the record.
    pub fn set_field(&mut self, key: &str, value: &Value) -> Result<bool, InputError> {
        let defaults = Self::default();
        match key {
            "enabled" => {
                self.enabled = match value {
                    Value::Null => defaults.enabled,
                    Value::Bool(b) => *b,
                    other => return Err(type_mismatch(key, "a boolean", other)),
                };
            }
            "darknessLevel" => {
                self.darkness_level = match value {
                    Value::Null => defaults.darkness_level,
                    other => integer_value(other).ok_or_else(|| type_mismatch(key, "a number", other))?,
                };
            }
            "fontSize" => {
                self.font_size = match value {
                    Value::Null => defaults.font_size,
                    other => integer_value(other).ok_or_else(|| type_mismatch(key, "a number", other))?,
                };
            }
            "colorScheme" => {
                self.color_scheme = match value {
                    Value::Null => defaults.color_scheme,
                    Value::String(s) => ColorScheme::from(s.clone()),
                    other => return Err(type_mismatch(key, "a string", other)),
                };
            }
            "backgroundPattern" => {
                self.background_pattern = match value {
                    Value::Null => defaults.background_pattern,
                    Value::String(s) => BackgroundPattern::from(s.clone()),
                    other => return Err(type_mismatch(key, "a string", other)),
                };
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Flattens the record into store items keyed by wire name.
    pub fn to_items(&self) -> Map<String, Value> {
        let mut items = Map::new();
        items.insert("enabled".into(), Value::Bool(self.enabled));
        items.insert("darknessLevel".into(), Value::from(self.darkness_level));
        items.insert("colorScheme".into(), Value::String(self.color_scheme.as_str().to_string()));
        items.insert("fontSize".into(), Value::from(self.font_size));
        items.insert(
            "backgroundPattern".into(),
            Value::String(self.background_pattern.as_str().to_string()),
        );
        items
    }
}

/// Accepts JSON numbers and numeric strings, truncating fractions.
fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64),
        _ => None,
    }
}

/// Reads one field through [`ThemeSettings::set_field`].
fn field_from_json<'de, D, T>(
    deserializer: D,
    key: &str,
    pick: fn(ThemeSettings) -> T,
) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let mut settings = ThemeSettings::default();
    settings.set_field(key, &value).map_err(D::Error::custom)?;
    Ok(pick(settings))
}

fn enabled_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    field_from_json(deserializer, "enabled", |s| s.enabled)
}

fn darkness_level_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    field_from_json(deserializer, "darknessLevel", |s| s.darkness_level)
}

fn color_scheme_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ColorScheme, D::Error> {
    field_from_json(deserializer, "colorScheme", |s| s.color_scheme)
}

fn font_size_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    field_from_json(deserializer, "fontSize", |s| s.font_size)
}

fn background_pattern_field<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BackgroundPattern, D::Error> {
    field_from_json(deserializer, "backgroundPattern", |s| s.background_pattern)
}

fn type_mismatch(key: &str, expected: &str, got: &Value) -> InputError {
    InputError::InvalidInput(format!("{} must be {}, got {}", key, expected, got))
}

/// Page color scheme requested through the `color-scheme` CSS property.
///
/// `Default` asks for a dark scheme; any other literal is passed through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColorScheme {
    Default,
    Dark,
    Light,
    Other(String),
}

impl ColorScheme {
    pub fn as_str(&self) -> &str {
        match self {
            ColorScheme::Default => "default",
            ColorScheme::Dark => "dark",
            ColorScheme::Light => "light",
            ColorScheme::Other(s) => s,
        }
    }
}

impl From<String> for ColorScheme {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" | "default" => ColorScheme::Default,
            "dark" => ColorScheme::Dark,
            "light" => ColorScheme::Light,
            _ => ColorScheme::Other(value),
        }
    }
}

impl From<ColorScheme> for String {
    fn from(value: ColorScheme) -> Self {
        value.as_str().to_string()
    }
}

/// Decorative background drawn behind the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BackgroundPattern {
    None,
    Dots,
    Stripes,
    Grid,
    /// Any value the applicator has no gradient for. Kept so it round-trips.
    Other(String),
}

impl BackgroundPattern {
    pub fn as_str(&self) -> &str {
        match self {
            BackgroundPattern::None => "none",
            BackgroundPattern::Dots => "dots",
            BackgroundPattern::Stripes => "stripes",
            BackgroundPattern::Grid => "grid",
            BackgroundPattern::Other(s) => s,
        }
    }
}

impl From<String> for BackgroundPattern {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" | "none" => BackgroundPattern::None,
            "dots" => BackgroundPattern::Dots,
            "stripes" => BackgroundPattern::Stripes,
            "grid" => BackgroundPattern::Grid,
            _ => BackgroundPattern::Other(value),
        }
    }
}

impl From<BackgroundPattern> for String {
    fn from(value: BackgroundPattern) -> Self {
        value.as_str().to_string()
    }
}
