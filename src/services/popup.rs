//! Popup Controller — backs the extension's popup form.
//!
//! Loads the stored settings into the form, validates edits, saves them and
//! pushes them to the active tab, and reports the outcome as a short-lived
//! [`Notice`].

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::services::message_router::TabsApi;
use crate::services::settings_store::{KeyValueStore, SettingsStore};
use crate::services::style_applicator::compute_preview;
use crate::types::errors::{InputError, MessageError, PopupError, StoreError};
use crate::types::message::Request;
use crate::types::settings::{
    BackgroundPattern, ColorScheme, ThemeSettings, DARKNESS_MAX, DARKNESS_MIN, FONT_SIZE_MAX,
    FONT_SIZE_MIN,
};
use crate::types::style::PreviewStyle;

/// How long an error notice stays visible.
pub const ERROR_NOTICE_DURATION: Duration = Duration::from_secs(5);
/// How long a success notice stays visible.
pub const SUCCESS_NOTICE_DURATION: Duration = Duration::from_secs(3);

/// Current values of the popup's controls.
///
/// Numeric inputs are `f64` because the underlying inputs can hold any text,
/// including values that do not parse (`NaN`).
#[derive(Debug, Clone, PartialEq)]
pub struct PopupForm {
    pub enabled: bool,
    pub darkness_level: f64,
    pub color_scheme: ColorScheme,
    pub font_size: f64,
    pub background_pattern: BackgroundPattern,
}

impl Default for PopupForm {
    fn default() -> Self {
        Self::from_settings(&ThemeSettings::default())
    }
}

impl PopupForm {
    /// Fills the form from stored settings, clamping numbers into the
    /// controls' ranges.
    pub fn from_settings(settings: &ThemeSettings) -> Self {
        Self {
            enabled: settings.enabled,
            darkness_level: settings.clamped_darkness() as f64,
            color_scheme: settings.color_scheme.clone(),
            font_size: settings.clamped_font_size() as f64,
            background_pattern: settings.background_pattern.clone(),
        }
    }

    /// Rejects out-of-range or unparseable numeric values.
    pub fn validate(&self) -> Result<(), InputError> {
        if !in_range(self.darkness_level, DARKNESS_MIN, DARKNESS_MAX) {
            return Err(InputError::InvalidInput(
                "Darkness level must be between 0 and 100".to_string(),
            ));
        }
        if !in_range(self.font_size, FONT_SIZE_MIN, FONT_SIZE_MAX) {
            return Err(InputError::InvalidInput(
                "Font size must be between 10 and 30".to_string(),
            ));
        }
        Ok(())
    }

    /// The settings record this form describes.
    pub fn to_settings(&self) -> ThemeSettings {
        ThemeSettings {
            enabled: self.enabled,
            darkness_level: self.darkness_level.trunc() as i64,
            color_scheme: self.color_scheme.clone(),
            font_size: self.font_size.trunc() as i64,
            background_pattern: self.background_pattern.clone(),
        }
    }
}

fn in_range(value: f64, min: i64, max: i64) -> bool {
    !value.is_nan() && value >= min as f64 && value <= max as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Success,
}

/// A transient message shown above the apply button.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub shown_at: Instant,
}

impl Notice {
    pub fn duration(&self) -> Duration {
        match self.kind {
            NoticeKind::Error => ERROR_NOTICE_DURATION,
            NoticeKind::Success => SUCCESS_NOTICE_DURATION,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.duration()
    }
}

/// The popup context.
pub struct PopupController<S: KeyValueStore, T: TabsApi> {
    store: SettingsStore<S>,
    tabs: Arc<T>,
    form: PopupForm,
    notice: Option<Notice>,
}

impl<S: KeyValueStore, T: TabsApi> PopupController<S, T> {
    pub fn new(store: SettingsStore<S>, tabs: Arc<T>) -> Self {
        Self {
            store,
            tabs,
            form: PopupForm::default(),
            notice: None,
        }
    }

    pub fn form(&self) -> &PopupForm {
        &self.form
    }

    /// Mutable access for control edits.
    pub fn form_mut(&mut self) -> &mut PopupForm {
        &mut self.form
    }

    /// Everything except the toggle is disabled while the theme is off.
    pub fn controls_disabled(&self) -> bool {
        !self.form.enabled
    }

    pub fn preview(&self) -> PreviewStyle {
        compute_preview(&self.form)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Hides the notice once its display time is over.
    pub fn dismiss_expired(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notice = None;
        }
    }

    fn show(&mut self, kind: NoticeKind, message: &str) {
        self.notice = Some(Notice {
            kind,
            message: message.to_string(),
            shown_at: Instant::now(),
        });
    }

    /// Loads the stored settings into the form. On failure the form keeps its
    /// current values and an error notice is shown.
    pub async fn load(&mut self) -> Result<(), StoreError> {
        match self.store.get_all().await {
            Ok(settings) => {
                self.form = PopupForm::from_settings(&settings);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error loading settings: {}", e);
                self.show(NoticeKind::Error, "Failed to load settings. Please try again.");
                Err(e)
            }
        }
    }

    /// Validates and saves the form, then pushes it to the active tab.
    ///
    /// Invalid input is never saved. Once saved, a delivery failure is a soft
    /// error: the page picks the settings up on its next load.
    pub async fn apply(&mut self) -> Result<(), PopupError> {
        if let Err(e) = self.form.validate() {
            self.show(NoticeKind::Error, &e.to_string());
            return Err(e.into());
        }

        let settings = self.form.to_settings();
        if let Err(e) = self.store.set_all(&settings).await {
            tracing::error!("Error saving settings: {}", e);
            self.show(NoticeKind::Error, "Failed to save settings. Please try again.");
            return Err(e.into());
        }

        let tab = match self.tabs.query_active_tab().await {
            Ok(Some(tab)) => tab,
            Ok(None) => {
                self.show(NoticeKind::Error, "No active tab found");
                return Err(MessageError::NoActiveTarget.into());
            }
            Err(e) => {
                tracing::error!("Error querying tabs: {}", e);
                self.show(NoticeKind::Error, "Failed to apply theme. Please refresh the page.");
                return Err(e.into());
            }
        };

        if !tab.is_scriptable() {
            self.show(NoticeKind::Error, "Cannot apply theme to browser internal pages");
            return Err(PopupError::RestrictedPage(tab.url.unwrap_or_default()));
        }

        match self
            .tabs
            .send_message(&tab.id, Request::ApplySettings { settings })
            .await
        {
            Ok(response) if response.is_success() => {
                self.show(NoticeKind::Success, "Theme applied successfully!");
                Ok(())
            }
            Ok(response) => {
                let reason = response.error_message().unwrap_or("unknown error").to_string();
                tracing::warn!("Tab {} rejected settings: {}", tab.id, reason);
                self.show(NoticeKind::Error, "Failed to apply theme. Please refresh the page.");
                Err(PopupError::Rejected(reason))
            }
            Err(e) => {
                tracing::warn!("Error sending message: {}", e);
                self.show(NoticeKind::Error, "Theme will apply on next page load");
                Err(e.into())
            }
        }
    }
}
