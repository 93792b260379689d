//! Popup controller tests against a scripted tabs API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pageshade::services::memory_store::MemoryStore;
use pageshade::services::message_router::TabsApi;
use pageshade::services::popup::{NoticeKind, PopupController, PopupForm};
use pageshade::services::settings_store::{KeyValueStore, SettingsStore};
use pageshade::types::errors::{MessageError, PopupError};
use pageshade::types::message::{Request, Response};
use pageshade::types::settings::{BackgroundPattern, ColorScheme, ThemeSettings};
use pageshade::types::storage::StorageArea;
use pageshade::types::tab::Tab;
use rstest::rstest;
use tokio::time::Instant;

/// Answers every message with a fixed reply and records what was sent.
struct ScriptedTabs {
    active: Option<Tab>,
    reply: Result<Response, MessageError>,
    sent: Mutex<Vec<(String, Request)>>,
}

impl ScriptedTabs {
    fn new(url: Option<&str>, reply: Result<Response, MessageError>) -> Self {
        Self {
            active: Some(Tab {
                id: "tab-1".to_string(),
                url: url.map(str::to_string),
                title: "Page".to_string(),
                created_at: 0,
            }),
            reply,
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent(&self) -> Vec<(String, Request)> {
        self.sent.lock().unwrap().clone()
    }
}

impl TabsApi for ScriptedTabs {
    async fn query_active_tab(&self) -> Result<Option<Tab>, MessageError> {
        Ok(self.active.clone())
    }

    async fn send_message(&self, tab_id: &str, request: Request) -> Result<Response, MessageError> {
        self.sent.lock().unwrap().push((tab_id.to_string(), request));
        self.reply.clone()
    }
}

type Harness = (
    PopupController<MemoryStore, ScriptedTabs>,
    SettingsStore<MemoryStore>,
    Arc<ScriptedTabs>,
);

fn popup(tabs: ScriptedTabs) -> Harness {
    let store = SettingsStore::new(Arc::new(MemoryStore::new(StorageArea::Sync)));
    let tabs = Arc::new(tabs);
    (PopupController::new(store.clone(), Arc::clone(&tabs)), store, tabs)
}

#[tokio::test]
async fn test_load_fills_form_from_store() {
    let (mut popup, store, _) = popup(ScriptedTabs::new(Some("https://example.com"), Ok(Response::ok())));
    let stored = ThemeSettings {
        enabled: false,
        darkness_level: 120,
        color_scheme: ColorScheme::Light,
        font_size: 12,
        background_pattern: BackgroundPattern::Grid,
    };
    store.set_all(&stored).await.unwrap();

    popup.load().await.unwrap();
    let form = popup.form();
    assert!(!form.enabled);
    assert_eq!(form.darkness_level, 100.0);
    assert_eq!(form.font_size, 12.0);
    assert_eq!(form.color_scheme, ColorScheme::Light);
    assert!(popup.controls_disabled());
    assert_eq!(popup.preview().label, "Theme Disabled");
}

#[tokio::test]
async fn test_apply_sends_saved_settings_to_active_tab() {
    let (mut popup, store, tabs) = popup(ScriptedTabs::new(Some("https://example.com"), Ok(Response::ok())));
    popup.form_mut().darkness_level = 64.9;
    popup.form_mut().background_pattern = BackgroundPattern::Stripes;

    popup.apply().await.unwrap();

    let expected = ThemeSettings {
        darkness_level: 64,
        background_pattern: BackgroundPattern::Stripes,
        ..Default::default()
    };
    assert_eq!(store.get_all().await.unwrap(), expected);
    assert_eq!(
        tabs.sent(),
        vec![("tab-1".to_string(), Request::ApplySettings { settings: expected })]
    );
    assert_eq!(popup.notice().unwrap().kind, NoticeKind::Success);
}

#[tokio::test]
async fn test_page_failure_reply_is_reported() {
    let (mut popup, _, _) = popup(ScriptedTabs::new(
        Some("https://example.com"),
        Ok(Response::failure("document not ready")),
    ));
    let err = popup.apply().await.unwrap_err();
    assert_eq!(err, PopupError::Rejected("document not ready".to_string()));
    assert_eq!(
        popup.notice().unwrap().message,
        "Failed to apply theme. Please refresh the page."
    );
}

#[rstest]
#[case(MessageError::NoReceiver("tab tab-1".to_string()))]
#[case(MessageError::Timeout(Duration::from_secs(5)))]
#[tokio::test]
async fn test_delivery_failure_is_soft(#[case] error: MessageError) {
    let (mut popup, store, _) = popup(ScriptedTabs::new(Some("https://example.com"), Err(error.clone())));
    popup.form_mut().enabled = false;

    assert_eq!(popup.apply().await, Err(PopupError::Message(error)));
    assert_eq!(popup.notice().unwrap().message, "Theme will apply on next page load");
    assert!(!store.get_all().await.unwrap().enabled);
}

#[rstest]
#[case(Some("chrome://settings"))]
#[case(Some("edge://flags"))]
#[case(None)]
#[tokio::test]
async fn test_restricted_pages_are_not_messaged(#[case] url: Option<&str>) {
    let (mut popup, _, tabs) = popup(ScriptedTabs::new(url, Ok(Response::ok())));
    assert!(matches!(popup.apply().await, Err(PopupError::RestrictedPage(_))));
    assert!(tabs.sent().is_empty());
}

#[rstest]
#[case(-1.0, 16.0, "Darkness level must be between 0 and 100")]
#[case(f64::NAN, 16.0, "Darkness level must be between 0 and 100")]
#[case(50.0, 9.5, "Font size must be between 10 and 30")]
#[case(50.0, 31.0, "Font size must be between 10 and 30")]
#[tokio::test]
async fn test_invalid_input_is_not_saved(#[case] darkness: f64, #[case] font_size: f64, #[case] message: &str) {
    let (mut popup, store, tabs) = popup(ScriptedTabs::new(Some("https://example.com"), Ok(Response::ok())));
    *popup.form_mut() = PopupForm {
        darkness_level: darkness,
        font_size,
        ..Default::default()
    };

    assert!(matches!(popup.apply().await, Err(PopupError::InvalidInput(_))));
    assert_eq!(popup.notice().unwrap().message, message);
    assert!(store.backend().get(None).await.unwrap().is_empty());
    assert!(tabs.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_notices_expire() {
    let (mut popup, _, _) = popup(ScriptedTabs::new(Some("https://example.com"), Ok(Response::ok())));
    popup.apply().await.unwrap();

    tokio::time::advance(Duration::from_millis(2900)).await;
    popup.dismiss_expired(Instant::now());
    assert!(popup.notice().is_some());

    tokio::time::advance(Duration::from_millis(100)).await;
    popup.dismiss_expired(Instant::now());
    assert!(popup.notice().is_none());

    popup.form_mut().font_size = 40.0;
    assert!(popup.apply().await.is_err());
    tokio::time::advance(Duration::from_secs(3)).await;
    popup.dismiss_expired(Instant::now());
    assert_eq!(popup.notice().unwrap().kind, NoticeKind::Error);
    tokio::time::advance(Duration::from_secs(2)).await;
    popup.dismiss_expired(Instant::now());
    assert!(popup.notice().is_none());
}
