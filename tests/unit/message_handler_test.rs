//! Tests for the JSON message boundary.

use std::sync::Arc;

use pageshade::message_handler::{dispatch_background, dispatch_content, parse_request, response_to_value};
use pageshade::services::background::BackgroundWorker;
use pageshade::services::content_script::ContentSession;
use pageshade::services::memory_store::MemoryStore;
use pageshade::services::settings_store::SettingsStore;
use pageshade::services::style_applicator::{DocumentRoot, InMemoryDocument};
use pageshade::types::errors::MessageError;
use pageshade::types::message::{Request, Response};
use pageshade::types::settings::ThemeSettings;
use pageshade::types::storage::StorageArea;
use pageshade::types::style::StyleProperty;
use rstest::rstest;
use serde_json::json;

fn worker() -> (BackgroundWorker<MemoryStore>, Arc<MemoryStore>) {
    let backend = Arc::new(MemoryStore::new(StorageArea::Sync));
    (BackgroundWorker::new(SettingsStore::new(Arc::clone(&backend))), backend)
}

#[rstest]
#[case(json!({"action": "getSettings"}), Request::GetSettings)]
#[case(json!({"action": "toggleTheme"}), Request::ToggleTheme)]
#[case(json!({"action": "getStatus", "extra": 1}), Request::GetStatus)]
fn test_parse_known_actions(#[case] raw: serde_json::Value, #[case] expected: Request) {
    assert_eq!(parse_request(&raw).unwrap(), expected);
}

#[rstest]
#[case(json!(null), "missing action")]
#[case(json!({"action": 3}), "missing action")]
#[case(json!({"action": "reload"}), "unknown action: reload")]
fn test_parse_rejects(#[case] raw: serde_json::Value, #[case] message: &str) {
    assert_eq!(
        parse_request(&raw),
        Err(MessageError::InvalidRequest(message.to_string()))
    );
}

#[test]
fn test_apply_settings_fills_missing_fields_with_defaults() {
    let req = parse_request(&json!({"action": "applySettings", "settings": {"fontSize": 24}})).unwrap();
    let expected = ThemeSettings {
        font_size: 24,
        ..Default::default()
    };
    assert_eq!(req, Request::ApplySettings { settings: expected });
}

#[test]
fn test_content_accepts_loose_numbers_like_the_store() {
    let mut session = ContentSession::new(InMemoryDocument::new());
    let res = dispatch_content(
        &mut session,
        &json!({
            "action": "applySettings",
            "settings": {"enabled": null, "darknessLevel": "30", "fontSize": 20.5}
        }),
    );
    assert_eq!(res, json!({"success": true}));
    assert_eq!(session.document().style_property(StyleProperty::Filter), "brightness(70%)");
    assert_eq!(session.document().style_property(StyleProperty::FontSize), "20px");
    assert!(session.is_enabled());
}

#[test]
fn test_response_shapes() {
    assert_eq!(response_to_value(&Response::ok()), json!({"success": true}));
    assert_eq!(
        response_to_value(&Response::failure("boom")),
        json!({"success": false, "error": "boom"})
    );
    assert_eq!(
        response_to_value(&Response::Status { enabled: false, settings: None }),
        json!({"enabled": false, "settings": null})
    );
}

#[test]
fn test_content_applies_settings_from_json() {
    let mut session = ContentSession::new(InMemoryDocument::new());
    let res = dispatch_content(
        &mut session,
        &json!({
            "action": "applySettings",
            "settings": {
                "enabled": true,
                "darknessLevel": 80,
                "colorScheme": "dark",
                "fontSize": 20,
                "backgroundPattern": "dots"
            }
        }),
    );
    assert_eq!(res, json!({"success": true}));
    assert_eq!(session.document().style_property(StyleProperty::Filter), "brightness(20%)");
    assert_eq!(session.document().style_property(StyleProperty::FontSize), "20px");

    let status = dispatch_content(&mut session, &json!({"action": "getStatus"}));
    assert_eq!(status["enabled"], json!(true));
    assert_eq!(status["settings"]["backgroundPattern"], json!("dots"));
}

#[test]
fn test_content_always_answers() {
    let mut session = ContentSession::new(InMemoryDocument::new());
    for raw in [json!({}), json!({"action": "nope"}), json!({"action": "getSettings"})] {
        let res = dispatch_content(&mut session, &raw);
        assert_eq!(res["success"], json!(false), "{} should fail", raw);
        assert!(res["error"].is_string());
    }
}

#[tokio::test]
async fn test_background_get_settings() {
    let (worker, _) = worker();
    let res = dispatch_background(&worker, &json!({"action": "getSettings"})).await;
    assert_eq!(res, json!({"settings": serde_json::to_value(ThemeSettings::default()).unwrap()}));
}

#[tokio::test]
async fn test_background_reports_store_failure() {
    let (worker, backend) = worker();
    backend.set_available(false);
    let res = dispatch_background(&worker, &json!({"action": "getSettings"})).await;
    let error = res["error"].as_str().unwrap();
    assert!(error.starts_with("Settings store unavailable"), "{}", error);
    assert!(res.get("settings").is_none());
}

#[tokio::test]
async fn test_background_rejects_page_commands() {
    let (worker, _) = worker();
    let res = dispatch_background(&worker, &json!({"action": "toggleTheme"})).await;
    assert_eq!(res["success"], json!(false));
}
