#![allow(clippy::unwrap_used, clippy::float_cmp)]
// Panel behaviour against a wiremock device.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use evse_core::{
    AutoApprove, CollectionView, ConfigUpdate, ConnectionState, CoreError, Panel, PanelConfig,
    Tone,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Panel) {
    let server = MockServer::start().await;
    let mut config = PanelConfig::new(Url::parse(&server.uri()).unwrap());
    config.timeout = Duration::from_secs(5);
    config.probe_timeout = Duration::from_millis(300);
    let panel = Panel::new(config).unwrap();
    (server, panel)
}

fn expiry() -> NaiveDate {
    NaiveDate::from_ymd_opt(2027, 10, 19).unwrap()
}

fn ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true }))
}

// ── Probe ───────────────────────────────────────────────────────────

#[tokio::test]
async fn probe_reports_connected() {
    let (server, panel) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let rx = panel.connection_state();
    assert_eq!(*rx.borrow(), ConnectionState::Unknown);

    assert_eq!(panel.probe().await, ConnectionState::Connected);
    assert_eq!(*rx.borrow(), ConnectionState::Connected);
    assert_eq!(ConnectionState::Connected.label(), "Connected to device");
}

#[tokio::test]
async fn probe_timeout_reports_disconnected_within_bound() {
    let (server, panel) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let started = Instant::now();
    let state = panel.probe().await;

    assert_eq!(state, ConnectionState::Disconnected);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(state.label(), "Device not connected");
}

#[tokio::test]
async fn probe_non_2xx_reports_disconnected() {
    let (server, panel) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert_eq!(panel.probe().await, ConnectionState::Disconnected);
}

// ── Telemetry ───────────────────────────────────────────────────────

#[tokio::test]
async fn missing_status_field_renders_placeholder() {
    let (server, panel) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "voltage": 230.04,
            "power": 0,
            "charge_status": 1,
            "net_status": 1
        })))
        .mount(&server)
        .await;

    let view = panel.telemetry().await;
    assert_eq!(view.voltage, "230.0 V");
    assert_eq!(view.current, "-- A");
    assert_eq!(view.power, "0.0 W");
    assert_eq!(view.charge.text, "Idle");
    assert_eq!(view.network.text, "Connected");
}

#[tokio::test]
async fn failed_status_fetch_renders_failure_view() {
    let (server, panel) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let view = panel.telemetry().await;
    assert_eq!(view.voltage, "-- V");
    assert_eq!(view.charge.text, "Data fetch failed");
    assert_eq!(view.network.text, "Data fetch failed");
    assert_eq!(view.charge.tone, Tone::Danger);
}

// ── Loaders ─────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_collections_render_no_data_rows() {
    let (server, panel) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/cards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/alarms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    assert_eq!(
        panel.load_cards().await,
        CollectionView::Empty {
            message: "No authorized cards".into()
        }
    );
    assert_eq!(
        panel.load_alarms().await,
        CollectionView::Empty {
            message: "No alarm records".into()
        }
    );
}

#[tokio::test]
async fn alarms_render_in_reverse_order() {
    let (server, panel) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/alarms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "time": 1, "coverStatus": "open", "handled": false },
            { "time": 2, "coverStatus": "closed", "handled": true }
        ])))
        .mount(&server)
        .await;

    let view = panel.load_alarms().await;
    let times: Vec<_> = view.rows().iter().map(|r| r.time.as_str()).collect();
    assert_eq!(times, ["2", "1"]);
}

#[tokio::test]
async fn failed_load_renders_error_row() {
    let (server, panel) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/cards"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let view = panel.load_cards().await;
    assert!(view.is_failed());
    assert_eq!(view.message(), Some("Load failed"));
}

#[tokio::test]
async fn config_load_seeds_form() {
    let (server, panel) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ov_threshold": 0,
            "maxcc": 16,
            "leakageac": 25
        })))
        .mount(&server)
        .await;

    let view = panel.load_config().await;
    let device = view.device.unwrap();
    assert_eq!(device.ov_threshold, 286.0);
    assert_eq!(view.form.max_current, 16);
    assert_eq!(view.form.leakage_ac, 25);
    assert_eq!(view.form.leakage_dc, 30);
    assert_eq!(view.form.voltage_deviation, 5);
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn short_card_id_is_rejected_without_a_request() {
    let (server, panel) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/cards"))
        .respond_with(ok())
        .expect(0)
        .mount(&server)
        .await;

    let result = panel.add_card("1234", expiry()).await;
    match result {
        Err(CoreError::ValidationFailed { message }) => {
            assert_eq!(message, "Card ID must be 8 digits");
        }
        other => panic!("expected ValidationFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn added_card_reloads_list_after_delay() {
    let (server, panel) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/cards"))
        .and(body_json(json!({ "id": "12345678", "expireDate": "2027-10-19" })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "12345678", "expireDate": "2027-10-19" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let started = Instant::now();
    let outcome = panel.add_card("12345678", expiry()).await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(500));
    assert_eq!(outcome.notice.text, "Card added");
    assert_eq!(outcome.reloaded.unwrap().rows()[0].id, "12345678");
}

#[tokio::test]
async fn rejected_card_shows_device_message() {
    let (server, panel) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/cards"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "msg": "card list full" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = panel.add_card("12345678", expiry()).await.unwrap();
    assert!(!outcome.is_success());
    assert_eq!(outcome.notice.text, "Add failed: card list full");
    assert!(outcome.reloaded.is_none());
}

#[tokio::test]
async fn transport_failure_asks_for_retry() {
    // Nothing listens on port 1.
    let url = Url::parse("http://127.0.0.1:1").unwrap();
    let panel = Panel::new(PanelConfig::new(url)).unwrap();
    let outcome = panel.add_card("12345678", expiry()).await.unwrap();
    assert_eq!(outcome.notice.text, "Add failed, please retry");
}

#[tokio::test]
async fn successful_delete_reloads_exactly_once() {
    let (server, panel) = setup().await;
    Mock::given(method("DELETE"))
        .and(path("/api/cards/12345678"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = panel.delete_card("12345678", &AutoApprove).await.unwrap();
    assert_eq!(outcome.notice.text, "Card 12345678 deleted");
    assert!(outcome.reloaded.is_some());
}

#[tokio::test]
async fn successful_clear_reloads_exactly_once() {
    let (server, panel) = setup().await;
    Mock::given(method("DELETE"))
        .and(path("/api/alarms"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/alarms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = panel.clear_alarms(&AutoApprove).await.unwrap();
    assert_eq!(outcome.notice.text, "Alarm records cleared");
    assert_eq!(
        outcome.reloaded.unwrap().message(),
        Some("No alarm records")
    );
}

#[tokio::test]
async fn declined_confirmation_sends_nothing() {
    let (server, panel) = setup().await;
    Mock::given(method("DELETE"))
        .respond_with(ok())
        .expect(0)
        .mount(&server)
        .await;

    let asked = AtomicUsize::new(0);
    let decline = |prompt: &str| {
        asked.fetch_add(1, Ordering::SeqCst);
        assert!(prompt.ends_with('?'));
        false
    };

    assert!(panel.delete_card("12345678", &decline).await.is_none());
    assert!(panel.clear_alarms(&decline).await.is_none());
    assert!(panel.reset_form(&decline).is_none());
    assert_eq!(asked.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn refused_delete_does_not_reload() {
    let (server, panel) = setup().await;
    Mock::given(method("DELETE"))
        .and(path("/api/cards/12345678"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = panel.delete_card("12345678", &AutoApprove).await.unwrap();
    assert_eq!(outcome.notice.text, "Delete failed");
}

#[tokio::test]
async fn save_config_posts_form_and_reloads() {
    let (server, panel) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/config"))
        .and(body_json(json!({
            "voltageDeviation": 5,
            "maxCurrent": 16,
            "cpDeviation": 10,
            "leakageAC": 30,
            "leakageDC": 6
        })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "maxcc": 16 })))
        .expect(1)
        .mount(&server)
        .await;

    let update = ConfigUpdate {
        max_current: 16,
        ..ConfigUpdate::FACTORY
    };
    let outcome = panel.save_config(&update).await;
    assert_eq!(outcome.notice.text, "Settings saved");
    assert_eq!(outcome.reloaded.unwrap().form.max_current, 16);
}

#[tokio::test]
async fn save_config_failure_is_reported() {
    let (server, panel) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let outcome = panel.save_config(&ConfigUpdate::FACTORY).await;
    assert_eq!(outcome.notice.text, "Save failed");
    assert_eq!(outcome.notice.tone, Tone::Danger);
}

#[tokio::test]
async fn reset_form_returns_factory_values() {
    let (_server, panel) = setup().await;
    assert_eq!(panel.reset_form(&AutoApprove), Some(ConfigUpdate::FACTORY));
}
