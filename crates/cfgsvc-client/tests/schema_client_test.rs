//! Contract tests for schema loading and validation.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET    | `/api/schemas/{name}` | `load_schema_*` |

use cfgsvc_client::{ConfigDocument, ConfigSdk, GetOptions, SdkError, SdkOptions};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_sdk(mock_server: &MockServer) -> ConfigSdk {
    let options = SdkOptions::new(format!("{}/api", mock_server.uri()))
        .with_header("Authorization", "Bearer test-token");
    ConfigSdk::new(options).unwrap()
}

fn display_schema() -> serde_json::Value {
    json!({
        "required": ["brightness", "mode"],
        "properties": {
            "brightness": {"type": "integer", "minimum": 0, "maximum": 100},
            "mode": {"type": "string", "enum": ["day", "night"]},
            "label": {
                "type": "string",
                "minLength": 2,
                "maxLength": 8,
                "description": "shown in UI"
            }
        }
    })
}

fn doc(value: serde_json::Value) -> ConfigDocument {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

// ── GET /api/schemas/{name} ──────────────────────────────────────────

#[tokio::test]
async fn load_schema_sends_headers_and_stores_schema() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/schemas/display"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(display_schema()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sdk = test_sdk(&mock_server);
    assert!(sdk.schema("display").is_none());

    let schema = sdk.load_schema("display").await.unwrap();
    assert_eq!(schema.required, vec!["brightness", "mode"]);
    assert_eq!(sdk.schema("display"), Some(schema.clone()));
    let label = schema.property("label").unwrap();
    assert_eq!(label.min_length, Some(2.0));
    assert_eq!(label.extra.get("description"), Some(&json!("shown in UI")));
}

#[tokio::test]
async fn load_schema_replaces_previous_schema() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/schemas/display"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"required": ["a"]})))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/schemas/display"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"required": ["b"]})))
        .mount(&mock_server)
        .await;

    let sdk = test_sdk(&mock_server);
    sdk.load_schema("display").await.unwrap();
    sdk.load_schema("display").await.unwrap();
    assert_eq!(sdk.schema("display").unwrap().required, vec!["b"]);
}

#[tokio::test]
async fn load_schema_not_found_keeps_store_unchanged() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/schemas/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such schema"))
        .mount(&mock_server)
        .await;

    let sdk = test_sdk(&mock_server);
    let err = sdk.load_schema("missing").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("no such schema"));
    assert!(sdk.schema("missing").is_none());
}

#[tokio::test]
async fn load_schema_rejects_non_object_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/schemas/display"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["brightness"])))
        .mount(&mock_server)
        .await;

    let sdk = test_sdk(&mock_server);
    let err = sdk.load_schema("display").await.unwrap_err();
    assert!(matches!(err, SdkError::Decode { .. }), "got {err:?}");
    assert!(sdk.schema("display").is_none());
}

#[tokio::test]
async fn load_schema_accepts_generated_nullable_types() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/schemas/sys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "required": ["id"],
            "properties": {
                "id": {"type": "integer"},
                "lastSync": {"type": ["null", "string"]},
                "label": {"type": "string", "minLength": 1.0}
            }
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/config/sys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "lastSync": null,
            "label": "edge"
        })))
        .mount(&mock_server)
        .await;

    let sdk = test_sdk(&mock_server);
    sdk.load_schema("sys").await.unwrap();

    let fetched = sdk
        .get("sys", GetOptions::FRESH.validated())
        .await
        .unwrap();
    assert_eq!(fetched.get("id"), Some(&json!(7)));

    let bad = sdk.validate(&doc(json!({"id": 7, "label": ""})), "sys");
    assert_eq!(bad.errors, vec!["field label: minimum length is 1"]);
}

#[tokio::test]
async fn load_schema_unreachable_service_is_transport_error() {
    let mock_server = MockServer::builder().start().await;
    let sdk = test_sdk(&mock_server);
    drop(mock_server);

    let err = sdk.load_schema("display").await.unwrap_err();
    assert!(matches!(err, SdkError::Transport { .. }), "got {err:?}");
}

// ── Validation against loaded schemas ───────────────────────────────

#[tokio::test]
async fn validate_uses_loaded_schema() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/schemas/display"))
        .respond_with(ResponseTemplate::new(200).set_body_json(display_schema()))
        .mount(&mock_server)
        .await;

    let sdk = test_sdk(&mock_server);
    sdk.load_schema("display").await.unwrap();

    let ok = sdk.validate(&doc(json!({"brightness": 40, "mode": "day"})), "display");
    assert!(ok.valid);
    assert!(ok.errors.is_empty());

    let bad = sdk.validate(
        &doc(json!({"brightness": 140, "mode": "dusk", "label": "x"})),
        "display",
    );
    assert!(!bad.valid);
    assert_eq!(
        bad.errors,
        vec![
            "field brightness: maximum value is 100",
            "field label: minimum length is 2",
            "field mode: value not in allowed enum",
        ]
    );
}

#[tokio::test]
async fn validate_reports_missing_required_fields_first() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/schemas/display"))
        .respond_with(ResponseTemplate::new(200).set_body_json(display_schema()))
        .mount(&mock_server)
        .await;

    let sdk = test_sdk(&mock_server);
    sdk.load_schema("display").await.unwrap();

    let result = sdk.validate(&doc(json!({"brightness": "high"})), "display");
    assert_eq!(
        result.errors,
        vec!["required field mode is missing", "field brightness: expected integer"]
    );
}

#[tokio::test]
async fn validate_never_fetches_a_schema() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(display_schema()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let sdk = test_sdk(&mock_server);
    let result = sdk.validate(&doc(json!({})), "display");
    assert!(!result.valid);
    assert_eq!(result.errors, vec!["schema display not loaded"]);
}
