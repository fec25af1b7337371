mod common;

use airspace_core::config::{ProcessorConfig, ReportDestination, ResponseBody};
use airspace_core::invocation::{invoke, STATUS_FAILED, STATUS_OK};
use airspace_core::source::FrameSource;
use common::{segment_frame, Leg};
use serde_json::{json, Value};

fn quiet_config(body: ResponseBody) -> ProcessorConfig {
    let mut config = ProcessorConfig::default();
    config.report = ReportDestination::Discard;
    config.response.body = body;
    config
}

#[tokio::test]
async fn placeholder_body_is_json_encoded_string() {
    let source = FrameSource::new(segment_frame(&[Leg::driving("A")]));
    let config = quiet_config(ResponseBody::Placeholder);

    let response = invoke(&json!({}), &json!({}), &source, &config).await;

    assert_eq!(response.status_code, STATUS_OK);
    assert_eq!(response.body, "\"ok\"");
}

#[tokio::test]
async fn report_body_carries_sorted_summaries() {
    let source = FrameSource::new(segment_frame(&[
        Leg::driving("far"),
        Leg::driving("near").between(common::LOS_ANGELES, common::SAN_DIEGO),
    ]));
    let config = quiet_config(ResponseBody::Report);

    let response = invoke(&json!({"source": "test"}), &Value::Null, &source, &config).await;
    assert!(response.is_success());

    let body: Value = serde_json::from_str(&response.body).expect("body is json");
    let ids: Vec<_> = body
        .as_array()
        .expect("array body")
        .iter()
        .map(|row| row["order_id"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(ids, ["near", "far"]);
}

#[tokio::test]
async fn fatal_errors_become_failed_responses() {
    let mut leg = Leg::driving("A");
    leg.start_time_zone = Some("\"Nowhere/Special\"");
    let source = FrameSource::new(segment_frame(&[leg]));
    let config = quiet_config(ResponseBody::Report);

    let response = invoke(&json!({}), &json!({}), &source, &config).await;

    assert_eq!(response.status_code, STATUS_FAILED);
    let body: Value = serde_json::from_str(&response.body).expect("error body is json");
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("Nowhere/Special"));
}

#[test]
fn response_envelope_uses_status_code_key() {
    let response = airspace_core::invocation::InvocationResponse {
        status_code: STATUS_OK,
        body: "\"ok\"".to_string(),
    };
    let encoded = serde_json::to_value(&response).expect("serialize");
    assert_eq!(encoded, json!({"statusCode": 200, "body": "\"ok\""}));
}
