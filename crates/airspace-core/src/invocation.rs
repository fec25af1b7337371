//! Event-style entry point wrapping the report pipeline.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::config::{ProcessorConfig, ResponseBody};
use crate::error::Result;
use crate::pipeline;
use crate::report::OrderReport;
use crate::source::RowSource;

pub const STATUS_OK: u16 = 200;
pub const STATUS_FAILED: u16 = 500;

/// Response envelope: a status code and a JSON-encoded body string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_OK
    }
}

/// Runs the pipeline for one invocation. The event and context are opaque to
/// the report logic and only logged.
///
/// A fatal pipeline error yields a 500 response and nothing is delivered.
pub async fn invoke<S: RowSource>(
    event: &Value,
    context: &Value,
    source: &S,
    config: &ProcessorConfig,
) -> InvocationResponse {
    info!(%event, %context, "Invocation received");

    match process(source, config).await {
        Ok(body) => InvocationResponse {
            status_code: STATUS_OK,
            body,
        },
        Err(err) => {
            error!(error = %err, "Invocation failed");
            InvocationResponse {
                status_code: STATUS_FAILED,
                body: json!({ "error": err.to_string() }).to_string(),
            }
        }
    }
}

async fn process<S: RowSource>(source: &S, config: &ProcessorConfig) -> Result<String> {
    let report = pipeline::run(source).await?;
    report.deliver(&config.report)?;
    response_body(&report, config)
}

fn response_body(report: &OrderReport, config: &ProcessorConfig) -> Result<String> {
    let body = match config.response.body {
        ResponseBody::Placeholder => serde_json::to_string(&config.response.placeholder)?,
        ResponseBody::Report => report.to_json()?,
    };
    Ok(body)
}
