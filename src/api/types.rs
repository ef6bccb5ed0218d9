//! Types for the tracking-service API boundary.
//!
//! The wire envelope mirrors the service's JSON POST protocol: every call
//! returns either a `result` payload or an `error` object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request envelope sent to the tracking service
#[derive(Debug, Clone, Serialize)]
pub struct ApiRequest {
    pub method: String,
    pub params: Value,
}

impl ApiRequest {
    /// Build a request for the run list of one project
    pub fn runs(entity: &str, project: &str) -> Self {
        Self {
            method: "runs".to_string(),
            params: serde_json::json!({
                "entity": entity,
                "project": project,
            }),
        }
    }

    /// Build a request for one run's sampled metric history
    ///
    /// # Arguments
    /// * `run_name` - Run to fetch
    /// * `metric` - Metric key to fetch
    /// * `x_key` - Index key (typically `_step`)
    /// * `samples` - Maximum number of rows the server should return
    pub fn history(
        entity: &str,
        project: &str,
        run_name: &str,
        metric: &str,
        x_key: &str,
        samples: usize,
    ) -> Self {
        Self {
            method: "history".to_string(),
            params: serde_json::json!({
                "entity": entity,
                "project": project,
                "run": run_name,
                "keys": [metric],
                "x_axis": x_key,
                "samples": samples,
            }),
        }
    }
}

/// Response envelope from the tracking service.
///
/// Missing `result`/`error` fields deserialize to `None`; no `Default`
/// bound on the payload type.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub result: Option<T>,
    pub error: Option<ApiErrorBody>,
}

/// Error object in a response envelope
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: i64,
    pub message: String,
}

/// One experiment run as reported by the tracking service.
///
/// Configuration and summary stay separate here; the grouping stage merges
/// them into a flat attribute view. History is fetched lazily per metric
/// through the client, never stored on the run.
#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    pub name: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub summary: Map<String, Value>,
}

/// One logged history point of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub step: f64,
    pub value: f64,
}

/// A run's fetched history for one metric, ready for alignment
#[derive(Debug, Clone)]
pub struct RunSeries {
    /// Run name; becomes the column name in the aligned frame
    pub name: String,
    pub samples: Vec<Sample>,
}

/// History rows come back as loose JSON objects keyed by metric name.
///
/// Kept as `serde_json::Value` because services disagree on row schema;
/// the client extracts the requested keys and skips non-numeric rows.
pub type RawHistoryRows = Vec<Value>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;

    // Same bound the client uses for its payloads
    fn parse<T: DeserializeOwned>(body: &str) -> ApiResponse<T> {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_envelope_missing_fields_are_none() {
        let response: ApiResponse<Vec<Run>> = parse("{}");
        assert!(response.result.is_none());
        assert!(response.error.is_none());
    }

    #[test]
    fn test_envelope_payload_needs_no_default() {
        // Run does not implement Default; the envelope must still parse
        let response: ApiResponse<Run> = parse(r#"{"result": {"name": "r1"}}"#);
        assert_eq!(response.result.unwrap().name, "r1");
    }

    #[test]
    fn test_envelope_error_body() {
        let response: ApiResponse<Vec<Run>> =
            parse(r#"{"error": {"code": 404, "message": "no such project"}}"#);
        let error = response.error.unwrap();
        assert_eq!(error.code, 404);
        assert_eq!(error.message, "no such project");
    }
}
