//! HTTP client for the tracking-service API.

use super::types::{ApiErrorBody, ApiRequest, ApiResponse, RawHistoryRows, Run, Sample};
use crate::utils::config::DEFAULT_API_TIMEOUT;
use crate::utils::error::ApiError;
use log::{debug, info};
use reqwest::blocking::Client as HttpClient;
use serde_json::Value;

/// Client for fetching runs and metric history from the tracking service
pub struct Client {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl Client {
    /// Create a new client with the fixed connect timeout
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, ApiError> {
        let http = HttpClient::builder()
            .timeout(DEFAULT_API_TIMEOUT)
            .build()
            .map_err(ApiError::RequestFailed)?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key,
        })
    }

    /// Fetch all runs of a project
    pub fn fetch_runs(&self, entity: &str, project: &str) -> Result<Vec<Run>, ApiError> {
        info!("Fetching runs for {}/{}", entity, project);

        let runs: Vec<Run> = self.call(ApiRequest::runs(entity, project), project)?;

        debug!("Fetched {} runs", runs.len());
        Ok(runs)
    }

    /// Fetch up to `samples` history rows of one metric for one run.
    ///
    /// Rows missing the metric or the x key, or holding non-numeric values,
    /// are skipped. If the server over-returns, the rows are evenly
    /// subsampled down to the cap, keeping both endpoints.
    pub fn fetch_history(
        &self,
        entity: &str,
        project: &str,
        run_name: &str,
        metric: &str,
        x_key: &str,
        samples: usize,
    ) -> Result<Vec<Sample>, ApiError> {
        debug!("Fetching history for run '{}', metric '{}'", run_name, metric);

        let rows: RawHistoryRows = self.call(
            ApiRequest::history(entity, project, run_name, metric, x_key, samples),
            project,
        )?;

        let mut points: Vec<Sample> = rows
            .iter()
            .filter_map(|row| {
                let step = numeric_field(row, x_key)?;
                let value = numeric_field(row, metric)?;
                Some(Sample { step, value })
            })
            .collect();

        if samples > 0 && points.len() > samples {
            points = subsample(points, samples);
        }

        debug!("Run '{}': {} usable samples", run_name, points.len());
        Ok(points)
    }

    /// POST a request envelope and unwrap the typed result
    fn call<T: serde::de::DeserializeOwned>(
        &self,
        request: ApiRequest,
        project: &str,
    ) -> Result<T, ApiError> {
        let url = format!("{}/api/{}", self.base_url.trim_end_matches('/'), request.method);

        let mut builder = self.http.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().map_err(ApiError::RequestFailed)?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(ApiError::InvalidResponse(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().unwrap_or_default()
            )));
        }

        let envelope: ApiResponse<T> = response.json().map_err(ApiError::RequestFailed)?;

        if let Some(error) = envelope.error {
            return Err(map_api_error(error, project));
        }

        envelope
            .result
            .ok_or_else(|| ApiError::InvalidResponse("Missing result field".to_string()))
    }
}

/// Extract a numeric field from a loose JSON history row
fn numeric_field(row: &Value, key: &str) -> Option<f64> {
    row.get(key)?.as_f64()
}

/// Evenly subsample to `cap` points, keeping the first and last
fn subsample(points: Vec<Sample>, cap: usize) -> Vec<Sample> {
    if cap == 0 || points.len() <= cap {
        return points;
    }
    if cap == 1 {
        return vec![points[0]];
    }
    let last = points.len() - 1;
    (0..cap)
        .map(|i| points[i * last / (cap - 1)])
        .collect()
}

/// Map a service error object to our error type
fn map_api_error(error: ApiErrorBody, project: &str) -> ApiError {
    match error.code {
        404 => ApiError::ProjectNotFound(project.to_string()),
        401 | 403 => ApiError::Unauthorized,
        _ => ApiError::InvalidResponse(format!("{}: {}", error.code, error.message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_field() {
        let row = serde_json::json!({"_step": 10, "reward": 0.5, "note": "x"});
        assert_eq!(numeric_field(&row, "_step"), Some(10.0));
        assert_eq!(numeric_field(&row, "reward"), Some(0.5));
        assert_eq!(numeric_field(&row, "note"), None);
        assert_eq!(numeric_field(&row, "missing"), None);
    }

    #[test]
    fn test_subsample_keeps_endpoints() {
        let points: Vec<Sample> = (0..10)
            .map(|i| Sample { step: i as f64, value: i as f64 })
            .collect();

        let sampled = subsample(points, 4);

        assert_eq!(sampled.len(), 4);
        assert_eq!(sampled[0].step, 0.0);
        assert_eq!(sampled[3].step, 9.0);
    }

    #[test]
    fn test_subsample_under_cap_unchanged() {
        let points = vec![Sample { step: 0.0, value: 1.0 }];
        let sampled = subsample(points.clone(), 5);
        assert_eq!(sampled, points);
    }

    #[test]
    fn test_map_api_error() {
        let err = map_api_error(
            ApiErrorBody { code: 404, message: "no such project".into() },
            "proj",
        );
        assert!(matches!(err, ApiError::ProjectNotFound(p) if p == "proj"));
    }
}
