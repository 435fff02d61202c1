//! Structured request/response handling for service mode.
//!
//! A request either asks for the built-in sample or supplies explicit
//! stations and devices:
//!
//! ```json
//! {"sample": true}
//! {"link-stations": [{"x": 0, "y": 0, "reach": 10}], "devices": [{"x": 0, "y": 0}]}
//! ```
//!
//! The response carries the rendered text report and the structured results,
//! or a bad-request error. Evaluation never sees a partially populated
//! station or device: a missing field rejects the whole request, as does a
//! station whose power could overflow.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::eval::{Coverage, Evaluator};
use crate::model::{Device, LinkStation};
use crate::protocol::report::format_report;
use crate::scenario::{sample_devices, sample_stations};

/// Reasons a request is rejected.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("malformed request: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("request is missing \"{0}\"")]
    MissingField(&'static str),

    #[error("request must set \"sample\": true or provide both \"link-stations\" and \"devices\"")]
    NoInput,
}

/// An evaluation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Run the built-in sample. Takes precedence over explicit input.
    #[serde(default)]
    pub sample: bool,

    #[serde(
        rename = "link-stations",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub link_stations: Option<Vec<LinkStation>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<Device>>,
}

impl Request {
    /// A request for the built-in sample.
    pub fn sample() -> Self {
        Request {
            sample: true,
            ..Request::default()
        }
    }

    /// A request for an explicit deployment.
    pub fn explicit(link_stations: Vec<LinkStation>, devices: Vec<Device>) -> Self {
        Request {
            sample: false,
            link_stations: Some(link_stations),
            devices: Some(devices),
        }
    }

    /// Resolves the stations and devices this request asks to evaluate.
    fn inputs(&self) -> Result<(Vec<LinkStation>, Vec<Device>), RequestError> {
        if self.sample {
            return Ok((sample_stations(), sample_devices()));
        }
        match (&self.link_stations, &self.devices) {
            (Some(stations), Some(devices)) => Ok((stations.clone(), devices.clone())),
            (Some(_), None) => Err(RequestError::MissingField("devices")),
            (None, Some(_)) => Err(RequestError::MissingField("link-stations")),
            (None, None) => Err(RequestError::NoInput),
        }
    }
}

/// The outcome of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok {
        report: String,
        results: Vec<Coverage>,
    },
    BadRequest {
        error: String,
    },
}

impl Response {
    pub fn bad_request(err: &RequestError) -> Self {
        Response::BadRequest {
            error: err.to_string(),
        }
    }

    /// HTTP-style status code: 200 for success, 400 for a rejected request.
    pub fn status_code(&self) -> u16 {
        match self {
            Response::Ok { .. } => 200,
            Response::BadRequest { .. } => 400,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok { .. })
    }

    /// The structured results, if the request succeeded.
    pub fn results(&self) -> Option<&[Coverage]> {
        match self {
            Response::Ok { results, .. } => Some(results),
            Response::BadRequest { .. } => None,
        }
    }
}

/// Evaluates a parsed request.
pub fn handle_request(request: &Request, evaluator: &Evaluator) -> Response {
    match request.inputs() {
        Ok((stations, devices)) => {
            debug!(
                sample = request.sample,
                stations = stations.len(),
                devices = devices.len(),
                "handling request"
            );
            let results = evaluator.evaluate(&stations, &devices);
            Response::Ok {
                report: format_report(&results),
                results,
            }
        }
        Err(e) => {
            debug!("rejecting request: {}", e);
            Response::bad_request(&e)
        }
    }
}

/// Parses a JSON payload and evaluates it. Malformed payloads become
/// bad-request responses.
pub fn handle_json(payload: &str, evaluator: &Evaluator) -> Response {
    match serde_json::from_str::<Request>(payload) {
        Ok(request) => handle_request(&request, evaluator),
        Err(e) => reject(RequestError::from(e)),
    }
}

/// Like [`handle_json`] for a raw payload that may not be UTF-8.
pub fn handle_bytes(payload: &[u8], evaluator: &Evaluator) -> Response {
    match std::str::from_utf8(payload) {
        Ok(text) => handle_json(text, evaluator),
        Err(e) => reject(RequestError::from(e)),
    }
}

fn reject(err: RequestError) -> Response {
    debug!("rejecting request: {}", err);
    Response::bad_request(&err)
}
