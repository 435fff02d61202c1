//! Input and output formats.
//!
//! This module implements parsing of tuple-list literals for stations and
//! devices, plain-text report formatting, and the structured request/response
//! format used in service mode.

pub mod report;
pub mod request;
pub mod tuples;

pub use report::{format_coverage, format_report, write_report};
pub use request::{handle_bytes, handle_json, handle_request, Request, RequestError, Response};
pub use tuples::{parse_devices, parse_entries, parse_stations, TupleError};
