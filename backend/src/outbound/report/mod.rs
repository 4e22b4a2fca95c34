//! Report generator outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `ReportGenerator`
//! port against a Gemini-style `generateContent` endpoint.

mod dto;
mod gemini;

pub use gemini::{DEFAULT_REPORT_MODEL, GeminiReportGenerator};
