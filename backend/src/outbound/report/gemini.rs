//! Reqwest-backed generative-language report adapter.
//!
//! The adapter owns transport details only: prompt assembly, timeout and HTTP
//! error mapping, and extracting the JSON document from the first candidate.
//! The returned JSON is untrusted and validated by the domain.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use super::dto::{GenerateRequestDto, GenerateResponseDto};
use crate::domain::ReportInput;
use crate::domain::ports::{ReportGenerator, ReportGeneratorError};
use crate::outbound::http_support::status_message;

/// Model used when none is configured.
pub const DEFAULT_REPORT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
const API_KEY_HEADER: &str = "x-goog-api-key";

const PROMPT_PREAMBLE: &str = "Eres un analista del laboratorio de cocina. Con los datos JSON \
siguientes (prestamos, adeudos, completados y pagados) genera un reporte estadistico de uso. \
Responde solo con un objeto JSON con las claves: resumen (texto), hallazgos (lista de textos), \
recomendaciones (lista de textos) e indicadores (objeto de nombre a numero).";

/// Report generator calling `models/{model}:generateContent`.
pub struct GeminiReportGenerator {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl GeminiReportGenerator {
    /// Build an adapter against the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when the model name does not form a valid URL or the
    /// reqwest client cannot be constructed.
    pub fn new(
        api_key: impl Into<String>,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, ReportGeneratorError> {
        let base = Url::parse(DEFAULT_BASE_URL)
            .map_err(|err| ReportGeneratorError::not_configured(err.to_string()))?;
        Self::with_base_url(base, api_key, model, timeout)
    }

    /// Build an adapter against an explicit API base URL.
    ///
    /// # Errors
    ///
    /// See [`GeminiReportGenerator::new`].
    pub fn with_base_url(
        base: Url,
        api_key: impl Into<String>,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, ReportGeneratorError> {
        let model = model.trim();
        if model.is_empty() {
            return Err(ReportGeneratorError::not_configured("model must not be empty"));
        }
        let endpoint = base
            .join(&format!("models/{model}:generateContent"))
            .map_err(|err| ReportGeneratorError::not_configured(err.to_string()))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ReportGeneratorError::not_configured(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl ReportGenerator for GeminiReportGenerator {
    async fn generate(&self, input: &ReportInput) -> Result<Value, ReportGeneratorError> {
        let prompt = build_prompt(input)?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&GenerateRequestDto::json_prompt(&prompt))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_report(body.as_ref())
    }
}

fn build_prompt(input: &ReportInput) -> Result<String, ReportGeneratorError> {
    let data = serde_json::to_string(input)
        .map_err(|err| ReportGeneratorError::decode(format!("failed to encode input: {err}")))?;
    Ok(format!("{PROMPT_PREAMBLE}\n\nDatos:\n{data}"))
}

fn parse_report(body: &[u8]) -> Result<Value, ReportGeneratorError> {
    let decoded: GenerateResponseDto = serde_json::from_slice(body).map_err(|err| {
        ReportGeneratorError::decode(format!("invalid generateContent payload: {err}"))
    })?;
    let text = decoded.into_text().map_err(ReportGeneratorError::decode)?;
    serde_json::from_str(strip_code_fence(&text)).map_err(|err| {
        ReportGeneratorError::decode(format!("candidate text is not JSON: {err}"))
    })
}

/// Models sometimes wrap JSON in a Markdown fence despite the MIME type.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map_or(trimmed, str::trim)
}

fn map_transport_error(error: reqwest::Error) -> ReportGeneratorError {
    if error.is_timeout() {
        ReportGeneratorError::timeout(error.to_string())
    } else {
        ReportGeneratorError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ReportGeneratorError {
    let message = status_message(status, body);
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ReportGeneratorError::timeout(message)
        }
        _ => ReportGeneratorError::upstream(status.as_u16(), message),
    }
}
