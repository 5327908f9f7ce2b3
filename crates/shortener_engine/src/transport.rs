use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::{json, Value};
use shortener_core::{FailureKind, ShortenRequest, TransportError};
use shortener_logging::shortener_debug;
use url::Url;

use crate::{EngineError, PayloadEncoding, TransportSettings};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Posts `{url}` to the request's endpoint and returns the response body.
    async fn post(&self, request: &ShortenRequest) -> Result<Value, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    settings: TransportSettings,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Result<Self, EngineError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| EngineError::Client(err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn resolve(&self, endpoint: &str) -> Result<Url, TransportError> {
        let invalid = |err: url::ParseError| {
            TransportError::new(FailureKind::InvalidEndpoint, format!("{endpoint}: {err}"))
        };
        match Url::parse(endpoint) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.settings.base_url {
                Some(base) => base.join(endpoint).map_err(invalid),
                None => Err(invalid(url::ParseError::RelativeUrlWithoutBase)),
            },
            Err(err) => Err(invalid(err)),
        }
    }

    fn encode(&self, url: &str) -> (&'static str, String) {
        match self.settings.payload {
            PayloadEncoding::Form => {
                let body = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("url", url)
                    .finish();
                (FORM_CONTENT_TYPE, body)
            }
            PayloadEncoding::Json => (JSON_CONTENT_TYPE, json!({ "url": url }).to_string()),
        }
    }

    /// Non-2xx responses fail with their status. The body is kept as detail
    /// only when it fits under the size cap.
    async fn status_error(
        &self,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> TransportError {
        let kind = FailureKind::HttpStatus(status.as_u16());
        let fits = response
            .content_length()
            .is_none_or(|len| len <= self.settings.max_body_bytes);
        let body = if fits {
            response.bytes().await.ok()
        } else {
            None
        };
        let detail = body
            .filter(|bytes| bytes.len() as u64 <= self.settings.max_body_bytes)
            .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
            .unwrap_or_default();
        if detail.is_empty() {
            TransportError::new(kind, status.to_string())
        } else {
            TransportError::new(kind, format!("{status}: {detail}"))
        }
    }

    fn too_large(&self, actual: u64) -> TransportError {
        TransportError::new(
            FailureKind::Body,
            format!(
                "response too large (max {}, actual {actual})",
                self.settings.max_body_bytes
            ),
        )
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, request: &ShortenRequest) -> Result<Value, TransportError> {
        let target = self.resolve(&request.endpoint)?;
        let (content_type, body) = self.encode(&request.url);
        shortener_debug!(
            "POST {} for field {} ({:?})",
            target,
            request.field,
            request.ticket
        );

        let response = self
            .client
            .post(target)
            .header(CONTENT_TYPE, content_type)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(status, response).await);
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_body_bytes {
                return Err(self.too_large(content_len));
            }
        }
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        if bytes.len() as u64 > self.settings.max_body_bytes {
            return Err(self.too_large(bytes.len() as u64));
        }

        Ok(parse_body(&bytes))
    }
}

/// Response bodies are passed through: JSON when they parse, the raw text
/// otherwise, `null` when empty.
fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_body() || err.is_decode() {
        return TransportError::new(FailureKind::Body, err.to_string());
    }
    TransportError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_parsing_falls_back_to_text() {
        assert_eq!(parse_body(br#"{"short":"http://x/1"}"#), json!({"short": "http://x/1"}));
        assert_eq!(parse_body(b"http://x/1"), json!("http://x/1"));
        assert_eq!(parse_body(b"  \n"), Value::Null);
    }

    #[test]
    fn relative_endpoint_needs_a_base() {
        let transport = ReqwestTransport::new(TransportSettings::default()).unwrap();
        let err = transport.resolve("/api/shorten").unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidEndpoint);

        let transport = ReqwestTransport::new(TransportSettings {
            base_url: Some(Url::parse("http://localhost:8080/app/").unwrap()),
            ..TransportSettings::default()
        })
        .unwrap();
        assert_eq!(
            transport.resolve("/api/shorten").unwrap().as_str(),
            "http://localhost:8080/api/shorten"
        );
        assert_eq!(
            transport.resolve("https://sho.rt/new").unwrap().as_str(),
            "https://sho.rt/new"
        );
    }

    #[test]
    fn form_payload_escapes_the_url() {
        let transport = ReqwestTransport::new(TransportSettings::default()).unwrap();
        let (content_type, body) = transport.encode("http://example.com/?a=1&b=2");
        assert_eq!(content_type, FORM_CONTENT_TYPE);
        assert_eq!(body, "url=http%3A%2F%2Fexample.com%2F%3Fa%3D1%26b%3D2");
    }
}
