//! Logging
//!
//! Request/response log sinks.

use parking_lot::Mutex;
use serde_json::Value;
use std::io::{self, Write};
use url::form_urlencoded;

use crate::core::{HttpRequest, HttpResponse};

const REDACTED: &str = "[REDACTED]";

/// Destination for request/response dumps.
///
/// Failures are reported to the caller of `write_entry` but never affect the
/// request being logged.
#[cfg_attr(test, mockall::automock)]
pub trait LogSink: Send + Sync {
    /// Write one formatted exchange.
    fn write_entry(&self, entry: &str) -> io::Result<()>;
}

/// Sink writing to any [`Write`] implementation.
pub struct WriterLogSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterLogSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> LogSink for WriterLogSink<W> {
    fn write_entry(&self, entry: &str) -> io::Result<()> {
        let mut writer = self.writer.lock();
        writer.write_all(entry.as_bytes())?;
        writer.flush()
    }
}

/// In-memory sink for testing.
#[derive(Default)]
pub struct InMemoryLogSink {
    entries: Mutex<Vec<String>>,
}

impl InMemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries written so far.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Check if any entry contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.lock().iter().any(|e| e.contains(needle))
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl LogSink for InMemoryLogSink {
    fn write_entry(&self, entry: &str) -> io::Result<()> {
        self.entries.lock().push(entry.to_string());
        Ok(())
    }
}

/// Sink forwarding entries to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn write_entry(&self, entry: &str) -> io::Result<()> {
        tracing::debug!(target: "payment_integration::exchange", "{}", entry);
        Ok(())
    }
}

/// Format a request and, when one arrived, its response.
///
/// Form-encoded bodies are included as the request data; JSON bodies are not.
/// The `Authorization` header never appears since only response headers are dumped.
/// Credentials and card data are masked in form data, and token fields are masked
/// in JSON response bodies.
pub fn format_exchange(request: &HttpRequest, response: Option<&HttpResponse>) -> String {
    let form_data = match (request.header("content-type"), &request.body) {
        (Some(ct), Some(body)) if ct.starts_with(crate::core::CONTENT_TYPE_FORM) => {
            redact_form(body)
        }
        _ => String::new(),
    };

    let dump = response.map(dump_response).unwrap_or_default();

    format!(
        "Request: {} {}. Data: {}\nResponse: {}\n",
        request.method, request.url, form_data, dump
    )
}

fn dump_response(response: &HttpResponse) -> String {
    let mut headers: Vec<_> = response.headers.iter().collect();
    headers.sort();

    let mut out = format!("HTTP/1.1 {} {}\r\n", response.status, response.status_text);
    for (name, value) in headers {
        out.push_str(&format!("{}: {}\r\n", name, value));
    }
    out.push_str("\r\n");
    out.push_str(&redact_json(response.text()));
    out
}

fn redact_form(body: &str) -> String {
    body.split('&')
        .map(|pair| {
            let raw_key = pair.split_once('=').map_or(pair, |(key, _)| key);
            let sensitive = form_urlencoded::parse(raw_key.as_bytes())
                .next()
                .is_some_and(|(key, _)| is_sensitive_field(&key));
            if sensitive {
                format!("{}={}", raw_key, REDACTED)
            } else {
                pair.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn is_sensitive_field(key: &str) -> bool {
    matches!(
        key,
        "code" | "refresh_token" | "client_secret" | "secret" | "password"
    ) || key.ends_with("[number]")
        || key.ends_with("[cvc]")
        || key.ends_with("account_number")
}

fn redact_json(body: String) -> String {
    let Ok(Value::Object(mut fields)) = serde_json::from_str::<Value>(&body) else {
        return body;
    };
    let mut redacted = false;
    for (key, value) in fields.iter_mut() {
        if is_token_field(key) && value.is_string() {
            *value = Value::String(REDACTED.to_string());
            redacted = true;
        }
    }
    if !redacted {
        return body;
    }
    serde_json::to_string(&Value::Object(fields)).unwrap_or(body)
}

fn is_token_field(key: &str) -> bool {
    matches!(
        key,
        "access_token" | "refresh_token" | "id_token" | "new_access_token"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{new_form_request, HttpMethod};

    fn form_request() -> HttpRequest {
        let mut request = HttpRequest::new(
            HttpMethod::Post,
            "https://api.sandbox.paypal.com/v1/oauth2/token",
        );
        request.set_header("content-type", crate::core::CONTENT_TYPE_FORM);
        request.body = Some("grant_type=client_credentials".to_string());
        request
    }

    #[test]
    fn test_format_exchange_with_response() {
        let mut response = HttpResponse::new(200, r#"{"access_token":"abc"}"#);
        response
            .headers
            .insert("paypal-debug-id".to_string(), "f1e2".to_string());

        let entry = format_exchange(&form_request(), Some(&response));

        assert!(entry.starts_with(
            "Request: POST https://api.sandbox.paypal.com/v1/oauth2/token. Data: grant_type=client_credentials\n"
        ));
        assert!(entry.contains("HTTP/1.1 200 OK\r\n"));
        assert!(entry.contains("paypal-debug-id: f1e2\r\n"));
        assert!(entry.ends_with("{\"access_token\":\"[REDACTED]\"}\n"));
        assert!(!entry.contains("abc"));
    }

    #[test]
    fn test_format_exchange_without_response() {
        let entry = format_exchange(&form_request(), None);
        assert!(entry.ends_with("Response: \n"));
    }

    #[test]
    fn test_json_bodies_are_not_logged() {
        let mut request = HttpRequest::new(HttpMethod::Post, "https://example.com");
        request.set_header("content-type", "application/json");
        request.body = Some(r#"{"number":"4111111111111111"}"#.to_string());

        let entry = format_exchange(&request, None);
        assert!(!entry.contains("4111"));
    }

    #[test]
    fn test_sensitive_form_fields_are_redacted() {
        let mut request = form_request();
        request.body = Some("grant_type=authorization_code&code=xyz&redirect_uri=r".to_string());

        let entry = format_exchange(&request, None);
        assert!(entry.contains("code=[REDACTED]"));
        assert!(!entry.contains("xyz"));
    }

    #[test]
    fn test_card_form_fields_are_redacted() {
        let request = new_form_request(
            HttpMethod::Post,
            "https://api.stripe.com/v1/payment_methods",
            &[
                ("type", "card"),
                ("card[number]", "4242424242424242"),
                ("card[exp_month]", "12"),
                ("card[cvc]", "123"),
            ],
        )
        .unwrap();

        let entry = format_exchange(&request, None);
        assert!(entry.contains("type=card"));
        assert!(entry.contains("card%5Bnumber%5D=[REDACTED]"));
        assert!(entry.contains("card%5Bcvc%5D=[REDACTED]"));
        assert!(entry.contains("card%5Bexp_month%5D=12"));
        assert!(!entry.contains("4242424242424242"));
        assert!(!entry.contains("=123"));
    }

    #[test]
    fn test_token_fields_in_response_are_redacted() {
        let response = HttpResponse::new(
            200,
            r#"{"scope":"openid","access_token":"A21AAF","refresh_token":"R23AAG","token_type":"Bearer","expires_in":28800}"#,
        );

        let entry = format_exchange(&form_request(), Some(&response));
        assert!(!entry.contains("A21AAF"));
        assert!(!entry.contains("R23AAG"));
        assert!(entry.contains("\"token_type\":\"Bearer\""));
        assert!(entry.contains("\"expires_in\":28800"));
    }

    #[test]
    fn test_plain_response_body_is_kept_verbatim() {
        let body = "{ \"id\": \"PAY-1\", \"state\": \"approved\" }";
        let response = HttpResponse::new(200, body);

        let entry = format_exchange(&form_request(), Some(&response));
        assert!(entry.ends_with(&format!("{}\n", body)));
    }

    #[test]
    fn test_writer_sink() {
        let sink = WriterLogSink::new(Vec::new());
        sink.write_entry("one\n").unwrap();
        sink.write_entry("two\n").unwrap();
        assert_eq!(sink.into_inner(), b"one\ntwo\n");
    }

    #[test]
    fn test_in_memory_sink() {
        let sink = InMemoryLogSink::new();
        sink.write_entry("Request: GET https://x").unwrap();
        assert!(sink.contains("GET https://x"));
        sink.clear();
        assert!(sink.entries().is_empty());
    }
}
