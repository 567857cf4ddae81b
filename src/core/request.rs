//! Request Builder
//!
//! Constructs outbound requests with serialized bodies.

use serde::Serialize;

use crate::core::{HttpMethod, HttpRequest};
use crate::error::{PaymentResult, ProtocolError};

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// Build a request whose body is the JSON encoding of `payload`.
///
/// No body is attached when `payload` is `None`. Headers other than
/// `Content-Type` are left to the dispatcher and transport.
pub fn new_request<P>(
    method: HttpMethod,
    url: impl Into<String>,
    payload: Option<&P>,
) -> PaymentResult<HttpRequest>
where
    P: Serialize + ?Sized,
{
    let mut request = HttpRequest::new(method, url);
    if let Some(payload) = payload {
        let body = serde_json::to_string(payload).map_err(|e| ProtocolError::Serialization {
            message: e.to_string(),
        })?;
        request.body = Some(body);
        request.set_header("content-type", CONTENT_TYPE_JSON);
    }
    Ok(request)
}

/// Build a request with a form-encoded body.
pub fn new_form_request<P>(
    method: HttpMethod,
    url: impl Into<String>,
    form: &P,
) -> PaymentResult<HttpRequest>
where
    P: Serialize + ?Sized,
{
    let body = serde_urlencoded::to_string(form).map_err(|e| ProtocolError::Serialization {
        message: e.to_string(),
    })?;
    let mut request = HttpRequest::new(method, url);
    request.body = Some(body);
    request.set_header("content-type", CONTENT_TYPE_FORM);
    Ok(request)
}

/// Build a GET request with `query` appended to `url`.
pub fn new_query_request<Q>(url: &str, query: &Q) -> PaymentResult<HttpRequest>
where
    Q: Serialize + ?Sized,
{
    let encoded = serde_urlencoded::to_string(query).map_err(|e| ProtocolError::Serialization {
        message: e.to_string(),
    })?;
    let url = if encoded.is_empty() {
        url.to_string()
    } else if url.contains('?') {
        format!("{}&{}", url, encoded)
    } else {
        format!("{}?{}", url, encoded)
    };
    Ok(HttpRequest::new(HttpMethod::Get, url))
}
