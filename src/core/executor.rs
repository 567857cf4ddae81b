//! Request Executor
//!
//! Applies default headers, sends through the transport, logs the exchange,
//! classifies the status and decodes the body.

use serde::de::DeserializeOwned;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::core::{HttpRequest, HttpResponse, HttpTransport, CONTENT_TYPE_JSON};
use crate::error::{ErrorFormat, NetworkError, PaymentResult, ProtocolError};
use crate::telemetry::{format_exchange, LogSink};

/// Sends requests on behalf of a provider client.
pub struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
    log_sink: Option<Arc<dyn LogSink>>,
    error_format: ErrorFormat,
    return_representation: AtomicBool,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>, error_format: ErrorFormat) -> Self {
        Self {
            transport,
            log_sink: None,
            error_format,
            return_representation: AtomicBool::new(false),
        }
    }

    /// Attach a sink receiving every exchange.
    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = Some(sink);
        self
    }

    /// Ask the provider to return the full resource on writes.
    pub fn set_return_representation(&self, enabled: bool) {
        self.return_representation.store(enabled, Ordering::Relaxed);
    }

    pub fn return_representation(&self) -> bool {
        self.return_representation.load(Ordering::Relaxed)
    }

    /// Send and require a 2xx status, returning the raw response.
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn execute(&self, mut request: HttpRequest) -> PaymentResult<HttpResponse> {
        self.apply_default_headers(&mut request);

        let result = self.dispatch(&request).await;

        if let Some(sink) = &self.log_sink {
            let entry = format_exchange(&request, result.as_ref().ok());
            if let Err(e) = sink.write_entry(&entry) {
                warn!(error = %e, "log sink write failed");
            }
        }

        let response = result?;
        if response.is_success() {
            debug!(status = response.status, "request succeeded");
            return Ok(response);
        }

        let error = self.error_format.decode(
            response.status,
            request.method.as_str(),
            &request.url,
            &response.body,
        );
        debug!(status = response.status, name = %error.name, "provider returned error");
        Err(error.into())
    }

    /// Send and decode a 2xx JSON body into `T`.
    pub async fn send_json<T: DeserializeOwned>(&self, request: HttpRequest) -> PaymentResult<T> {
        let response = self.execute(request).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Send and ignore the body of a 2xx response.
    pub async fn send_no_content(&self, request: HttpRequest) -> PaymentResult<()> {
        self.execute(request).await.map(|_| ())
    }

    /// Send and copy the body of a 2xx response into `sink`, returning the byte count.
    pub async fn send_raw<W: Write + ?Sized>(
        &self,
        request: HttpRequest,
        sink: &mut W,
    ) -> PaymentResult<u64> {
        let response = self.execute(request).await?;
        sink.write_all(&response.body)
            .map_err(|e| ProtocolError::SinkWrite {
                message: e.to_string(),
            })?;
        Ok(response.body.len() as u64)
    }

    fn apply_default_headers(&self, request: &mut HttpRequest) {
        request.set_header("accept", CONTENT_TYPE_JSON);
        request.set_header("accept-language", "en_US");
        request.set_default_header("content-type", CONTENT_TYPE_JSON);
        if self.return_representation() {
            request.set_default_header("prefer", "return=representation");
        }
    }

    async fn dispatch(&self, request: &HttpRequest) -> PaymentResult<HttpResponse> {
        match &request.cancellation {
            Some(token) => {
                if token.is_cancelled() {
                    return Err(NetworkError::Cancelled.into());
                }
                tokio::select! {
                    _ = token.cancelled() => Err(NetworkError::Cancelled.into()),
                    result = self.transport.send(request.clone()) => result,
                }
            }
            None => self.transport.send(request.clone()).await,
        }
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("error_format", &self.error_format)
            .field("has_log_sink", &self.log_sink.is_some())
            .field("return_representation", &self.return_representation())
            .finish()
    }
}
