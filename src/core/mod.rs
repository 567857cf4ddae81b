//! Core Infrastructure
//!
//! Transport, request construction and the shared request executor.

pub mod executor;
pub mod request;
pub mod transport;

pub use executor::RequestExecutor;
pub use request::{
    new_form_request, new_query_request, new_request, CONTENT_TYPE_FORM, CONTENT_TYPE_JSON,
};
pub use transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockHttpTransport,
    ReqwestHttpTransport, DEFAULT_MAX_RESPONSE_SIZE,
};
