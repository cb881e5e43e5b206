use crate::common::ApiResponse;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::any::Any;
use std::fmt;

/// Error returned from a handler
///
/// Any `std::error::Error` converts into an `HttpError` without a status; the
/// application's configured error status is used for those. Build one with
/// [`HttpError::new`] to choose the status explicitly.
pub struct HttpError {
    status: Option<StatusCode>,
    message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// An error whose status is left to the application default
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl<E> From<E> for HttpError
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::msg(error.to_string())
    }
}

impl fmt::Debug for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpError")
            .field("status", &self.status)
            .field("message", &self.message)
            .finish()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Every response shape a handler may produce
#[derive(Debug)]
pub enum Reply {
    Empty(StatusCode),
    Text(StatusCode, String),
    Json(StatusCode, serde_json::Value),
    Failure(HttpError),
    Response(Response),
}

impl Reply {
    /// Override the status of a successful reply; failures keep their own
    pub fn with_status(self, status: StatusCode) -> Self {
        match self {
            Reply::Empty(_) => Reply::Empty(status),
            Reply::Text(_, text) => Reply::Text(status, text),
            Reply::Json(_, value) => Reply::Json(status, value),
            Reply::Failure(error) => Reply::Failure(error),
            Reply::Response(mut response) => {
                *response.status_mut() = status;
                Reply::Response(response)
            }
        }
    }

    /// Set the `content-type` of a successful reply; failures stay JSON
    pub fn with_content_type(self, content_type: HeaderValue) -> Self {
        if self.is_failure() {
            return self;
        }
        // successful replies never consult the error status
        let mut response = self.render(StatusCode::INTERNAL_SERVER_ERROR);
        response.headers_mut().insert(CONTENT_TYPE, content_type);
        Reply::Response(response)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Reply::Failure(_))
    }

    /// Render the reply, using `error_status` for failures without a status
    pub fn render(self, error_status: StatusCode) -> Response {
        match self {
            Reply::Empty(status) => status.into_response(),
            Reply::Text(status, text) => (status, text).into_response(),
            Reply::Json(status, value) => (status, Json(value)).into_response(),
            Reply::Failure(error) => {
                let status = error.status.unwrap_or(error_status);
                super::failure_response(status, &error.message)
            }
            Reply::Response(response) => response,
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        self.render(StatusCode::BAD_REQUEST)
    }
}

/// Conversion from a handler's return value into a [`Reply`]
///
/// Implemented for a closed set of shapes; a handler returning anything else
/// does not compile.
pub trait IntoReply {
    fn into_reply(self) -> Reply;
}

impl IntoReply for Reply {
    fn into_reply(self) -> Reply {
        self
    }
}

impl IntoReply for () {
    fn into_reply(self) -> Reply {
        Reply::Empty(StatusCode::OK)
    }
}

impl IntoReply for bool {
    fn into_reply(self) -> Reply {
        if self {
            Reply::Empty(StatusCode::OK)
        } else {
            Reply::Empty(StatusCode::NOT_FOUND)
        }
    }
}

impl IntoReply for String {
    fn into_reply(self) -> Reply {
        Reply::Text(StatusCode::OK, self)
    }
}

impl IntoReply for &'static str {
    fn into_reply(self) -> Reply {
        Reply::Text(StatusCode::OK, self.to_string())
    }
}

impl IntoReply for StatusCode {
    fn into_reply(self) -> Reply {
        Reply::Empty(self)
    }
}

impl<T: IntoReply> IntoReply for (StatusCode, T) {
    fn into_reply(self) -> Reply {
        self.1.into_reply().with_status(self.0)
    }
}

/// Body-first status pairs: `(body, StatusCode)`
macro_rules! status_last {
    ($($body:ty),* $(,)?) => {
        $(
            impl IntoReply for ($body, StatusCode) {
                fn into_reply(self) -> Reply {
                    self.0.into_reply().with_status(self.1)
                }
            }
        )*
    };
}

status_last!(String, &'static str, serde_json::Value, Reply, Response);

impl<T: Serialize> IntoReply for (Json<T>, StatusCode) {
    fn into_reply(self) -> Reply {
        self.0.into_reply().with_status(self.1)
    }
}

/// Media type paired with a body, as in `(html, ContentType::HTML)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentType(pub &'static str);

impl ContentType {
    pub const HTML: ContentType = ContentType("text/html; charset=utf-8");
    pub const XML: ContentType = ContentType("application/xml");
    pub const JSON: ContentType = ContentType("application/json");
    pub const TEXT: ContentType = ContentType("text/plain; charset=utf-8");
}

impl<T: IntoReply> IntoReply for (T, ContentType) {
    fn into_reply(self) -> Reply {
        match HeaderValue::from_str(self.1 .0) {
            Ok(content_type) => self.0.into_reply().with_content_type(content_type),
            Err(_) => Reply::Failure(HttpError::internal(format!(
                "invalid content type '{}'",
                self.1 .0
            ))),
        }
    }
}

impl<T: IntoReply> IntoReply for Option<T> {
    fn into_reply(self) -> Reply {
        match self {
            Some(value) => value.into_reply(),
            None => Reply::Empty(StatusCode::NOT_FOUND),
        }
    }
}

impl<T, E> IntoReply for Result<T, E>
where
    T: IntoReply,
    E: Into<HttpError>,
{
    fn into_reply(self) -> Reply {
        match self {
            Ok(value) => value.into_reply(),
            Err(error) => Reply::Failure(error.into()),
        }
    }
}

impl IntoReply for HttpError {
    fn into_reply(self) -> Reply {
        Reply::Failure(self)
    }
}

impl<T: Serialize> IntoReply for Json<T> {
    fn into_reply(self) -> Reply {
        match serde_json::to_value(&self.0) {
            Ok(value) => Reply::Json(StatusCode::OK, value),
            Err(e) => Reply::Failure(HttpError::internal(e.to_string())),
        }
    }
}

impl IntoReply for serde_json::Value {
    fn into_reply(self) -> Reply {
        Reply::Json(StatusCode::OK, self)
    }
}

impl IntoReply for Response {
    fn into_reply(self) -> Reply {
        Reply::Response(self)
    }
}

impl<T: Serialize> IntoReply for ApiResponse<T> {
    fn into_reply(self) -> Reply {
        Reply::Response(self.into_response())
    }
}

/// Type-erased return values are unwrapped when they hold a known shape
impl IntoReply for Box<dyn Any + Send> {
    fn into_reply(self) -> Reply {
        macro_rules! try_shapes {
            ($value:ident, $($ty:ty),*) => {
                $(
                    let $value = match $value.downcast::<$ty>() {
                        Ok(shape) => return (*shape).into_reply(),
                        Err(other) => other,
                    };
                )*
            };
        }

        let value = self;
        try_shapes!(
            value,
            Reply,
            (),
            bool,
            String,
            &'static str,
            StatusCode,
            (String, StatusCode),
            serde_json::Value,
            Response,
            HttpError
        );
        drop(value);
        tracing::warn!("handler returned a value of unsupported type");
        Reply::Failure(HttpError::internal("unsupported return shape"))
    }
}
