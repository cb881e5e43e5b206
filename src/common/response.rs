use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Envelope for JSON handler replies
///
/// Handlers may return it directly; the stored status becomes the response
/// status and the envelope is the JSON body.
///
/// # Example
/// ```rust,ignore
/// fn get_by(&self, id: u64) -> ApiResponse<Todo> {
///     match self.todos.find(id) {
///         Some(todo) => ApiResponse::success(todo),
///         None => ApiResponse::error(StatusCode::NOT_FOUND, "todo not found"),
///     }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    pub success: bool,

    #[serde(skip)]
    pub http_status: StatusCode,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response with data, HTTP 200
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            success: true,
            http_status: StatusCode::OK,
        }
    }

    /// Successful response with an explicit status, e.g. 201 Created
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.http_status = status;
        self
    }

    /// Error response; `code` is the status's canonical reason phrase
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        let code = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_u16().to_string());
        Self {
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
            success: false,
            http_status: status,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.http_status, Json(self)).into_response()
    }
}
