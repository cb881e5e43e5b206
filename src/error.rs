use axum::http::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MvcError>;

#[derive(Debug, Error)]
pub enum MvcError {
    #[error("Malformed dependency {type_name}: {reason}")]
    MalformedDependency {
        type_name: &'static str,
        reason: String,
    },

    #[error("Invalid route '{path}': {reason}")]
    InvalidRoute { path: String, reason: String },

    #[error("Missing path parameter '{name}'")]
    MissingPathParam { name: String },

    #[error("Path parameter '{name}' = '{value}' is not a valid {expected}")]
    PathParam {
        name: String,
        value: String,
        expected: &'static str,
    },

    #[error("Required dependency {type_name} is not available for this request")]
    MissingDependency { type_name: &'static str },

    #[error("Dependency produced an unexpected type, expected {type_name}")]
    Binding { type_name: &'static str },

    #[error("Invalid request body: {0}")]
    Body(String),

    #[error("Invalid configuration value for {key}: {message}")]
    Config { key: String, message: String },
}

impl MvcError {
    /// Create a binding mismatch error for `T`
    pub fn binding<T: ?Sized>() -> Self {
        Self::Binding {
            type_name: std::any::type_name::<T>(),
        }
    }

    /// HTTP status used when this error reaches a client.
    pub fn status(&self) -> StatusCode {
        match self {
            MvcError::MissingPathParam { .. } | MvcError::PathParam { .. } => StatusCode::NOT_FOUND,
            MvcError::Body(_) | MvcError::MissingDependency { .. } => StatusCode::BAD_REQUEST,
            MvcError::MalformedDependency { .. }
            | MvcError::InvalidRoute { .. }
            | MvcError::Binding { .. }
            | MvcError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for MvcError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        crate::emit::failure_response(status, &self.to_string())
    }
}
