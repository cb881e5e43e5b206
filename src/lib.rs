//! # mvc-binder
//!
//! Controller activation and dependency binding for axum services.
//!
//! Controllers are plain cloneable structs. Their fields are filled from a
//! dependency store, their methods become routes, and method parameters are
//! bound from route path parameters or from the store. Dependencies are either
//! static values or providers computed from each request's [`Context`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mvc_binder::prelude::*;
//!
//! #[derive(Clone, Default)]
//! pub struct HelloController {
//!     greeting: String,
//!     user: User,
//! }
//!
//! #[controller(fields(greeting, user))]
//! impl HelloController {
//!     // GET /hello
//!     pub fn get(&self) -> String {
//!         format!("{}, {}", self.greeting, self.user.name)
//!     }
//!
//!     // GET /hello/{param1}
//!     pub fn get_by(&self, id: u64) -> Result<Json<Item>, HttpError> {
//!         // ...
//!     }
//!
//!     #[post("/bulk")]
//!     pub async fn import(self, items: Vec<Item>) -> StatusCode {
//!         // ...
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let router = Router::new();
//!
//!     let mut app = Application::new(router.party("/hello"));
//!     app.add_dependencies([
//!         Dependency::value(String::from("Hello")),
//!         Dependency::provider(|ctx: &Context| {
//!             ctx.header("x-user").map(|name| User { name: name.to_string() })
//!         }),
//!     ])?;
//!     app.register(HelloController::default());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, router.into_axum()).await?;
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod common;
pub mod config;
pub mod context;
pub mod controller;
pub mod di;
pub mod emit;
pub mod error;
pub mod router;

// Re-export core types
pub use application::{configure, Application, Configurator};
pub use common::ApiResponse;
pub use config::{ConfigService, Options};
pub use context::Context;
pub use controller::{AfterActivation, BeforeActivation, Controller, Descriptor};
pub use di::{Dependencies, Dependency};
pub use emit::{ContentType, HttpError, IntoReply, Reply};
pub use error::{MvcError, Result};
pub use router::{Party, Router, Verb};

// Re-export macros
pub use mvc_binder_macro::{any, controller, delete, get, head, options, patch, post, put, trace};

pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use mvc_binder::prelude::*;
/// ```
pub mod prelude {
    pub use crate::application::{configure, Application};
    pub use crate::common::ApiResponse;
    pub use crate::config::{ConfigService, Options};
    pub use crate::context::Context;
    pub use crate::controller::{AfterActivation, BeforeActivation, Controller, Descriptor};
    pub use crate::di::{Dependencies, Dependency};
    pub use crate::emit::{ContentType, HttpError, IntoReply, Reply};
    pub use crate::error::MvcError;
    pub use crate::router::{Party, Router, Verb};
    pub use crate::{any, controller, delete, get, head, options, patch, post, put, trace};
    pub use axum::{http::StatusCode, Json};
    pub use std::sync::Arc;
}
