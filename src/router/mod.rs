//! Router capability consumed by the activator.
//!
//! Activation only needs to hand `(verb, path, handler)` tuples to something
//! and to open nested scopes. [`Party`] is that contract; [`Router`] is the
//! shipped implementation, a shared route table compiled into an
//! [`axum::Router`] once configuration is over.

mod path;
mod table;

pub use path::{join_paths, PathCursor, PathPattern};
pub use table::Router;

use crate::context::Context;
use crate::error::Result;
use axum::response::Response;
use axum::routing::MethodFilter;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use strum_macros::{Display, EnumString};

pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// A route endpoint: consumes the request context, yields the response
pub type Handler = Arc<dyn Fn(Context) -> BoxFuture + Send + Sync>;

/// HTTP verb a route answers to
///
/// `Any` matches every method not claimed by another route on the same path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
    Any,
}

impl Verb {
    pub(crate) fn method_filter(self) -> Option<MethodFilter> {
        match self {
            Verb::Get => Some(MethodFilter::GET),
            Verb::Post => Some(MethodFilter::POST),
            Verb::Put => Some(MethodFilter::PUT),
            Verb::Delete => Some(MethodFilter::DELETE),
            Verb::Patch => Some(MethodFilter::PATCH),
            Verb::Head => Some(MethodFilter::HEAD),
            Verb::Options => Some(MethodFilter::OPTIONS),
            Verb::Trace => Some(MethodFilter::TRACE),
            Verb::Any => None,
        }
    }
}

/// A registered route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub verb: Verb,
    /// Absolute path including every party prefix
    pub path: String,
    /// Name of the controller method serving the route
    pub name: String,
}

/// Router scope with a path prefix
///
/// Implementations share one route table between a party and every party
/// derived from it.
pub trait Party: Send + Sync {
    /// Prefix prepended to every path handled through this party
    fn prefix(&self) -> &str;

    /// Register `handler` for `verb` on `prefix + path`
    ///
    /// # Errors
    /// Returns an error when the path is not a valid route template.
    fn handle(&self, verb: Verb, path: &str, name: &str, handler: Handler) -> Result<Route>;

    /// Open a nested party under `prefix + relative`
    fn party(&self, relative: &str) -> Arc<dyn Party>;
}
