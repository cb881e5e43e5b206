use super::path::capture_conflict;
use super::{join_paths, Handler, Party, PathPattern, Route, Verb};
use crate::config::{Options, DEFAULT_BODY_LIMIT};
use crate::context::Context;
use crate::error::{MvcError, Result};
use axum::extract::rejection::RawPathParamsRejection;
use axum::extract::{RawPathParams, Request};
use axum::response::IntoResponse;
use axum::routing::MethodRouter;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone)]
struct Entry {
    route: Route,
    handler: Handler,
}

/// Route table shared by a root party and all parties opened from it
///
/// # Example
/// ```rust,ignore
/// let router = Router::new();
/// let mut app = Application::new(router.party("/users"));
/// app.register(UserController::default());
///
/// let service: axum::Router = router.into_axum();
/// ```
#[derive(Clone)]
pub struct Router {
    prefix: String,
    table: Arc<Mutex<Vec<Entry>>>,
    body_limit: usize,
}

impl Router {
    pub fn new() -> Self {
        Self {
            prefix: String::new(),
            table: Arc::new(Mutex::new(Vec::new())),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_options(mut self, options: &Options) -> Self {
        self.body_limit = options.body_limit;
        self
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    /// Every route registered so far, in registration order
    pub fn routes(&self) -> Vec<Route> {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|entry| entry.route.clone())
            .collect()
    }

    /// Compile the table into an axum router
    ///
    /// Routes sharing a path become one method router; `Verb::Any` serves as
    /// that path's fallback for methods no other route claims.
    pub fn into_axum(self) -> axum::Router {
        let entries = self
            .table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut by_path: BTreeMap<String, Vec<Entry>> = BTreeMap::new();
        for entry in entries {
            by_path
                .entry(entry.route.path.clone())
                .or_default()
                .push(entry);
        }

        let mut router = axum::Router::new();
        for (path, entries) in by_path {
            let mut method_router: MethodRouter = MethodRouter::new();
            for entry in entries {
                let handler = entry.handler;
                let body_limit = self.body_limit;
                let endpoint = move |params: std::result::Result<
                    RawPathParams,
                    RawPathParamsRejection,
                >,
                                     request: Request| {
                    let handler = handler.clone();
                    async move {
                        let params: Vec<(String, String)> = match params {
                            Ok(params) => params
                                .iter()
                                .map(|(key, value)| (key.to_string(), value.to_string()))
                                .collect(),
                            Err(_) => Vec::new(),
                        };
                        match Context::from_request(request, params, body_limit).await {
                            Ok(ctx) => handler(ctx).await,
                            Err(err) => err.into_response(),
                        }
                    }
                };

                method_router = match entry.route.verb.method_filter() {
                    Some(filter) => method_router.on(filter, endpoint),
                    None => method_router.fallback(endpoint),
                };
            }
            tracing::debug!(path = %path, "mounting route");
            router = router.route(&path, method_router);
        }
        router
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Router> for Arc<dyn Party> {
    fn from(router: Router) -> Self {
        Arc::new(router)
    }
}

impl Party for Router {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn handle(&self, verb: Verb, path: &str, name: &str, handler: Handler) -> Result<Route> {
        let full_path = join_paths(&self.prefix, path);
        PathPattern::parse(&full_path)?;

        let route = Route {
            verb,
            path: full_path,
            name: name.to_string(),
        };

        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(reason) = table
            .iter()
            .find_map(|entry| capture_conflict(&entry.route.path, &route.path))
        {
            return Err(MvcError::InvalidRoute {
                path: route.path,
                reason,
            });
        }

        match table
            .iter_mut()
            .find(|entry| entry.route.verb == verb && entry.route.path == route.path)
        {
            Some(existing) => {
                tracing::warn!(
                    "{} {} registered twice; '{}' replaces '{}'",
                    verb,
                    route.path,
                    route.name,
                    existing.route.name
                );
                *existing = Entry {
                    route: route.clone(),
                    handler,
                };
            }
            None => table.push(Entry {
                route: route.clone(),
                handler,
            }),
        }
        Ok(route)
    }

    fn party(&self, relative: &str) -> Arc<dyn Party> {
        Arc::new(Router {
            prefix: join_paths(&self.prefix, relative),
            table: Arc::clone(&self.table),
            body_limit: self.body_limit,
        })
    }
}
