//! Route emission: bound methods become router handlers.
//!
//! Every request clones the activated controller template, applies the
//! per-request field bindings, materializes the method arguments, invokes the
//! method and renders its [`Reply`].

mod reply;

pub use reply::{ContentType, HttpError, IntoReply, Reply};

use crate::context::Context;
use crate::controller::{Controller, DynamicField, Invoke};
use crate::error::Result;
use crate::router::{BoxFuture, Handler};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// JSON failure body shared by handler errors and binding errors
pub(crate) fn failure_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "statusCode": status.as_u16(),
            "message": message,
        })),
    )
        .into_response()
}

/// Build the router handler for one bound method
pub(crate) fn emit<C: Controller>(
    template: Arc<C>,
    fields: Arc<[DynamicField<C>]>,
    invoke: Invoke<C>,
    error_status: StatusCode,
) -> Handler {
    Arc::new(move |ctx: Context| {
        let pending = instantiate::<C>(&template, &fields, &ctx)
            .and_then(|controller| invoke(controller, &ctx));

        Box::pin(async move {
            let mut response = match pending {
                Ok(pending) => pending.await.render(error_status),
                Err(err) => {
                    if err.status().is_server_error() {
                        tracing::warn!(path = ctx.path(), "request binding failed: {}", err);
                    } else {
                        tracing::debug!(path = ctx.path(), "request rejected: {}", err);
                    }
                    err.into_response()
                }
            };
            response.headers_mut().extend(ctx.take_response_headers());
            response
        }) as BoxFuture
    })
}

/// A fresh controller for one request
fn instantiate<C: Controller>(template: &C, fields: &[DynamicField<C>], ctx: &Context) -> Result<C> {
    let mut controller = template.clone();
    for field in fields {
        field(&mut controller, ctx)?;
    }
    Ok(controller)
}
