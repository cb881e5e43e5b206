//! Request context handed to dynamic providers.
//!
//! A [`Context`] owns a snapshot of one request: its method, URI, headers,
//! extensions, matched path parameters and the fully read body. Providers get
//! it by reference; anything they write into the response-header sink is
//! merged into the final response.

use crate::error::{MvcError, Result};
use axum::body::{Body, Bytes};
use axum::http::{Extensions, HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};
use serde::de::DeserializeOwned;
use std::sync::{Mutex, PoisonError};

#[derive(Debug)]
pub struct Context {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    extensions: Extensions,
    params: Vec<(String, String)>,
    body: Bytes,
    response_headers: Mutex<HeaderMap>,
}

impl Context {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            extensions: Extensions::new(),
            params: Vec::new(),
            body: Bytes::new(),
            response_headers: Mutex::new(HeaderMap::new()),
        }
    }

    /// Read a request into a context, buffering at most `body_limit` bytes
    pub async fn from_request(
        request: Request<Body>,
        params: Vec<(String, String)>,
        body_limit: usize,
    ) -> Result<Self> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, body_limit)
            .await
            .map_err(|e| MvcError::Body(e.to_string()))?;

        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            extensions: parts.extensions,
            params,
            body,
            response_headers: Mutex::new(HeaderMap::new()),
        })
    }

    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Raw query string, without the leading `?`
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as text; `None` when absent or not visible ASCII
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    /// Path parameter by name, as matched by the router
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn body_json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| MvcError::Body(e.to_string()))
    }

    /// Queue a header for the response produced by this request
    pub fn insert_response_header(&self, name: HeaderName, value: HeaderValue) {
        self.response_headers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, value);
    }

    pub(crate) fn take_response_headers(&self) -> HeaderMap {
        std::mem::take(
            &mut *self
                .response_headers
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_params_by_name() {
        let ctx = Context::new(Method::GET, Uri::from_static("/users/7/posts/9"))
            .with_params([("user", "7"), ("post", "9")]);

        assert_eq!(ctx.param("user"), Some("7"));
        assert_eq!(ctx.param("post"), Some("9"));
        assert_eq!(ctx.param("missing"), None);
        assert_eq!(ctx.path(), "/users/7/posts/9");
    }

    #[test]
    fn test_body_json() {
        #[derive(Deserialize)]
        struct Login {
            name: String,
        }

        let ctx = Context::new(Method::POST, Uri::from_static("/login"))
            .with_body(r#"{"name":"neo"}"#);
        let login: Login = ctx.body_json().unwrap();
        assert_eq!(login.name, "neo");

        let bad = Context::new(Method::POST, Uri::from_static("/login")).with_body("{");
        assert!(matches!(bad.body_json::<Login>(), Err(MvcError::Body(_))));
    }

    #[test]
    fn test_response_headers_are_drained() {
        let ctx = Context::new(Method::GET, Uri::from_static("/"));
        ctx.insert_response_header(
            HeaderName::from_static("x-request-user"),
            HeaderValue::from_static("neo"),
        );

        let headers = ctx.take_response_headers();
        assert_eq!(headers.get("x-request-user").unwrap(), "neo");
        assert!(ctx.take_response_headers().is_empty());
    }

    #[tokio::test]
    async fn test_from_request_respects_limit() {
        let request = Request::builder()
            .uri("/upload")
            .body(Body::from("0123456789"))
            .unwrap();
        let err = Context::from_request(request, Vec::new(), 4).await.unwrap_err();
        assert!(matches!(err, MvcError::Body(_)));

        let request = Request::builder()
            .uri("/upload?x=1")
            .header("x-token", "abc")
            .body(Body::from("0123"))
            .unwrap();
        let ctx = Context::from_request(request, vec![("id".into(), "1".into())], 4)
            .await
            .unwrap();
        assert_eq!(ctx.body().as_ref(), b"0123");
        assert_eq!(ctx.header("x-token"), Some("abc"));
        assert_eq!(ctx.query(), Some("x=1"));
        assert_eq!(ctx.param("id"), Some("1"));
    }
}
