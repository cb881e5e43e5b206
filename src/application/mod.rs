//! Application: a dependency scope bound to a router party.
//!
//! # Example
//!
//! ```rust,ignore
//! let router = Router::new();
//!
//! let mut app = Application::new(router.party("/todos"));
//! app.add_dependencies([
//!     Dependency::value(InMemoryTodos::default())
//!         .provides(|t: &InMemoryTodos| Arc::new(t.clone()) as Arc<dyn TodoStore>),
//!     Dependency::provider(|ctx: &Context| ctx.header("x-user").map(User::named)),
//! ])?;
//! app.register(TodoController::default());
//!
//! // nested party inherits the dependencies, additions stay local
//! app.new_child(router.party("/admin"))
//!     .register(AdminController::default());
//!
//! axum::serve(listener, router.into_axum()).await?;
//! ```

use crate::config::Options;
use crate::controller::{activate, Controller, RegisteredRoute};
use crate::di::{Dependencies, Dependency};
use crate::error::Result;
use crate::router::Party;
use std::sync::Arc;

/// Configuration step applied with [`Application::configure`]
pub type Configurator = Box<dyn FnOnce(&mut Application)>;

pub struct Application {
    dependencies: Dependencies,
    router: Arc<dyn Party>,
    options: Options,
    routes: Vec<RegisteredRoute>,
}

impl Application {
    /// Create an application with an empty dependency scope
    pub fn new(router: impl Into<Arc<dyn Party>>) -> Self {
        Self {
            dependencies: Dependencies::new(),
            router: router.into(),
            options: Options::default(),
            routes: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Append dependencies to this application's scope
    ///
    /// Order matters: a later dependency of the same type shadows an earlier
    /// one. Controllers registered before the call do not see the additions.
    ///
    /// # Errors
    /// Returns [`MvcError::MalformedDependency`](crate::error::MvcError) and
    /// appends nothing if any dependency is malformed.
    pub fn add_dependencies<I>(&mut self, dependencies: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = Dependency>,
    {
        self.dependencies.add_all(dependencies)?;
        Ok(self)
    }

    /// Activate `controller` and register its routes on this application's party
    pub fn register<C: Controller>(&mut self, controller: C) -> &mut Self {
        let routes = activate(
            controller,
            &self.dependencies,
            &self.router,
            self.options.error_status,
        );
        self.routes.extend(routes);
        self
    }

    /// An application on `router` starting from a copy of this one's
    /// dependencies
    pub fn new_child(&self, router: impl Into<Arc<dyn Party>>) -> Application {
        Application {
            dependencies: self.dependencies.clone(),
            router: router.into(),
            options: self.options.clone(),
            routes: Vec::new(),
        }
    }

    /// Apply configuration steps in order
    pub fn configure<I, F>(&mut self, configurators: I) -> &mut Self
    where
        I: IntoIterator<Item = F>,
        F: FnOnce(&mut Application),
    {
        for configurator in configurators {
            configurator(self);
        }
        self
    }

    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    pub fn dependencies_mut(&mut self) -> &mut Dependencies {
        &mut self.dependencies
    }

    pub fn router(&self) -> &Arc<dyn Party> {
        &self.router
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Routes registered through this application, in registration order
    pub fn routes(&self) -> &[RegisteredRoute] {
        &self.routes
    }
}

/// Create an application on `router` and apply `configurators` to it
pub fn configure<I, F>(router: impl Into<Arc<dyn Party>>, configurators: I) -> Application
where
    I: IntoIterator<Item = F>,
    F: FnOnce(&mut Application),
{
    let mut app = Application::new(router);
    app.configure(configurators);
    app
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::controller::{AfterActivation, BeforeActivation, Descriptor};
    use crate::di::ArgSource;
    use crate::emit::HttpError;
    use crate::router::{Router, Verb};
    use axum::body::Body;
    use axum::http::{HeaderName, HeaderValue, Request, StatusCode};
    use std::sync::Mutex;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn send(router: &Router, method: &str, uri: &str, user: Option<&str>) -> (StatusCode, String) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            request = request.header("x-user", user);
        }
        let response = router
            .clone()
            .into_axum()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    struct User {
        name: String,
    }

    fn user_provider() -> Dependency {
        Dependency::provider(|ctx: &Context| {
            ctx.header("x-user").map(|name| User {
                name: name.to_string(),
            })
        })
    }

    #[derive(Clone, Default)]
    struct Basic {
        user: User,
    }

    impl Basic {
        fn get(&self) -> String {
            "ok".to_string()
        }

        fn get_by(&self, id: String) -> std::result::Result<String, HttpError> {
            if id == "0" {
                return Err(HttpError::not_found("no such item"));
            }
            Ok(format!("item {}", id))
        }

        fn get_whoami(&self) -> String {
            format!("[{}]", self.user.name)
        }

        fn get_unbindable(&self, _: Vec<u8>) -> bool {
            true
        }
    }

    impl Controller for Basic {
        fn describe(descriptor: &mut Descriptor<Self>) {
            descriptor
                .field("user", |c| &mut c.user)
                .method("get", Self::get)
                .method("get_by", Self::get_by)
                .method("get_whoami", Self::get_whoami)
                .method("get_unbindable", Self::get_unbindable);
        }
    }

    #[tokio::test]
    async fn test_basic_routes() {
        let router = Router::new();
        let mut app = Application::new(router.party("/basic"));
        app.add_dependencies([user_provider()]).unwrap();
        app.register(Basic::default());

        assert_eq!(send(&router, "GET", "/basic", None).await, (StatusCode::OK, "ok".into()));
        assert_eq!(
            send(&router, "GET", "/basic/42", None).await,
            (StatusCode::OK, "item 42".into())
        );
        let (status, body) = send(&router, "GET", "/basic/0", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, r#"{"message":"no such item","statusCode":404}"#);
    }

    #[tokio::test]
    async fn test_dynamic_field_falls_back_to_default() {
        let router = Router::new();
        let mut app = Application::new(router.clone());
        app.add_dependencies([user_provider()]).unwrap();
        app.register(Basic::default());

        assert_eq!(
            send(&router, "GET", "/whoami", Some("neo")).await,
            (StatusCode::OK, "[neo]".into())
        );
        assert_eq!(
            send(&router, "GET", "/whoami", None).await,
            (StatusCode::OK, "[]".into())
        );
    }

    #[test]
    fn test_unbindable_method_is_skipped() {
        let router = Router::new();
        let mut app = Application::new(router.clone());
        app.register(Basic::default());

        let names: Vec<&str> = app.routes().iter().map(|r| r.route.name.as_str()).collect();
        assert_eq!(names, ["get", "get_by", "get_whoami"]);
        assert_eq!(router.routes().len(), 3);
    }

    #[tokio::test]
    async fn test_path_param_beats_string_provider() {
        let router = Router::new();
        let mut app = Application::new(router.clone());
        app.add_dependencies([Dependency::provider(|_: &Context| {
            Some(String::from("from provider"))
        })])
        .unwrap();
        app.register(Basic::default());

        let get_by = app.routes().iter().find(|r| r.route.name == "get_by").unwrap();
        assert_eq!(
            get_by.arguments,
            [ArgSource::PathParam {
                name: "param1".into(),
                position: 0
            }]
        );
        assert_eq!(
            send(&router, "GET", "/7", None).await,
            (StatusCode::OK, "item 7".into())
        );
    }

    #[derive(Clone, Default)]
    struct Counter {
        user: User,
    }

    impl Counter {
        async fn get(mut self) -> String {
            if self.user.name == "a" {
                self.user = User {
                    name: "intruder".into(),
                };
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.user.name
        }
    }

    impl Controller for Counter {
        fn describe(descriptor: &mut Descriptor<Self>) {
            descriptor
                .field("user", |c| &mut c.user)
                .method("get", Self::get);
        }
    }

    #[tokio::test]
    async fn test_requests_get_independent_controllers() {
        let router = Router::new();
        let mut app = Application::new(router.clone());
        app.add_dependencies([user_provider()]).unwrap();
        app.register(Counter::default());

        let (a, b, c) = tokio::join!(
            send(&router, "GET", "/", Some("a")),
            send(&router, "GET", "/", Some("b")),
            send(&router, "GET", "/", Some("c")),
        );
        assert_eq!(a.1, "intruder");
        assert_eq!(b.1, "b");
        assert_eq!(c.1, "c");
        assert_eq!(send(&router, "GET", "/", None).await.1, "");
    }

    #[derive(Clone, Default)]
    struct Items;

    impl Items {
        fn get_by(&self, id: u32) -> String {
            format!("item {}", id)
        }

        fn remove(&self, id: u32) -> StatusCode {
            if id > 0 {
                StatusCode::NO_CONTENT
            } else {
                StatusCode::NOT_FOUND
            }
        }

        fn put_by_done(&self, id: u32) -> String {
            format!("done {}", id)
        }
    }

    impl Controller for Items {
        fn describe(descriptor: &mut Descriptor<Self>) {
            descriptor
                .method("get_by", Self::get_by)
                .handle(Verb::Delete, "/{id}", "remove", Self::remove)
                .method("put_by_done", Self::put_by_done);
        }
    }

    #[tokio::test]
    async fn test_conflicting_capture_name_is_skipped() {
        let router = Router::new();
        let mut app = Application::new(router.party("/items"));
        app.register(Items);

        let names: Vec<&str> = app.routes().iter().map(|r| r.route.name.as_str()).collect();
        assert_eq!(names, ["get_by", "put_by_done"]);

        assert_eq!(
            send(&router, "GET", "/items/3", None).await,
            (StatusCode::OK, "item 3".into())
        );
        assert_eq!(
            send(&router, "PUT", "/items/3/done", None).await,
            (StatusCode::OK, "done 3".into())
        );
        assert_eq!(
            send(&router, "DELETE", "/items/3", None).await.0,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[tokio::test]
    async fn test_required_provider_rejects_request() {
        let router = Router::new();
        let mut app = Application::new(router.clone());
        app.add_dependencies([user_provider().required()]).unwrap();
        app.register(Basic::default());

        assert_eq!(
            send(&router, "GET", "/whoami", Some("neo")).await,
            (StatusCode::OK, "[neo]".into())
        );
        let (status, body) = send(&router, "GET", "/whoami", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("is not available for this request"));
    }

    #[derive(Clone, Default)]
    struct Hooked {
        greeting: String,
        seen: Arc<Mutex<Vec<(Verb, String)>>>,
    }

    impl Hooked {
        fn get(&self) -> String {
            self.greeting.clone()
        }

        fn get_secret(&self) -> &'static str {
            "secret"
        }

        fn hello(&self, name: String) -> String {
            format!("{} {}", self.greeting, name)
        }
    }

    impl Controller for Hooked {
        fn describe(descriptor: &mut Descriptor<Self>) {
            descriptor
                .field("greeting", |c| &mut c.greeting)
                .method("get", Self::get)
                .method("get_secret", Self::get_secret);
        }

        fn before_activation(&self, activation: &mut BeforeActivation<'_, Self>) {
            assert_eq!(activation.candidates().len(), 2);
            activation.remove("get_secret");
            activation.handle(Verb::Post, "/hello/{name}", "hello", Self::hello);
            activation
                .dependencies_mut()
                .add_value(String::from("hi"))
                .unwrap();
        }

        fn after_activation(&self, activation: &AfterActivation<'_>) {
            let mut seen = self.seen.lock().unwrap();
            for registered in activation.routes() {
                seen.push((registered.route.verb, registered.route.path.clone()));
            }
            assert!(activation.route("get_secret").is_none());
            assert!(activation.dependencies().contains::<String>());
        }
    }

    #[tokio::test]
    async fn test_activation_hooks() {
        let router = Router::new();
        let mut app = Application::new(router.party("/greet"));
        let hooked = Hooked::default();
        let seen = Arc::clone(&hooked.seen);
        app.register(hooked);

        assert_eq!(
            *seen.lock().unwrap(),
            [
                (Verb::Get, "/greet".to_string()),
                (Verb::Post, "/greet/hello/{name}".to_string()),
            ]
        );
        // the controller scope does not leak into the application
        assert!(!app.dependencies().contains::<String>());

        assert_eq!(send(&router, "GET", "/greet", None).await, (StatusCode::OK, "hi".into()));
        assert_eq!(
            send(&router, "POST", "/greet/hello/trinity", None).await,
            (StatusCode::OK, "hi trinity".into())
        );
        assert_eq!(send(&router, "GET", "/greet/secret", None).await.0, StatusCode::NOT_FOUND);
    }

    #[derive(Clone, Default)]
    struct Echo {
        text: String,
    }

    impl Echo {
        fn get(&self) -> String {
            self.text.clone()
        }
    }

    impl Controller for Echo {
        fn describe(descriptor: &mut Descriptor<Self>) {
            descriptor
                .field("text", |c| &mut c.text)
                .method("get", Self::get);
        }
    }

    #[tokio::test]
    async fn test_child_scope() {
        let router = Router::new();
        let mut parent = Application::new(router.party("/parent"));
        parent.add_dependencies([Dependency::value(String::from("parent"))]).unwrap();

        let mut child = parent.new_child(router.party("/child"));
        child.add_dependencies([Dependency::value(String::from("child"))]).unwrap();
        child.register(Echo::default());
        parent.register(Echo::default());

        assert_eq!(parent.dependencies().len(), 1);
        assert_eq!(child.dependencies().len(), 2);
        assert_eq!(child.router().prefix(), "/child");
        assert_eq!(send(&router, "GET", "/child", None).await.1, "child");
        assert_eq!(send(&router, "GET", "/parent", None).await.1, "parent");
    }

    #[derive(Clone, Default)]
    struct Tagged {
        user: User,
    }

    impl Tagged {
        fn get(&self) -> Option<String> {
            (!self.user.name.is_empty()).then(|| self.user.name.clone())
        }
    }

    impl Controller for Tagged {
        fn describe(descriptor: &mut Descriptor<Self>) {
            descriptor
                .field("user", |c| &mut c.user)
                .method("get", Self::get);
        }
    }

    #[tokio::test]
    async fn test_configure_and_response_headers() {
        let router = Router::new();
        let app = configure(
            router.clone(),
            [
                Box::new(|app: &mut Application| {
                    app.add_dependencies([Dependency::provider(|ctx: &Context| {
                        let name = ctx.header("x-user")?;
                        ctx.insert_response_header(
                            HeaderName::from_static("x-served-user"),
                            HeaderValue::from_str(name).ok()?,
                        );
                        Some(User {
                            name: name.to_string(),
                        })
                    })])
                    .unwrap();
                }) as Configurator,
                Box::new(|app: &mut Application| {
                    app.register(Tagged::default());
                }),
            ],
        );
        assert_eq!(app.routes().len(), 1);

        let response = router
            .clone()
            .into_axum()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("x-user", "morpheus")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-served-user"], "morpheus");

        assert_eq!(send(&router, "GET", "/", None).await.0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_malformed_dependency_rejected() {
        let mut app = Application::new(Router::new());
        let err = app.add_dependencies([Dependency::value(1u8), Dependency::value(())]);
        assert!(err.is_err());
        assert!(app.dependencies().is_empty());
    }

    #[tokio::test]
    async fn test_default_error_status_from_options() {
        #[derive(Clone, Default)]
        struct Parsing;

        impl Parsing {
            fn get_by(&self, raw: String) -> std::result::Result<String, HttpError> {
                let n: i64 = raw.parse::<i64>().map_err(HttpError::from)?;
                Ok((n * 2).to_string())
            }
        }

        impl Controller for Parsing {
            fn describe(descriptor: &mut Descriptor<Self>) {
                descriptor.method("get_by", Self::get_by);
            }
        }

        let router = Router::new();
        let mut app = Application::new(router.clone()).with_options(Options {
            error_status: StatusCode::UNPROCESSABLE_ENTITY,
            ..Options::default()
        });
        app.register(Parsing);

        assert_eq!(send(&router, "GET", "/21", None).await, (StatusCode::OK, "42".into()));
        assert_eq!(
            send(&router, "GET", "/x", None).await.0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
