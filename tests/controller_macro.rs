use axum::body::Body;
use axum::http::{Request, StatusCode};
use mvc_binder::controller::RegisteredRoute;
use mvc_binder::di::ArgSource;
use mvc_binder::prelude::*;
use std::sync::Mutex;
use tower::ServiceExt;

trait Greeter: Send + Sync {
    fn greet(&self, name: &str) -> String;
}

#[derive(Clone)]
struct Polite;

impl Greeter for Polite {
    fn greet(&self, name: &str) -> String {
        format!("Good day, {}", name)
    }
}

#[derive(Clone, Debug, Default)]
struct Visitor {
    name: String,
}

#[derive(Clone)]
struct Hello {
    greeter: Arc<dyn Greeter>,
    visitor: Visitor,
    seen: Arc<Mutex<Vec<RegisteredRoute>>>,
}

impl Hello {
    fn new() -> Self {
        Self {
            greeter: Arc::new(Polite),
            visitor: Visitor::default(),
            seen: Arc::default(),
        }
    }
}

#[controller(fields(greeter, visitor))]
impl Hello {
    pub fn get(&self) -> String {
        self.greeter.greet(&self.visitor.name)
    }

    pub fn get_by(&self, id: u32) -> std::result::Result<Json<serde_json::Value>, HttpError> {
        if id == 0 {
            return Err(HttpError::not_found("no visitor 0"));
        }
        Ok(Json(serde_json::json!({ "id": id, "visitor": self.visitor.name })))
    }

    pub async fn post_rename(mut self, name: String) -> (StatusCode, String) {
        self.visitor.name = name;
        (StatusCode::CREATED, self.greeter.greet(&self.visitor.name))
    }

    pub fn any_ping(&self) -> &'static str {
        "pong"
    }

    #[delete("/visitors/{id}")]
    pub fn remove_visitor(&self, id: u32) -> bool {
        id == 1
    }

    pub fn get_files_by_wildcard(&self, path: String) -> String {
        path
    }

    // not a handler: private helper with a verb-like name
    fn get_helper(&self) -> String {
        String::new()
    }

    pub fn shout(&self) -> String {
        self.get_helper().to_uppercase()
    }

    fn before_activation(&self, activation: &mut BeforeActivation<'_, Self>) {
        activation
            .dependencies_mut()
            .add_value(Visitor {
                name: "guest".into(),
            })
            .unwrap();
    }

    fn after_activation(&self, activation: &AfterActivation<'_>) {
        self.seen.lock().unwrap().extend(activation.routes().iter().cloned());
    }
}

async fn send(router: &Router, method: &str, uri: &str) -> (StatusCode, String) {
    let response = router
        .clone()
        .into_axum()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn greeter_dependency() -> Dependency {
    Dependency::value(Polite).provides(|p: &Polite| Arc::new(p.clone()) as Arc<dyn Greeter>)
}

#[test]
fn test_generated_descriptor() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let router = Router::new();
    let mut app = Application::new(router.party("/hello"));
    app.add_dependencies([greeter_dependency(), Dependency::value(String::from("neo"))])
        .unwrap();

    let hello = Hello::new();
    let seen = Arc::clone(&hello.seen);
    app.register(hello);

    let mut routes: Vec<(Verb, String, String)> = router
        .routes()
        .into_iter()
        .map(|r| (r.verb, r.path, r.name))
        .collect();
    routes.sort_by(|a, b| a.2.cmp(&b.2));
    assert_eq!(
        routes,
        [
            (Verb::Any, "/hello/ping".into(), "any_ping".into()),
            (Verb::Get, "/hello".into(), "get".into()),
            (Verb::Get, "/hello/{param1}".into(), "get_by".into()),
            (
                Verb::Get,
                "/hello/files/{*param1}".into(),
                "get_files_by_wildcard".into()
            ),
            (Verb::Post, "/hello/rename".into(), "post_rename".into()),
            (
                Verb::Delete,
                "/hello/visitors/{id}".into(),
                "remove_visitor".into()
            ),
        ]
    );

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 6);
    let rename = seen.iter().find(|r| r.route.name == "post_rename").unwrap();
    assert_eq!(rename.arguments, [ArgSource::Static]);
}

#[tokio::test]
async fn test_generated_routes_serve() {
    let router = Router::new();
    let mut app = Application::new(router.party("/hello"));
    app.add_dependencies([greeter_dependency(), Dependency::value(String::from("neo"))])
        .unwrap();
    app.register(Hello::new());

    assert_eq!(
        send(&router, "GET", "/hello").await,
        (StatusCode::OK, "Good day, guest".into())
    );
    assert_eq!(
        send(&router, "GET", "/hello/3").await,
        (StatusCode::OK, r#"{"id":3,"visitor":"guest"}"#.into())
    );
    assert_eq!(send(&router, "GET", "/hello/0").await.0, StatusCode::NOT_FOUND);
    assert_eq!(send(&router, "GET", "/hello/three").await.0, StatusCode::NOT_FOUND);
    assert_eq!(
        send(&router, "POST", "/hello/rename").await,
        (StatusCode::CREATED, "Good day, neo".into())
    );
    assert_eq!(
        send(&router, "PUT", "/hello/ping").await,
        (StatusCode::OK, "pong".into())
    );
    assert_eq!(send(&router, "DELETE", "/hello/visitors/1").await.0, StatusCode::OK);
    assert_eq!(
        send(&router, "DELETE", "/hello/visitors/2").await.0,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        send(&router, "GET", "/hello/files/a/b.txt").await,
        (StatusCode::OK, "a/b.txt".into())
    );
    // `shout` is not routed, so the segment falls through to get_by
    assert_eq!(send(&router, "GET", "/hello/shout").await.0, StatusCode::NOT_FOUND);
}
