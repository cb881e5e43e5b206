use mvc_binder::prelude::*;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;

mod controllers;
mod store;

use controllers::{AdminController, TodoController, User};
use store::{Draft, InMemoryTodos, TodoStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = ConfigService::new();
    let options = Options::from_config(&config)?;
    tracing::info!(
        error_status = %options.error_status,
        body_limit = options.body_limit,
        "starting todo server"
    );

    let router = Router::new().with_options(&options);
    let todos = InMemoryTodos::default();
    let store: Arc<dyn TodoStore> = Arc::new(todos.clone());

    let mut app = Application::new(router.party("/todos")).with_options(options);
    app.add_dependencies([
        Dependency::value(todos)
            .provides(|t: &InMemoryTodos| Arc::new(t.clone()) as Arc<dyn TodoStore>),
        Dependency::provider(|ctx: &Context| {
            ctx.header("x-user").map(|name| User {
                name: name.to_string(),
            })
        }),
        Dependency::provider(|ctx: &Context| ctx.body_json::<Draft>().ok()),
    ])?;
    app.register(TodoController::new(Arc::clone(&store)));

    let mut admin = app.new_child(router.party("/admin"));
    admin.add_dependencies([Dependency::value(
        config.get("ADMIN_BANNER").unwrap_or_else(|| "todo admin".to_string()),
    )])?;
    admin.register(AdminController::new(store));

    let service = router.into_axum().layer(TraceLayer::new_for_http());

    let host = config.get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
    let port = config.get("PORT").unwrap_or_else(|| "3000".to_string());
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => tracing::error!("failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
