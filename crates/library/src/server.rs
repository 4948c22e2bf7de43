//! Application assembly and the HTTP server loop.

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Config, ConfigError};
use crate::docs::docs_router;
use crate::error::Error;
use crate::model::Book;
use crate::repository::{self, RepositoryArc};
use crate::router::{DefaultRouter, RegisteredResource, not_found};
use crate::viewset::ModelViewSet;

/// Prefix under which books are served
pub const BOOKS_PREFIX: &str = "books";

/// Resources served by the application, for documentation
pub fn resources() -> Result<Vec<RegisteredResource>, Error> {
    Ok(vec![RegisteredResource::new::<Book>(BOOKS_PREFIX)?])
}

/// Build the full application over an existing repository
pub fn app_router(config: &Config, repository: RepositoryArc<Book>) -> Result<Router, Error> {
    let append_slash = config.server.append_slash;
    let router = DefaultRouter::new()
        .append_slash(append_slash)
        .register(BOOKS_PREFIX, ModelViewSet::new(repository))?;

    let mut app = if config.docs.enabled {
        let docs_path = config.docs.path.as_str();
        let collides = router.resources().iter().any(|resource| {
            let routes = &resource.routes;
            [routes.collection_path(), routes.detail_path()]
                .iter()
                .any(|path| path == docs_path || path.starts_with(docs_path))
        });
        if collides {
            return Err(ConfigError::invalid(
                "docs.path",
                format!("{docs_path:?} overlaps a resource route"),
            )
            .into());
        }

        let docs = docs_router(&config.docs, router.resources(), append_slash)?;
        router.into_router().merge(docs)
    } else {
        router.into_router()
    };

    app = app.fallback(not_found).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id()),
    );

    Ok(app)
}

/// Connect the configured storage and build the application
pub async fn build_app(config: &Config) -> Result<Router, Error> {
    let repository = repository::connect::<Book>(&config.database).await?;
    app_router(config, repository)
}

/// Serve until Ctrl-C or SIGTERM, letting in-flight requests finish
pub async fn serve(config: Config) -> Result<(), Error> {
    let app = build_app(&config).await?;

    let address = config.server.address();
    let listener = TcpListener::bind(&address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening");
    if config.docs.enabled {
        tracing::info!(path = %config.docs.path, "API docs enabled");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received, draining connections");
}
