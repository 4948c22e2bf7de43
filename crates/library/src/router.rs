//! Resource router.
//!
//! [`DefaultRouter`] turns a prefix such as `books` into the collection and
//! detail routes of a [`ModelViewSet`], plus an API root at `/` listing every
//! registered prefix.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::OriginalUri;
use axum::http::{HeaderMap, Method, header};
use axum::response::Redirect;
use axum::routing::{MethodRouter, any, get};
use library_core::{ModelSerializer, ResourceRoutes, Route, RouteError, model_schema};
use serde_json::Value;

use crate::error::ApiError;
use crate::viewset::{self, ModelViewSet};

/// A resource as seen by the docs view
#[derive(Debug, Clone)]
pub struct RegisteredResource {
    pub routes: ResourceRoutes,
    /// Singular model name ("Book")
    pub model_name: &'static str,
    pub description: Option<&'static str>,
    /// JSON Schema generated from the model's fields
    pub schema: Value,
}

impl RegisteredResource {
    pub fn new<M: ModelSerializer>(prefix: &str) -> Result<Self, RouteError> {
        Ok(Self {
            routes: ResourceRoutes::new(prefix)?,
            model_name: M::NAME,
            description: M::description(),
            schema: model_schema(M::NAME, M::description(), M::fields()),
        })
    }

    pub fn prefix(&self) -> &str {
        self.routes.prefix()
    }

    /// Verb/path/action entries of this resource
    pub fn route_table(&self) -> Vec<Route> {
        self.routes.routes()
    }
}

/// Registers resources and builds the axum router.
pub struct DefaultRouter {
    append_slash: bool,
    resources: Vec<RegisteredResource>,
    router: Router,
}

impl Default for DefaultRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultRouter {
    pub fn new() -> Self {
        Self {
            append_slash: true,
            resources: Vec::new(),
            router: Router::new(),
        }
    }

    /// Redirect `/books` to `/books/` (308). Enabled by default.
    pub fn append_slash(mut self, enabled: bool) -> Self {
        self.append_slash = enabled;
        self
    }

    /// Mount the six routes of `viewset` under `/{prefix}/`
    pub fn register<M: ModelSerializer>(
        mut self,
        prefix: &str,
        viewset: ModelViewSet<M>,
    ) -> Result<Self, RouteError> {
        let resource = RegisteredResource::new::<M>(prefix)?;
        if self.resources.iter().any(|r| r.prefix() == prefix) {
            return Err(RouteError::DuplicatePrefix {
                prefix: prefix.to_string(),
            });
        }

        let routes = &resource.routes;
        let mounted = Router::new()
            .route(
                &routes.collection_path(),
                get(viewset::list::<M>)
                    .post(viewset::create::<M>)
                    .fallback(method_not_allowed),
            )
            .route(
                &routes.detail_path(),
                get(viewset::retrieve::<M>)
                    .put(viewset::update::<M>)
                    .patch(viewset::partial_update::<M>)
                    .delete(viewset::destroy::<M>)
                    .fallback(method_not_allowed),
            )
            .with_state(viewset);

        tracing::debug!(prefix, model = M::NAME, "registered resource");
        self.router = self.router.merge(mounted);
        self.resources.push(resource);
        Ok(self)
    }

    pub fn resources(&self) -> &[RegisteredResource] {
        &self.resources
    }

    /// Finish the router: resource routes, API root and slash redirects
    pub fn into_router(self) -> Router {
        let prefixes: Arc<Vec<String>> = Arc::new(
            self.resources
                .iter()
                .map(|r| r.prefix().to_string())
                .collect(),
        );

        let mut router = self.router.route(
            "/",
            get(move |headers: HeaderMap| api_root(headers, prefixes.clone()))
                .fallback(method_not_allowed),
        );

        if self.append_slash {
            for resource in &self.resources {
                let routes = &resource.routes;
                for path in [routes.collection_path(), routes.detail_path()] {
                    router = router.route(path.trim_end_matches('/'), redirect_with_slash());
                }
            }
        }

        router
    }
}

async fn api_root(headers: HeaderMap, prefixes: Arc<Vec<String>>) -> Json<BTreeMap<String, String>> {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");

    Json(
        prefixes
            .iter()
            .map(|prefix| (prefix.clone(), format!("http://{host}/{prefix}/")))
            .collect(),
    )
}

/// Permanent redirect to the same path with a trailing slash, query kept
pub(crate) fn redirect_with_slash() -> MethodRouter {
    any(|OriginalUri(uri): OriginalUri| async move {
        let target = match uri.query() {
            Some(query) => format!("{}/?{query}", uri.path()),
            None => format!("{}/", uri.path()),
        };
        Redirect::permanent(&target)
    })
}

pub(crate) async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method.to_string())
}

pub(crate) async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Book, MemoryRepository};

    fn viewset() -> ModelViewSet<Book> {
        ModelViewSet::new(Arc::new(MemoryRepository::<Book>::new()))
    }

    #[test]
    fn test_duplicate_prefix_rejected() {
        let result = DefaultRouter::new()
            .register("books", viewset())
            .unwrap()
            .register("books", viewset());

        assert!(matches!(
            result.err(),
            Some(RouteError::DuplicatePrefix { prefix }) if prefix == "books"
        ));
    }

    #[test]
    fn test_invalid_prefix_rejected() {
        for prefix in ["", "/", "books/", "my books", "{id}", "bo?ks"] {
            assert!(
                DefaultRouter::new().register(prefix, viewset()).is_err(),
                "{prefix:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_resources_expose_route_table() {
        let router = DefaultRouter::new().register("books", viewset()).unwrap();
        let resource = &router.resources()[0];

        assert_eq!(resource.model_name, "Book");
        assert_eq!(resource.route_table().len(), 6);
        assert_eq!(resource.schema["title"], "Book");
    }
}
