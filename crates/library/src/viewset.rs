//! Generic CRUD handlers.
//!
//! [`ModelViewSet`] implements list, create, retrieve, update, partial update
//! and destroy for any [`ModelSerializer`]. Each operation validates the body
//! against the model's field table, calls the repository, and returns the
//! model or an [`ApiError`].
//!
//! The free functions at the bottom adapt those operations to axum handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRequest, Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use library_core::{ModelSerializer, ValidationMode, validate};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::repository::RepositoryArc;

/// CRUD operations over one repository
pub struct ModelViewSet<M: ModelSerializer> {
    repository: RepositoryArc<M>,
}

impl<M: ModelSerializer> Clone for ModelViewSet<M> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<M: ModelSerializer> ModelViewSet<M> {
    pub fn new(repository: RepositoryArc<M>) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> Result<Vec<M>, ApiError> {
        let items = self.repository.list().await?;
        tracing::debug!(model = M::NAME, count = items.len(), "listed");
        Ok(items)
    }

    pub async fn create(&self, data: &Value) -> Result<M, ApiError> {
        let record = validate(M::fields(), data, ValidationMode::Create)?;
        let item = self.repository.insert(record).await?;
        tracing::info!(model = M::NAME, id = item.primary_key(), "created");
        Ok(item)
    }

    pub async fn retrieve(&self, id: &str) -> Result<M, ApiError> {
        let id = lookup::<M>(id)?;
        let item = self.repository.get(id).await?.ok_or_else(not_found::<M>)?;
        tracing::debug!(model = M::NAME, id, "retrieved");
        Ok(item)
    }

    /// Full update: required fields must be supplied
    pub async fn update(&self, id: &str, data: &Value) -> Result<M, ApiError> {
        self.write(id, data, ValidationMode::Update).await
    }

    /// Partial update: only supplied fields are checked and changed
    pub async fn partial_update(&self, id: &str, data: &Value) -> Result<M, ApiError> {
        self.write(id, data, ValidationMode::Partial).await
    }

    pub async fn destroy(&self, id: &str) -> Result<(), ApiError> {
        let id = lookup::<M>(id)?;
        if !self.repository.delete(id).await? {
            return Err(not_found::<M>());
        }
        tracing::info!(model = M::NAME, id, "deleted");
        Ok(())
    }

    async fn write(&self, id: &str, data: &Value, mode: ValidationMode) -> Result<M, ApiError> {
        let id = lookup::<M>(id)?;
        // Unknown identifiers are reported before validation errors
        if self.repository.get(id).await?.is_none() {
            return Err(not_found::<M>());
        }

        let changes = validate(M::fields(), data, mode)?;
        let item = self
            .repository
            .update(id, changes)
            .await?
            .ok_or_else(not_found::<M>)?;
        tracing::info!(model = M::NAME, id, partial = mode == ValidationMode::Partial, "updated");
        Ok(item)
    }
}

/// Identifiers that are not integers cannot match any record
fn lookup<M: ModelSerializer>(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| not_found::<M>())
}

fn not_found<M: ModelSerializer>() -> ApiError {
    ApiError::NotFound { model: M::NAME }
}

/// JSON request body.
///
/// An empty body reads as `{}`. A non-empty body must be declared as
/// `application/json` (or a `+json` type) and parse as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBody(pub Value);

impl<S: Send + Sync> FromRequest<S> for JsonBody {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = content_type(req.headers());
        let bytes = Bytes::from_request(req, state).await.map_err(body_rejection)?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(Value::Object(Map::new())));
        }

        match content_type {
            Some(ct) if is_json(&ct) => {}
            Some(ct) => return Err(ApiError::UnsupportedMediaType(ct)),
            None => return Err(ApiError::UnsupportedMediaType(String::new())),
        }

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| ApiError::MalformedBody(format!("JSON parse error - {e}")))
    }
}

/// Keep the size-limit rejection distinct from an unreadable body
fn body_rejection(rejection: BytesRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(rejection.body_text())
    } else {
        ApiError::MalformedBody(rejection.body_text())
    }
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn is_json(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

pub async fn list<M: ModelSerializer>(
    State(viewset): State<ModelViewSet<M>>,
) -> Result<Json<Vec<M>>, ApiError> {
    viewset.list().await.map(Json)
}

pub async fn create<M: ModelSerializer>(
    State(viewset): State<ModelViewSet<M>>,
    JsonBody(data): JsonBody,
) -> Result<(StatusCode, Json<M>), ApiError> {
    let item = viewset.create(&data).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn retrieve<M: ModelSerializer>(
    State(viewset): State<ModelViewSet<M>>,
    Path(id): Path<String>,
) -> Result<Json<M>, ApiError> {
    viewset.retrieve(&id).await.map(Json)
}

pub async fn update<M: ModelSerializer>(
    State(viewset): State<ModelViewSet<M>>,
    Path(id): Path<String>,
    JsonBody(data): JsonBody,
) -> Result<Json<M>, ApiError> {
    viewset.update(&id, &data).await.map(Json)
}

pub async fn partial_update<M: ModelSerializer>(
    State(viewset): State<ModelViewSet<M>>,
    Path(id): Path<String>,
    JsonBody(data): JsonBody,
) -> Result<Json<M>, ApiError> {
    viewset.partial_update(&id, &data).await.map(Json)
}

pub async fn destroy<M: ModelSerializer>(
    State(viewset): State<ModelViewSet<M>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    viewset.destroy(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
