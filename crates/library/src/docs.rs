//! API documentation view.
//!
//! `GET /docs/` serves a Swagger UI page; `GET /docs/?format=openapi` serves
//! the OpenAPI document it renders. Both are built once from the registered
//! resources and never cached by clients.

use std::sync::Arc;

use axum::Router;
use axum::extract::Query;
use axum::http::{HeaderValue, header};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use library_core::{Action, LOOKUP_PARAM, error_response_schema};
use library_openapi::{
    OpenApiBuilder, OpenApiError, OpenApiOperation, OpenApiParameter, OpenApiPath, OpenApiSchema,
    OpenApiTag, response, schema_ref, swagger_ui_html,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::DocsConfig;
use crate::error::ApiError;
use crate::router::{RegisteredResource, method_not_allowed, redirect_with_slash};

const ERROR_SCHEMA: &str = "ErrorResponse";

/// Build the OpenAPI document for `resources`
pub fn openapi_document(
    config: &DocsConfig,
    resources: &[RegisteredResource],
) -> Result<Value, OpenApiError> {
    let mut builder = OpenApiBuilder::new()
        .title(&config.title)
        .version(&config.version)
        .description(&config.description)
        .merge_schemas(vec![OpenApiSchema::new(ERROR_SCHEMA, error_response_schema())])?;

    for resource in resources {
        let mut tag = OpenApiTag::new(resource.prefix());
        if let Some(description) = resource.description {
            tag = tag.with_description(description);
        }

        let paths = resource
            .route_table()
            .into_iter()
            .map(|route| {
                OpenApiPath::new(&route.path, route.method.as_lowercase())
                    .with_operation(operation(resource, route.action, route.operation_id))
            })
            .collect();

        builder = builder
            .tag(tag)
            .merge_paths(paths)?
            .merge_schemas(vec![OpenApiSchema::new(
                resource.model_name,
                resource.schema.clone(),
            )])?;
    }

    Ok(builder.build())
}

fn operation(resource: &RegisteredResource, action: Action, operation_id: String) -> OpenApiOperation {
    let singular = resource.model_name.to_lowercase();
    let plural = resource.prefix().replace(['-', '_'], " ");
    let model = schema_ref(resource.model_name);
    let error = schema_ref(ERROR_SCHEMA);

    let mut op = OpenApiOperation::new(action.summary(&singular, &plural))
        .with_id(operation_id)
        .with_tag(resource.prefix());

    if action.is_detail() {
        op = op.with_parameter(
            OpenApiParameter::path(LOOKUP_PARAM)
                .with_schema(json!({"type": "integer"}))
                .with_description(format!(
                    "A unique integer value identifying this {singular}."
                )),
        );
    }

    if action.has_request_body() {
        op = op.with_json_body(model.clone());
    }

    let status = action.success_status().to_string();
    op = match action {
        Action::List => op.with_response(
            status,
            response("", Some(json!({"type": "array", "items": model}))),
        ),
        Action::Destroy => op.with_response(status, response("", None)),
        _ => op.with_response(status, response("", Some(model))),
    };

    if action.has_request_body() {
        op = op.with_response("400", response("Invalid input", Some(error.clone())));
    }
    if action.is_detail() {
        op = op.with_response("404", response("Not found", Some(error)));
    }

    op
}

#[derive(Debug, Deserialize)]
struct DocsQuery {
    format: Option<String>,
}

struct DocsState {
    document: Value,
    page: String,
}

/// Router serving the docs view at `config.path`
pub fn docs_router(
    config: &DocsConfig,
    resources: &[RegisteredResource],
    append_slash: bool,
) -> Result<Router, OpenApiError> {
    let state = Arc::new(DocsState {
        document: openapi_document(config, resources)?,
        page: swagger_ui_html(&config.title, &format!("{}?format=openapi", config.path)),
    });

    let mut router = Router::new().route(
        &config.path,
        get(move |Query(query): Query<DocsQuery>| docs_view(query, state.clone()))
            .fallback(method_not_allowed),
    );

    let bare = config.path.trim_end_matches('/');
    if append_slash && !bare.is_empty() {
        router = router.route(bare, redirect_with_slash());
    }

    Ok(router)
}

async fn docs_view(query: DocsQuery, state: Arc<DocsState>) -> Result<Response, ApiError> {
    let mut response = match query.format.as_deref() {
        None => Html(state.page.clone()).into_response(),
        Some("openapi" | "json") => Json(state.document.clone()).into_response(),
        Some(other) => {
            tracing::debug!(format = other, "unknown docs format");
            return Err(ApiError::RouteNotFound);
        }
    };

    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Book;

    fn document() -> Value {
        let resources = vec![RegisteredResource::new::<Book>("books").unwrap()];
        openapi_document(&DocsConfig::default(), &resources).unwrap()
    }

    #[test]
    fn test_info() {
        let doc = document();
        assert_eq!(doc["info"]["title"], "Library example project");
        assert_eq!(doc["info"]["version"], "v1");
        assert_eq!(doc["info"]["description"], "API for books as an example");
        assert_eq!(doc["tags"][0]["name"], "books");
    }

    #[test]
    fn test_item_operations_have_id_parameter() {
        let doc = document();
        let read = &doc["paths"]["/books/{id}/"]["get"];

        assert_eq!(read["operationId"], "books_read");
        assert_eq!(read["summary"], "Retrieve a book");
        assert_eq!(read["parameters"][0]["name"], "id");
        assert_eq!(read["parameters"][0]["in"], "path");
        assert_eq!(read["parameters"][0]["schema"]["type"], "integer");
        assert_eq!(
            read["responses"]["404"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/ErrorResponse"
        );
        assert!(read.get("requestBody").is_none());
    }

    #[test]
    fn test_write_operations() {
        let doc = document();

        let create = &doc["paths"]["/books/"]["post"];
        assert_eq!(
            create["requestBody"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/Book"
        );
        assert!(create["responses"]["201"].is_object());
        assert!(create["responses"]["400"].is_object());
        assert!(create["responses"].get("404").is_none());

        let delete = &doc["paths"]["/books/{id}/"]["delete"];
        assert_eq!(delete["responses"]["204"], json!({"description": ""}));

        let list = &doc["paths"]["/books/"]["get"];
        assert_eq!(list["responses"]["200"]["content"]["application/json"]["schema"]["type"], "array");
    }

    #[test]
    fn test_book_schema() {
        let doc = document();
        let book = &doc["components"]["schemas"]["Book"];

        assert_eq!(book["required"], json!(["title", "author"]));
        assert_eq!(book["properties"]["id"]["readOnly"], true);
        assert_eq!(book["properties"]["title"]["maxLength"], 200);
        assert_eq!(book["properties"]["published_year"]["nullable"], true);
        assert_eq!(book["properties"]["published_year"]["maximum"], 9999);
        assert!(doc["components"]["schemas"]["ErrorResponse"].is_object());
    }
}
