//! Verb and path conventions for a registered resource.
//!
//! A resource prefix such as `books` expands into two paths:
//! - `/books/` (collection): `GET` list, `POST` create
//! - `/books/{id}/` (detail): `GET` retrieve, `PUT` update, `PATCH` partial update, `DELETE` destroy

use thiserror::Error;

/// Name of the path parameter identifying a single record
pub const LOOKUP_PARAM: &str = "id";

/// HTTP verbs used by resource routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Lowercase form, as used for OpenAPI path item keys
    pub fn as_lowercase(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }
}

/// The six operations of a resource handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Create,
    Retrieve,
    Update,
    PartialUpdate,
    Destroy,
}

impl Action {
    /// All actions in routing order
    pub const ALL: [Action; 6] = [
        Action::List,
        Action::Create,
        Action::Retrieve,
        Action::Update,
        Action::PartialUpdate,
        Action::Destroy,
    ];

    pub fn method(&self) -> HttpMethod {
        match self {
            Action::List | Action::Retrieve => HttpMethod::Get,
            Action::Create => HttpMethod::Post,
            Action::Update => HttpMethod::Put,
            Action::PartialUpdate => HttpMethod::Patch,
            Action::Destroy => HttpMethod::Delete,
        }
    }

    /// Whether the action addresses a single record (`/{id}/`)
    pub fn is_detail(&self) -> bool {
        !matches!(self, Action::List | Action::Create)
    }

    /// Whether the action validates a request body
    pub fn has_request_body(&self) -> bool {
        matches!(
            self,
            Action::Create | Action::Update | Action::PartialUpdate
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Create => "create",
            Action::Retrieve => "retrieve",
            Action::Update => "update",
            Action::PartialUpdate => "partial_update",
            Action::Destroy => "destroy",
        }
    }

    /// Suffix used in operation ids (`books_read`, `books_delete`)
    pub fn operation_suffix(&self) -> &'static str {
        match self {
            Action::Retrieve => "read",
            Action::Destroy => "delete",
            other => other.name(),
        }
    }

    /// Status returned on success
    pub fn success_status(&self) -> u16 {
        match self {
            Action::Create => 201,
            Action::Destroy => 204,
            _ => 200,
        }
    }

    /// One-line summary for documentation
    pub fn summary(&self, singular: &str, plural: &str) -> String {
        match self {
            Action::List => format!("List all {plural}"),
            Action::Create => format!("Create a {singular}"),
            Action::Retrieve => format!("Retrieve a {singular}"),
            Action::Update => format!("Replace a {singular}"),
            Action::PartialUpdate => format!("Partially update a {singular}"),
            Action::Destroy => format!("Delete a {singular}"),
        }
    }
}

/// One verb/path pair bound to an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: HttpMethod,
    pub path: String,
    pub action: Action,
    pub operation_id: String,
}

/// Errors raised while registering a resource prefix
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("resource prefix must not be empty")]
    EmptyPrefix,

    #[error("resource prefix '{prefix}' contains invalid character '{ch}'; use letters, digits, '-' or '_'")]
    InvalidCharacter { prefix: String, ch: char },

    #[error("resource prefix '{prefix}' is already registered")]
    DuplicatePrefix { prefix: String },
}

/// Route table for one resource prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRoutes {
    prefix: String,
}

impl ResourceRoutes {
    /// Validate a prefix such as `books`
    pub fn new(prefix: impl Into<String>) -> Result<Self, RouteError> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        Ok(Self { prefix })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `/books/`
    pub fn collection_path(&self) -> String {
        format!("/{}/", self.prefix)
    }

    /// `/books/{id}/`
    pub fn detail_path(&self) -> String {
        format!("/{}/{{{LOOKUP_PARAM}}}/", self.prefix)
    }

    pub fn path_for(&self, action: Action) -> String {
        if action.is_detail() {
            self.detail_path()
        } else {
            self.collection_path()
        }
    }

    /// `books_list`, `books_partial_update`, ...
    pub fn operation_id(&self, action: Action) -> String {
        format!(
            "{}_{}",
            self.prefix.replace('-', "_"),
            action.operation_suffix()
        )
    }

    /// Every route of the resource, in [`Action::ALL`] order
    pub fn routes(&self) -> Vec<Route> {
        Action::ALL
            .iter()
            .map(|&action| Route {
                method: action.method(),
                path: self.path_for(action),
                action,
                operation_id: self.operation_id(action),
            })
            .collect()
    }

}

fn validate_prefix(prefix: &str) -> Result<(), RouteError> {
    if prefix.is_empty() {
        return Err(RouteError::EmptyPrefix);
    }

    if let Some(ch) = prefix
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(RouteError::InvalidCharacter {
            prefix: prefix.to_string(),
            ch,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_methods() {
        assert_eq!(Action::List.method(), HttpMethod::Get);
        assert_eq!(Action::Create.method(), HttpMethod::Post);
        assert_eq!(Action::Retrieve.method(), HttpMethod::Get);
        assert_eq!(Action::Update.method(), HttpMethod::Put);
        assert_eq!(Action::PartialUpdate.method(), HttpMethod::Patch);
        assert_eq!(Action::Destroy.method(), HttpMethod::Delete);
    }

    #[test]
    fn test_success_statuses() {
        assert_eq!(Action::Create.success_status(), 201);
        assert_eq!(Action::Destroy.success_status(), 204);
        assert_eq!(Action::PartialUpdate.success_status(), 200);
    }

    #[test]
    fn test_paths() {
        let routes = ResourceRoutes::new("books").unwrap();
        assert_eq!(routes.collection_path(), "/books/");
        assert_eq!(routes.detail_path(), "/books/{id}/");
        assert_eq!(routes.path_for(Action::Create), "/books/");
        assert_eq!(routes.path_for(Action::Destroy), "/books/{id}/");
    }

    #[test]
    fn test_operation_ids() {
        let routes = ResourceRoutes::new("books").unwrap();
        let ids: Vec<String> = routes.routes().into_iter().map(|r| r.operation_id).collect();
        assert_eq!(
            ids,
            vec![
                "books_list",
                "books_create",
                "books_read",
                "books_update",
                "books_partial_update",
                "books_delete",
            ]
        );

        let dashed = ResourceRoutes::new("rare-books").unwrap();
        assert_eq!(dashed.operation_id(Action::List), "rare_books_list");
    }

    #[test]
    fn test_prefix_validation() {
        assert_eq!(ResourceRoutes::new(""), Err(RouteError::EmptyPrefix));
        assert!(matches!(
            ResourceRoutes::new("/books"),
            Err(RouteError::InvalidCharacter { ch: '/', .. })
        ));
        assert!(matches!(
            ResourceRoutes::new("my books"),
            Err(RouteError::InvalidCharacter { ch: ' ', .. })
        ));
        assert!(matches!(
            ResourceRoutes::new("{id}"),
            Err(RouteError::InvalidCharacter { ch: '{', .. })
        ));
        assert!(ResourceRoutes::new("rare_books-2").is_ok());
    }

    #[test]
    fn test_route_table() {
        let routes = ResourceRoutes::new("books").unwrap().routes();
        let table: Vec<(&str, &str)> = routes
            .iter()
            .map(|route| (route.method.as_lowercase(), route.path.as_str()))
            .collect();
        assert_eq!(
            table,
            vec![
                ("get", "/books/"),
                ("post", "/books/"),
                ("get", "/books/{id}/"),
                ("put", "/books/{id}/"),
                ("patch", "/books/{id}/"),
                ("delete", "/books/{id}/"),
            ]
        );
    }
}
