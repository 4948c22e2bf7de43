//! The book model.

use serde::{Deserialize, Serialize};

use crate::ModelSerializer;

/// A book in the library catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ModelSerializer)]
#[serializer(name = "Book", table = "books")]
pub struct Book {
    pub id: i64,
    /// Title of the book
    #[field(max_length = 200)]
    pub title: String,
    /// Name of the author
    #[field(max_length = 100)]
    pub author: String,
    /// Year of first publication
    #[field(min = 0, max = 9999)]
    pub published_year: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use library_core::FieldKind;

    #[test]
    fn test_book_fields() {
        let fields = Book::fields();
        assert_eq!(Book::NAME, "Book");
        assert_eq!(Book::TABLE, "books");
        assert_eq!(Book::description(), Some("A book in the library catalogue."));

        let names: Vec<&str> = fields.iter().map(|f| f.name).collect();
        assert_eq!(names, ["id", "title", "author", "published_year"]);

        assert!(fields[0].primary_key);
        assert_eq!(fields[1].max_length, Some(200));
        assert_eq!(fields[2].max_length, Some(100));
        assert_eq!(fields[3].kind, FieldKind::Integer);
        assert!(fields[3].nullable && !fields[3].required);
    }
}
