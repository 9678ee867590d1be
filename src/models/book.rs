use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub author: String,
    pub description: String,
    pub cover_image: String,
    pub publication_year: String,
    pub genres: String, // comma-joined tags
    pub price: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Catalog item as served by `/api/books` and persisted by the storefront.
///
/// Records are value objects: the cart compares them field by field, so two
/// books with identical fields are the same cart entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub genre: Vec<String>,
    #[serde(default, deserialize_with = "lenient::year")]
    pub publication_year: String,
    #[serde(default, deserialize_with = "lenient::price")]
    pub price: i64,
}

impl From<Model> for Book {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            author: model.author,
            description: model.description,
            cover_image: model.cover_image,
            genre: split_genres(&model.genres),
            publication_year: model.publication_year,
            price: model.price,
        }
    }
}

/// Splits the stored comma-joined genre column into trimmed, non-empty tags.
pub fn split_genres(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tolerant decoders for fields whose type drifted between catalog versions.
mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Numeric {
        Int(i64),
        Float(f64),
        Text(String),
    }

    /// Publication year is kept as text; numbers are rendered as written.
    pub fn year<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Option::<Numeric>::deserialize(deserializer)? {
            None => String::new(),
            Some(Numeric::Int(n)) => n.to_string(),
            Some(Numeric::Float(f)) if f.is_finite() && f.fract() == 0.0 => (f as i64).to_string(),
            Some(Numeric::Float(f)) => f.to_string(),
            Some(Numeric::Text(s)) => s,
        })
    }

    pub fn price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match Option::<Numeric>::deserialize(deserializer)? {
            None => Ok(0),
            Some(Numeric::Int(n)) => Ok(n),
            Some(Numeric::Float(f)) => finite(f).map_err(D::Error::custom),
            Some(Numeric::Text(s)) => {
                let s = s.trim();
                if let Ok(n) = s.parse::<i64>() {
                    return Ok(n);
                }
                s.parse::<f64>()
                    .map_err(|_| format!("price `{}` is not a number", s))
                    .and_then(finite)
                    .map_err(D::Error::custom)
            }
        }
    }

    fn finite(f: f64) -> Result<i64, String> {
        if f.is_finite() {
            Ok(f.trunc() as i64)
        } else {
            Err(format!("price is not a finite number: {}", f))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let book: Book = serde_json::from_value(json!({
            "id": 7,
            "title": "Dune",
            "author": "Frank Herbert",
            "description": "Spice.",
            "cover_image": "https://covers.example/dune.jpg",
            "genre": ["Science Fiction"],
            "publication_year": "1965",
            "price": 40,
            "isbn": "9780441013593"
        }))
        .unwrap();

        assert_eq!(book.id, 7);
        assert_eq!(book.genre, vec!["Science Fiction"]);
        assert_eq!(book.price, 40);
    }

    #[test]
    fn test_numeric_publication_year_becomes_text() {
        let book: Book = serde_json::from_value(json!({
            "id": 1, "title": "Emma", "author": "Jane Austen", "publication_year": 1815
        }))
        .unwrap();
        assert_eq!(book.publication_year, "1815");
    }

    #[test]
    fn test_lenient_price_forms() {
        let from_float: Book = serde_json::from_value(
            json!({ "id": 1, "title": "A", "author": "B", "price": 19.99 }),
        )
        .unwrap();
        assert_eq!(from_float.price, 19);

        let from_text: Book = serde_json::from_value(
            json!({ "id": 1, "title": "A", "author": "B", "price": " 35 " }),
        )
        .unwrap();
        assert_eq!(from_text.price, 35);

        let missing: Book =
            serde_json::from_value(json!({ "id": 1, "title": "A", "author": "B" })).unwrap();
        assert_eq!(missing.price, 0);
        assert!(missing.genre.is_empty());
    }

    #[test]
    fn test_non_numeric_price_is_rejected() {
        let result: Result<Book, _> = serde_json::from_value(
            json!({ "id": 1, "title": "A", "author": "B", "price": "cheap" }),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_model_genres_are_split_into_tags() {
        let model = Model {
            id: 3,
            title: "Neuromancer".to_string(),
            author: "William Gibson".to_string(),
            description: String::new(),
            cover_image: String::new(),
            publication_year: "1984".to_string(),
            genres: "Cyberpunk, Science Fiction,,".to_string(),
            price: 28,
        };

        let book = Book::from(model);
        assert_eq!(book.genre, vec!["Cyberpunk", "Science Fiction"]);
    }

    #[test]
    fn test_serialized_keys_are_snake_case() {
        let book = Book {
            id: 1,
            title: "Emma".to_string(),
            author: "Jane Austen".to_string(),
            description: String::new(),
            cover_image: "emma.jpg".to_string(),
            genre: vec!["Romance".to_string()],
            publication_year: "1815".to_string(),
            price: 20,
        };
        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(value["cover_image"], "emma.jpg");
        assert_eq!(value["publication_year"], "1815");
        assert_eq!(value["genre"][0], "Romance");
    }
}
