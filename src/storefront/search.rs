//! In-memory catalog search.
//!
//! Filters run in a fixed order (author, genre, price, text) and the result is
//! stably sorted by price. Text criteria that are blank are skipped; the price
//! range is always applied, so "everything" means the widest bounds.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use crate::models::Book;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookSort {
    #[default]
    #[serde(alias = "asc")]
    LeastExpensiveFirst,
    #[serde(alias = "desc")]
    MostExpensiveFirst,
}

/// User-entered filter and sort parameters, as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    /// Matched against title or description
    pub text: String,
    pub author: String,
    /// Comma-separated genre fragments
    pub genres: String,
    pub min_price: i64,
    pub max_price: i64,
    pub sort: BookSort,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            text: String::new(),
            author: String::new(),
            genres: String::new(),
            min_price: i64::MIN,
            max_price: i64::MAX,
            sort: BookSort::default(),
        }
    }
}

impl SearchCriteria {
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_genres(mut self, genres: impl Into<String>) -> Self {
        self.genres = genres.into();
        self
    }

    pub fn with_price_range(mut self, min_price: i64, max_price: i64) -> Self {
        self.min_price = min_price;
        self.max_price = max_price;
        self
    }

    pub fn with_sort(mut self, sort: BookSort) -> Self {
        self.sort = sort;
        self
    }
}

/// Criteria after trimming and lowercasing.
struct Normalized {
    text: String,
    author: String,
    genres: Vec<String>,
}

impl Normalized {
    fn new(criteria: &SearchCriteria) -> Self {
        Self {
            text: criteria.text.trim().to_lowercase(),
            author: criteria.author.trim().to_lowercase(),
            genres: criteria
                .genres
                .split(',')
                .map(|g| g.trim().to_lowercase())
                .filter(|g| !g.is_empty())
                .collect(),
        }
    }
}

fn contains_ignore_case(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

fn matches_any_genre(book: &Book, tokens: &[String]) -> bool {
    tokens.iter().any(|token| {
        book.genre
            .iter()
            .any(|tag| contains_ignore_case(tag.trim(), token))
    })
}

/// Filter and sort `catalog` by `criteria`, returning a new list.
pub fn search(catalog: &[Book], criteria: &SearchCriteria) -> Vec<Book> {
    let wanted = Normalized::new(criteria);
    let prices = criteria.min_price..=criteria.max_price;

    let mut results: Vec<Book> = catalog
        .iter()
        .filter(|b| wanted.author.is_empty() || contains_ignore_case(&b.author, &wanted.author))
        .filter(|b| wanted.genres.is_empty() || matches_any_genre(b, &wanted.genres))
        .filter(|b| prices.contains(&b.price))
        .filter(|b| {
            wanted.text.is_empty()
                || contains_ignore_case(&b.title, &wanted.text)
                || contains_ignore_case(&b.description, &wanted.text)
        })
        .cloned()
        .collect();

    // sort_by_key is stable, so equal prices keep catalog order either way
    match criteria.sort {
        BookSort::LeastExpensiveFirst => results.sort_by_key(|b| b.price),
        BookSort::MostExpensiveFirst => results.sort_by_key(|b| Reverse(b.price)),
    }

    results
}

/// Lowest and highest price in a catalog, for defaulting a price slider.
pub fn price_bounds(catalog: &[Book]) -> Option<(i64, i64)> {
    let min = catalog.iter().map(|b| b.price).min()?;
    let max = catalog.iter().map(|b| b.price).max()?;
    Some((min, max))
}
