//! Persisted shopping cart.
//!
//! The cart is a set of books compared by value. Every mutation is written
//! through to storage before it returns; if the write fails the in-memory
//! change is undone so both sides always agree.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use super::storage::{KeyValueStore, StorageError, read_json, write_json};
use crate::models::Book;

/// Storage key holding the serialized cart
pub const CART_KEY: &str = "currentCart";

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("failed to persist cart: {0}")]
    Storage(#[from] StorageError),
    #[error("cart is empty")]
    Empty,
    #[error("cart total does not fit in a price")]
    TotalOverflow,
}

/// Summary of a completed checkout
#[derive(Debug, Clone)]
pub struct Receipt {
    pub id: Uuid,
    pub items: Vec<Book>,
    pub total: i64,
    pub purchased_at: DateTime<Utc>,
}

pub struct CartStore {
    storage: Arc<dyn KeyValueStore>,
    // Insertion order is kept for display; membership is by value.
    items: Mutex<Vec<Book>>,
}

impl CartStore {
    /// Load the persisted cart. Missing or unreadable state starts empty.
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let mut items: Vec<Book> = Vec::new();
        for book in read_json::<Vec<Book>>(storage.as_ref(), CART_KEY).unwrap_or_default() {
            if !items.contains(&book) {
                items.push(book);
            }
        }
        tracing::debug!("Cart opened with {} items", items.len());

        Self {
            storage,
            items: Mutex::new(items),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Book>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, items: &[Book]) -> Result<(), StorageError> {
        write_json(self.storage.as_ref(), CART_KEY, items)
    }

    pub fn list(&self) -> Vec<Book> {
        self.lock().clone()
    }

    pub fn contains(&self, book: &Book) -> bool {
        self.lock().contains(book)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn total_price(&self) -> Result<i64, CartError> {
        sum_prices(&self.lock())
    }

    /// Add a book. Returns `false` when an equal book was already present.
    pub fn add(&self, book: Book) -> Result<bool, CartError> {
        let mut items = self.lock();
        if items.contains(&book) {
            return Ok(false);
        }

        items.push(book);
        if let Err(e) = self.persist(&items) {
            items.pop();
            return Err(e.into());
        }
        Ok(true)
    }

    /// Remove a book. Returns `false` when it was not in the cart.
    pub fn remove(&self, book: &Book) -> Result<bool, CartError> {
        let mut items = self.lock();
        let Some(pos) = items.iter().position(|b| b == book) else {
            return Ok(false);
        };

        let removed = items.remove(pos);
        if let Err(e) = self.persist(&items) {
            items.insert(pos, removed);
            return Err(e.into());
        }
        Ok(true)
    }

    pub fn clear(&self) -> Result<(), CartError> {
        let mut items = self.lock();
        let previous = std::mem::take(&mut *items);
        if let Err(e) = self.persist(&items) {
            *items = previous;
            return Err(e.into());
        }
        Ok(())
    }

    /// Empty the cart and hand back what was bought.
    pub fn checkout(&self) -> Result<Receipt, CartError> {
        let mut items = self.lock();
        if items.is_empty() {
            return Err(CartError::Empty);
        }

        let total = sum_prices(&items)?;
        let purchased = std::mem::take(&mut *items);
        if let Err(e) = self.persist(&items) {
            *items = purchased;
            return Err(e.into());
        }

        let receipt = Receipt {
            id: Uuid::new_v4(),
            total,
            items: purchased,
            purchased_at: Utc::now(),
        };
        tracing::info!(
            "Checked out {} items for {} (receipt {})",
            receipt.items.len(),
            receipt.total,
            receipt.id
        );
        Ok(receipt)
    }
}

fn sum_prices(items: &[Book]) -> Result<i64, CartError> {
    items
        .iter()
        .try_fold(0i64, |total, b| total.checked_add(b.price))
        .ok_or(CartError::TotalOverflow)
}
