//! Client-held cart: an ordered, id-deduplicated list of artwork
//! projections. No cart mutation touches the server; checkout receives
//! the serialized form as a form field.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// Fixed key the serialized cart lives under in the client-local store.
pub const CART_KEY: &str = "cart";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartEntry {
    pub id: Uuid,
    pub title: String,
    pub price: i64,
    pub image: Option<String>,
    pub slug: String,
}

/// Outcome of [`Cart::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// The wire form is a bare JSON array of entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unless an entry with the same artwork id is already present;
    /// insertion order is preserved.
    pub fn add(&mut self, entry: CartEntry) -> AddOutcome {
        if self.entries.iter().any(|e| e.id == entry.id) {
            return AddOutcome::AlreadyPresent;
        }
        self.entries.push(entry);
        AddOutcome::Added
    }

    /// Drop the entry carrying this artwork id, if present.
    pub fn remove(&mut self, id: Uuid) {
        self.entries.retain(|e| e.id != id);
    }

    /// Sum of entry prices in whole rupees. Exact: i64 arithmetic, no
    /// floating point anywhere.
    pub fn total(&self) -> i64 {
        self.entries.iter().map(|e| e.price).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }
}

/// Client-local string store scoped to one profile, the shape of the
/// browser `localStorage` the front end keeps the cart in.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryKv {
    values: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Persists the cart under [`CART_KEY`]. Saves are last-write-wins: two
/// tabs racing a read-modify-write keep whichever save lands last, a
/// chosen policy for a single-user cart. A missing or unparseable stored
/// value loads as the empty cart.
pub struct CartStore<S> {
    store: S,
}

impl<S: KvStore> CartStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Cart {
        self.store
            .get(CART_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn save(&mut self, cart: &Cart) -> serde_json::Result<()> {
        let raw = serde_json::to_string(cart)?;
        self.store.set(CART_KEY, raw);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.store.remove(CART_KEY);
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}
