use std::sync::Arc;

use crate::db::{DbPool, OrmConn};
use crate::storage::BlobStore;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub blobs: Arc<dyn BlobStore>,
}
