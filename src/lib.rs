pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;

use crate::infra::{ai::GenerativeClient, db::Db, storage::ObjectStorage};

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub storage: ObjectStorage,
    pub ai: GenerativeClient,
    pub identity_key: [u8; 32],
    pub upload_max_bytes: usize,
}
