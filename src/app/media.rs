use anyhow::{anyhow, Result};
use bytes::Bytes;
use uuid::Uuid;

use crate::infra::storage::ObjectStorage;

#[derive(Clone)]
pub struct MediaService {
    storage: ObjectStorage,
}

impl MediaService {
    pub fn new(storage: ObjectStorage) -> Self {
        Self { storage }
    }

    /// Upload a featured image and return its public URL. Only the image
    /// types the editor accepts are allowed through.
    pub async fn upload_image(
        &self,
        owner_id: Uuid,
        content_type: &str,
        body: Bytes,
    ) -> Result<String> {
        let ext = extension_from_content_type(content_type)?;
        let key = format!("uploads/{}/{}.{}", owner_id, Uuid::new_v4(), ext);
        self.storage.put_public(&key, content_type, body).await
    }
}

fn extension_from_content_type(content_type: &str) -> Result<&'static str> {
    match content_type {
        "image/jpeg" => Ok("jpg"),
        "image/png" => Ok("png"),
        "image/webp" => Ok("webp"),
        other => Err(anyhow!("unsupported content type: {}", other)),
    }
}
