use anyhow::Context;
use bytes::Bytes;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::storage::StorageClient;

pub const PRESIGN_TTL_SECS: u64 = 10 * 60;

pub fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

pub fn photo_key(user_id: Uuid, ext: &str) -> String {
    format!("issues/{}/{}.{}", user_id, Uuid::new_v4(), ext)
}

fn unavailable(e: anyhow::Error) -> CoreError {
    error!(error = ?e, "photo storage failed");
    CoreError::StorageUnavailable(e.to_string())
}

/// Stores one image and returns its key, to be used as an issue's `photo_ref`.
pub async fn upload_photo(
    storage: &dyn StorageClient,
    user_id: Uuid,
    body: Bytes,
    content_type: &str,
) -> CoreResult<String> {
    if body.is_empty() {
        return Err(CoreError::validation("image is empty"));
    }
    let ext = ext_from_mime(content_type).ok_or_else(|| {
        CoreError::validation(format!("unsupported image type {content_type}"))
    })?;

    let key = photo_key(user_id, ext);
    storage
        .put_object(&key, body, content_type)
        .await
        .with_context(|| format!("put_object {}", key))
        .map_err(unavailable)?;
    info!(user_id = %user_id, key = %key, "photo stored");
    Ok(key)
}

pub async fn presign_photo(storage: &dyn StorageClient, key: &str) -> CoreResult<String> {
    storage
        .presign_get(key, PRESIGN_TTL_SECS)
        .await
        .with_context(|| format!("presign url for {}", key))
        .map_err(unavailable)
}
