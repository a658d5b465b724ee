//! Base64 image uploads (`data:image/<ext>;base64,<payload>`) written under the media root.

use std::path::Path;

use base64::{Engine, engine::general_purpose::STANDARD};
use tokio::fs;

use crate::{
    error::{AppError, AppResult},
    random,
};

pub const RECIPE_IMAGES_DIR: &str = "recipes/images";
pub const AVATARS_DIR: &str = "users/avatars";

const FILENAME_LENGTH: usize = 16;

#[derive(Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub extension: String,
    pub bytes: Vec<u8>,
}

pub fn decode_data_uri(data: &str) -> AppResult<DecodedImage> {
    let invalid = || AppError::BadRequest("image must be a base64 encoded data URI".into());

    let rest = data.strip_prefix("data:image/").ok_or_else(invalid)?;
    let (extension, payload) = rest.split_once(";base64,").ok_or_else(invalid)?;
    if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid());
    }
    let bytes = STANDARD.decode(payload.trim()).map_err(|_| invalid())?;
    if bytes.is_empty() {
        return Err(invalid());
    }

    Ok(DecodedImage {
        extension: extension.to_ascii_lowercase(),
        bytes,
    })
}

/// Decodes `data` and stores it under `root/dir`, returning the path relative to `root`.
pub async fn save_image(root: &Path, dir: &str, data: &str) -> AppResult<String> {
    let image = decode_data_uri(data)?;
    let relative = format!(
        "{dir}/{}.{}",
        random::alphanumeric(FILENAME_LENGTH),
        image.extension
    );

    fs::create_dir_all(root.join(dir))
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    fs::write(root.join(&relative), &image.bytes)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    tracing::debug!(path = %relative, size = image.bytes.len(), "image stored");
    Ok(relative)
}

/// Best effort; a missing file is not an error.
pub async fn remove_image(root: &Path, relative: &str) {
    if relative.is_empty() {
        return;
    }
    if let Err(err) = fs::remove_file(root.join(relative)).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(error = %err, path = %relative, "failed to remove image");
        }
    }
}

pub fn media_url(public_url: &str, relative: &str) -> String {
    format!("{}/media/{relative}", public_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABAQMAAAAl21bKAAAAA1BMVEUAAACnej3aAAAAAXRSTlMAQObYZgAAAApJREFUCNdjYAAAAAIAAeIhvDMAAAAASUVORK5CYII=";

    #[test]
    fn decodes_png_data_uri() {
        let image = decode_data_uri(PIXEL).unwrap();
        assert_eq!(image.extension, "png");
        assert_eq!(&image.bytes[1..4], b"PNG");
    }

    #[test]
    fn rejects_plain_strings_and_bad_payloads() {
        assert!(decode_data_uri("not an image").is_err());
        assert!(decode_data_uri("data:image/png;base64,@@@").is_err());
        assert!(decode_data_uri("data:image/;base64,AAAA").is_err());
        assert!(decode_data_uri("data:image/../x;base64,AAAA").is_err());
    }

    #[tokio::test]
    async fn saves_and_removes_image() {
        let root = std::env::temp_dir().join(format!("media-test-{}", random::alphanumeric(8)));
        let relative = save_image(&root, RECIPE_IMAGES_DIR, PIXEL).await.unwrap();
        assert!(relative.starts_with("recipes/images/"));
        assert!(relative.ends_with(".png"));
        assert!(root.join(&relative).exists());

        remove_image(&root, &relative).await;
        assert!(!root.join(&relative).exists());
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn renders_media_url() {
        assert_eq!(
            media_url("http://localhost:3000/", "users/avatars/a.png"),
            "http://localhost:3000/media/users/avatars/a.png"
        );
    }
}
