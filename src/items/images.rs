use std::path::Path;

use anyhow::Context;
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

pub fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

pub fn upload_filename(user_id: Uuid, content_type: &str, now: OffsetDateTime) -> String {
    let ext = ext_from_mime(content_type).unwrap_or("bin");
    format!(
        "{}_{}_{}.{}",
        user_id,
        now.unix_timestamp(),
        Uuid::new_v4(),
        ext
    )
}

/// Writes the uploaded image under the upload dir and returns the public
/// path stored on the item.
pub async fn save_image(
    upload_dir: &str,
    user_id: Uuid,
    content_type: &str,
    body: Bytes,
) -> anyhow::Result<String> {
    let filename = upload_filename(user_id, content_type, OffsetDateTime::now_utc());
    let path = Path::new(upload_dir).join(&filename);
    tokio::fs::write(&path, &body)
        .await
        .with_context(|| format!("write upload {}", path.display()))?;
    Ok(format!("/uploads/{filename}"))
}

/// Best-effort removal of a stored image. Failures are logged and swallowed;
/// a missing file must not block item deletion.
pub async fn remove_image(upload_dir: &str, image_path: &str) {
    let Some(filename) = image_path.strip_prefix("/uploads/") else {
        warn!(%image_path, "unexpected image path, skipping delete");
        return;
    };
    let path = Path::new(upload_dir).join(filename);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        warn!(error = %e, path = %path.display(), "failed to delete image file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("image/heic"), Some("heic"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[test]
    fn filename_carries_owner_and_extension() {
        let user_id = Uuid::new_v4();
        let name = upload_filename(user_id, "image/png", OffsetDateTime::UNIX_EPOCH);
        assert!(name.starts_with(&format!("{user_id}_0_")));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn unknown_mime_falls_back_to_bin() {
        let name = upload_filename(Uuid::new_v4(), "text/plain", OffsetDateTime::UNIX_EPOCH);
        assert!(name.ends_with(".bin"));
    }

    #[tokio::test]
    async fn remove_image_swallows_missing_file() {
        // Must not panic or error on a file that is not there.
        remove_image("target/test-uploads", "/uploads/does-not-exist.jpg").await;
        remove_image("target/test-uploads", "not-an-upload-path").await;
    }
}
