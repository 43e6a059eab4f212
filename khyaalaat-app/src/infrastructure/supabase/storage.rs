use super::{error_from_response, http_client};
use khyaalaat_errors::AppError;
use uuid::Uuid;

pub const BUCKET: &str = "poetry-images";
const PUBLIC_PREFIX: &str = "/storage/v1/object/public/";

/// Client for the Supabase Storage bucket holding poem images.
#[derive(Clone)]
pub struct SupabaseStorage {
    http_client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseStorage {
    pub fn new(base_url: &str, service_key: &str) -> Result<Self, AppError> {
        Ok(Self {
            http_client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        })
    }

    pub fn public_url(&self, path: &str) -> String {
        format!("{}{}{}/{}", self.base_url, PUBLIC_PREFIX, BUCKET, path)
    }

    /// Stores the image under `{owner}/{timestamp}.{ext}` and returns its
    /// public URL. Never overwrites an existing object.
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        file_name: &str,
        owner: Uuid,
    ) -> Result<String, AppError> {
        let path = format!(
            "{}/{}.{}",
            owner,
            chrono::Utc::now().timestamp_millis(),
            file_extension(file_name, content_type)
        );

        let response = self
            .http_client
            .post(format!("{}/storage/v1/object/{}/{}", self.base_url, BUCKET, path))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("Content-Type", content_type)
            .header("cache-control", "max-age=3600")
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response("storage", response).await);
        }

        tracing::info!(%path, "Uploaded image");
        Ok(self.public_url(&path))
    }

    pub async fn delete(&self, public_url: &str) -> Result<(), AppError> {
        let path = object_path_from_public_url(public_url)
            .ok_or_else(|| AppError::Storage(format!("not a {BUCKET} URL: {public_url}")))?;

        let response = self
            .http_client
            .delete(format!("{}/storage/v1/object/{}", self.base_url, BUCKET))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .json(&serde_json::json!({ "prefixes": [path] }))
            .send()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response("storage", response).await);
        }

        tracing::info!(%path, "Deleted image");
        Ok(())
    }
}

/// Object path inside the bucket for one of its public URLs.
pub fn object_path_from_public_url(public_url: &str) -> Option<String> {
    let parsed = url::Url::parse(public_url).ok()?;
    let prefix = format!("{PUBLIC_PREFIX}{BUCKET}/");
    let encoded = parsed.path().strip_prefix(&prefix)?;
    if encoded.is_empty() {
        return None;
    }
    urlencoding::decode(encoded).ok().map(|p| p.into_owned())
}

fn file_extension(file_name: &str, content_type: &str) -> String {
    let from_name = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()));
    let from_type = content_type.strip_prefix("image/").map(|t| t.split('+').next().unwrap_or(t));

    from_name
        .or(from_type)
        .unwrap_or("bin")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_is_extracted_from_public_url() {
        let url = "https://abc.supabase.co/storage/v1/object/public/poetry-images/6a1c/1757672106473.png";
        assert_eq!(
            object_path_from_public_url(url).as_deref(),
            Some("6a1c/1757672106473.png")
        );
    }

    #[test]
    fn encoded_characters_are_decoded() {
        let url = "https://abc.supabase.co/storage/v1/object/public/poetry-images/a/my%20poem.jpg";
        assert_eq!(object_path_from_public_url(url).as_deref(), Some("a/my poem.jpg"));
    }

    #[test]
    fn other_urls_have_no_path() {
        assert_eq!(object_path_from_public_url("https://picsum.photos/seed/dawn/600/400"), None);
        assert_eq!(
            object_path_from_public_url("https://abc.supabase.co/storage/v1/object/public/poetry-images/"),
            None
        );
        assert_eq!(object_path_from_public_url("not a url"), None);
    }

    #[test]
    fn public_url_round_trips() {
        let storage = SupabaseStorage::new("https://abc.supabase.co/", "key").unwrap();
        let url = storage.public_url("owner/1.png");
        assert_eq!(url, "https://abc.supabase.co/storage/v1/object/public/poetry-images/owner/1.png");
        assert_eq!(object_path_from_public_url(&url).as_deref(), Some("owner/1.png"));
    }

    #[test]
    fn extension_falls_back_to_content_type() {
        assert_eq!(file_extension("Dawn.PNG", "image/png"), "png");
        assert_eq!(file_extension("photo", "image/jpeg"), "jpeg");
        assert_eq!(file_extension("icon", "image/svg+xml"), "svg");
        assert_eq!(file_extension("x.", "application/octet-stream"), "bin");
    }
}
