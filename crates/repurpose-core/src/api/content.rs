use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{Content, ContentType};
use crate::validation;

use super::{ApiClient, FilePart, MultipartUpload};

/// Title used when the user leaves it blank
pub const DEFAULT_TITLE: &str = "Untitled";

/// Default page size for the content library
pub const DEFAULT_CONTENT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Serialize)]
struct UploadRequest<'a> {
    title: &'a str,
    original_content: &'a str,
    content_type: ContentType,
}

fn title_or_default(title: Option<&str>) -> &str {
    match title {
        Some(t) if !t.trim().is_empty() => t,
        _ => DEFAULT_TITLE,
    }
}

/// Guess a MIME type for the extensions the backend accepts.
fn mime_for(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "txt" => Some("text/plain"),
        "md" => Some("text/markdown"),
        "pdf" => Some("application/pdf"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        _ => None,
    }
}

impl ApiClient {
    async fn upload(&self, title: Option<&str>, body: &str, content_type: ContentType) -> Result<Content> {
        let request = UploadRequest {
            title: title_or_default(title),
            original_content: body,
            content_type,
        };
        self.post("/api/content/upload", &request)
            .await
            .with_context(|| format!("Failed to upload {} content", content_type.as_str()))
    }

    /// Upload pasted text
    pub async fn upload_text(&self, title: Option<&str>, text: &str) -> Result<Content> {
        validation::validate_text_content(text)?;
        self.upload(title, text, ContentType::Text).await
    }

    /// Ask the backend to import the page at `url`
    pub async fn import_url(&self, title: Option<&str>, url: &str) -> Result<Content> {
        validation::validate_url(url)?;
        self.upload(title, url.trim(), ContentType::Url).await
    }

    /// Upload a file from disk. The title defaults to the file name.
    pub async fn upload_file(&self, title: Option<&str>, path: &Path) -> Result<Content> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("Not a file path: {}", path.display()))?
            .to_string();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        self.upload_file_bytes(title, &file_name, bytes).await
    }

    /// Upload in-memory file contents under the given file name
    pub async fn upload_file_bytes(
        &self,
        title: Option<&str>,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Content> {
        validation::validate_file_name(file_name)?;
        let title = match title {
            Some(t) if !t.trim().is_empty() => t,
            _ => file_name,
        };

        let upload = MultipartUpload::new().text("title", title).file(FilePart {
            field: "file".to_string(),
            file_name: file_name.to_string(),
            bytes,
            mime: mime_for(file_name).map(str::to_string),
        });

        // The backend reads the title from the query string
        self.post_multipart(
            "/api/content/upload-file",
            upload,
            &[("title", title.to_string())],
        )
            .await
            .with_context(|| format!("Failed to upload file {}", file_name))
    }

    /// List the content library, newest first
    pub async fn list_content(&self, skip: u32, limit: u32) -> Result<Vec<Content>> {
        self.get(
            "/api/content/",
            &[("skip", skip.to_string()), ("limit", limit.to_string())],
        )
        .await
        .context("Failed to list content")
    }

    pub async fn get_content(&self, content_id: i64) -> Result<Content> {
        self.get(&format!("/api/content/{}", content_id), &[])
            .await
            .with_context(|| format!("Failed to fetch content {}", content_id))
    }

    pub async fn delete_content(&self, content_id: i64) -> Result<()> {
        self.delete(&format!("/api/content/{}", content_id))
            .await
            .with_context(|| format!("Failed to delete content {}", content_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_or_default() {
        assert_eq!(title_or_default(None), "Untitled");
        assert_eq!(title_or_default(Some("  ")), "Untitled");
        assert_eq!(title_or_default(Some("Launch post")), "Launch post");
    }

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for("notes.MD"), Some("text/markdown"));
        assert_eq!(mime_for("paper.pdf"), Some("application/pdf"));
        assert_eq!(mime_for("archive.zip"), None);
        assert_eq!(mime_for("README"), None);
    }

    #[test]
    fn test_upload_request_shape() {
        let request = UploadRequest {
            title: "T",
            original_content: "https://example.com",
            content_type: ContentType::Url,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["content_type"], "url");
        assert_eq!(json["original_content"], "https://example.com");
    }
}
