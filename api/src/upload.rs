//! Image uploads attached to user and event forms.
//!
//! Create and update endpoints accept either `multipart/form-data` (text
//! fields plus at most one file under [`IMAGE_FIELD`]) or a plain JSON
//! object. [`MultipartForm`] normalizes both into a JSON map so handlers can
//! deserialize the same parameter types either way.
//!
//! Accepted files are written by [`UploadStore`] to
//! `<upload_dir>/<namespace>/<unix_millis>-<sanitized name>` and referenced as
//! `/uploads/<namespace>/<file>`, which is where the server mounts the
//! upload directory.

use std::{
    fmt,
    io::ErrorKind,
    path::PathBuf,
};

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request, multipart::MultipartError},
    http::{StatusCode, header::CONTENT_TYPE},
};
use chrono::Utc;
use eventhub_common::validation::ValidationErrors;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, instrument, warn};

use crate::{context::ApiContext, error::ApiError};

/// Form field that carries the uploaded file.
pub const IMAGE_FIELD: &str = "image";

/// URL prefix the upload directory is served under.
pub const UPLOADS_ROUTE: &str = "/uploads";

const MAX_FILE_NAME_LEN: usize = 100;
const MAX_NAME_ATTEMPTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadNamespace {
    Users,
    Events,
}

impl UploadNamespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadNamespace::Users => "users",
            UploadNamespace::Events => "events",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "users" => Some(UploadNamespace::Users),
            "events" => Some(UploadNamespace::Events),
            _ => None,
        }
    }
}

impl fmt::Display for UploadNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file received with a request, held in memory until it is stored.
pub struct PendingUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl fmt::Debug for PendingUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Text fields of a form request plus its optional image.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: Map<String, Value>,
    image: Option<PendingUpload>,
}

impl MultipartForm {
    /// Deserialize the text fields into `T`.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| ApiError::Validation(ValidationErrors::single("body", e.to_string())))
    }

    pub fn take_image(&mut self) -> Option<PendingUpload> {
        self.image.take()
    }

    async fn from_multipart(mut multipart: Multipart, limit: usize) -> Result<Self, ApiError> {
        let mut form = MultipartForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, limit))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name != IMAGE_FIELD {
                let text = field.text().await.map_err(|e| multipart_error(e, limit))?;
                form.fields.insert(name, Value::String(text));
                continue;
            }

            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;

            // Browsers send an empty part when the file input is left blank.
            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }

            if form.image.is_some() {
                return Err(ValidationErrors::single(
                    IMAGE_FIELD,
                    "only one image may be uploaded per request",
                )
                .into());
            }

            if !content_type.starts_with("image/") {
                return Err(ValidationErrors::single(
                    IMAGE_FIELD,
                    format!("image must have an image/* content type, got {content_type:?}"),
                )
                .into());
            }

            form.image = Some(PendingUpload {
                file_name,
                content_type,
                bytes,
            });
        }

        Ok(form)
    }

    fn from_json(bytes: &[u8]) -> Result<Self, ApiError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(MultipartForm::default());
        }

        let fields = serde_json::from_slice::<Map<String, Value>>(bytes).map_err(|e| {
            ApiError::Validation(ValidationErrors::single(
                "body",
                format!("expected a JSON object: {e}"),
            ))
        })?;

        Ok(MultipartForm {
            fields,
            image: None,
        })
    }
}

impl FromRequest<ApiContext> for MultipartForm {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &ApiContext) -> Result<Self, Self::Rejection> {
        let limit = state.config.max_upload_bytes;
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state).await.map_err(|e| {
                ApiError::Validation(ValidationErrors::single("body", e.body_text()))
            })?;
            return Self::from_multipart(multipart, limit).await;
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::PayloadTooLarge { limit }
            } else {
                ApiError::Validation(ValidationErrors::single("body", e.body_text()))
            }
        })?;

        Self::from_json(&bytes)
    }
}

fn multipart_error(err: MultipartError, limit: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge { limit }
    } else {
        ApiError::Validation(ValidationErrors::single("body", err.body_text()))
    }
}

/// Writes uploaded images below the configured upload directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Persist `upload` under `namespace` and return its public reference.
    /// No upload means no reference.
    #[instrument(skip(self, upload), fields(namespace = %namespace))]
    pub async fn store(
        &self,
        namespace: UploadNamespace,
        upload: Option<PendingUpload>,
    ) -> Result<Option<String>, ApiError> {
        let Some(upload) = upload else {
            return Ok(None);
        };

        let dir = self.root.join(namespace.as_str());
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create upload directory {}", dir.display()))?;

        let stem = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_file_name(&upload.file_name)
        );

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = if attempt == 0 {
                stem.clone()
            } else {
                format!("{attempt}-{stem}")
            };
            let path = dir.join(&file_name);

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(anyhow::Error::new(e)
                        .context(format!("failed to create {}", path.display()))
                        .into());
                }
            };

            file.write_all(&upload.bytes)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            file.flush()
                .await
                .with_context(|| format!("failed to flush {}", path.display()))?;

            debug!(
                file = %file_name,
                bytes = upload.bytes.len(),
                content_type = %upload.content_type,
                "Stored upload"
            );
            return Ok(Some(format!(
                "{UPLOADS_ROUTE}/{}/{file_name}",
                namespace.as_str()
            )));
        }

        Err(anyhow::anyhow!("could not find a free file name for {stem}").into())
    }

    /// Best-effort removal of a stored upload, used when the request that
    /// carried it fails afterwards.
    pub async fn discard(&self, reference: &str) {
        let Some(path) = self.resolve(reference) else {
            warn!(reference, "Refusing to discard unknown upload reference");
            return;
        };

        if let Err(e) = fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %e, "Failed to discard upload");
        }
    }

    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let rest = reference.strip_prefix(UPLOADS_ROUTE)?.strip_prefix('/')?;
        let (namespace, file) = rest.split_once('/')?;
        let namespace = UploadNamespace::from_segment(namespace)?;

        if file.is_empty() || file.contains(['/', '\\']) || file.starts_with('.') {
            return None;
        }

        Some(self.root.join(namespace.as_str()).join(file))
    }
}

/// Reduce a client supplied file name to a safe single path component.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        return "upload".to_string();
    }

    // Keep the tail so the extension survives.
    let skip = cleaned.len().saturating_sub(MAX_FILE_NAME_LEN);
    cleaned[skip..].to_string()
}
