//! Upload and download handlers.

use axum::{
    body::Body,
    extract::{
        multipart::MultipartError, rejection::PathRejection, Multipart, Path, Query, State,
    },
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::file::OpenedFile;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::page::{
    UploadPage, MSG_FILE_MISSING, MSG_NO_FILE, MSG_NO_FILENAME, MSG_UPLOAD_FAILED,
};
use crate::RelayError;

/// Query parameters for the form-based download.
#[derive(Debug, Default, serde::Deserialize)]
pub struct DownloadQuery {
    /// Requested storage name.
    pub filename: Option<String>,
}

impl DownloadQuery {
    /// The requested name, or [`RelayError::MissingFilename`] if blank.
    pub fn filename(&self) -> crate::Result<&str> {
        self.filename
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(RelayError::MissingFilename)
    }
}

/// Fields collected from an upload form.
#[derive(Debug, Default)]
struct UploadForm {
    tag: Option<String>,
    file_name: Option<String>,
    content: Option<Vec<u8>>,
}

impl UploadForm {
    /// The file content, or [`RelayError::MissingFile`] if no file was sent.
    fn take_content(&mut self) -> crate::Result<Vec<u8>> {
        self.content.take().ok_or(RelayError::MissingFile)
    }
}

/// Generate a safe Content-Disposition header value for file downloads.
///
/// Control characters are dropped from the quoted fallback name, quotes and
/// backslashes replaced, and non-ASCII names are additionally sent as an
/// RFC 5987 `filename*` parameter.
fn content_disposition_header(filename: &str) -> String {
    let needs_encoding = !filename.is_ascii()
        || filename
            .chars()
            .any(|c| c.is_control() || c == '"' || c == '\\');

    if !needs_encoding {
        return format!("attachment; filename=\"{filename}\"");
    }

    let fallback: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            c => c,
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

/// Build a streaming attachment response for an opened file.
fn attachment_response(opened: OpenedFile) -> Result<Response, ApiError> {
    let content_type = mime_guess::from_path(&opened.storage_name)
        .first_or_octet_stream()
        .to_string();

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&opened.storage_name),
        )
        .header(header::CONTENT_LENGTH, opened.size)
        .body(Body::from_stream(ReaderStream::new(opened.file)))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// Drain the multipart body into an [`UploadForm`].
///
/// Unknown fields are ignored. A `file` part without a filename and without
/// content is what browsers send when nothing was selected, so it counts as
/// absent.
async fn read_upload_form(
    multipart: &mut Multipart,
) -> Result<UploadForm, MultipartError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "tag" => {
                form.tag = Some(field.text().await?);
            }
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let content = field.bytes().await?;

                // An empty nameless part is an unselected file input, not an
                // empty upload; a named empty file is still stored.
                let nothing_selected =
                    file_name.as_deref().map_or(true, str::is_empty) && content.is_empty();
                if !nothing_selected {
                    form.file_name = file_name;
                    form.content = Some(content.to_vec());
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /upload - Store a file under `{tag}_{timestamp}_{name}`.
///
/// Request body: multipart/form-data with "file" and optional "tag" fields.
/// Always answers with the page; the outcome is shown under the upload form.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut form = match read_upload_form(&mut multipart).await {
        Ok(form) => form,
        Err(e) => {
            let status = e.status();
            tracing::warn!(status = %status, error = %e, "Rejected upload body");
            let page =
                UploadPage::upload_message(format!("{MSG_UPLOAD_FAILED}: {}", e.body_text()));
            return Ok((status, page).into_response());
        }
    };

    let content = match form.take_content() {
        Ok(content) => content,
        Err(e) => {
            tracing::info!("Rejected upload: {}", e);
            return Ok(UploadPage::upload_message(MSG_NO_FILE).into_response());
        }
    };

    let original_name = form.file_name.unwrap_or_default();
    let stored = state
        .storage
        .save(
            form.tag.as_deref(),
            &original_name,
            &content,
            chrono::Utc::now(),
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to save upload");
            ApiError::from(e)
        })?;

    tracing::info!(
        storage_name = %stored.storage_name,
        tag = %stored.tag,
        size = stored.size,
        "Stored upload"
    );

    Ok(UploadPage::uploaded(&stored.storage_name).into_response())
}

/// GET /file/:filename - Send a stored file as an attachment.
///
/// Binary-safe: a missing file is a plain-text 404, never an HTML page.
/// A segment that does not decode to UTF-8 cannot name a stored file, so it
/// gets the same 404.
pub async fn get_file_raw(
    State(state): State<Arc<AppState>>,
    filename: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(filename) = filename.map_err(|rejection| {
        tracing::info!(error = %rejection, "Raw download with undecodable name");
        ApiError::file_not_found()
    })?;

    let opened = state.storage.open(&filename).await.map_err(|e| {
        if matches!(e, RelayError::NotFound(_)) {
            tracing::info!(requested = %filename, "Raw download of missing file");
        }
        ApiError::from(e)
    })?;

    tracing::info!(storage_name = %opened.storage_name, size = opened.size, "Serving file");
    attachment_response(opened)
}

/// GET /download?filename= - Form-based download.
///
/// A missing parameter or a missing file re-renders the page with a message
/// under the download form.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let filename = match query.filename() {
        Ok(name) => name,
        Err(e) => {
            tracing::debug!("Rejected download: {}", e);
            return Ok(UploadPage::download_message(MSG_NO_FILENAME).into_response());
        }
    };

    match state.storage.open(filename).await {
        Ok(opened) => {
            tracing::info!(storage_name = %opened.storage_name, size = opened.size, "Serving file");
            attachment_response(opened)
        }
        Err(RelayError::NotFound(_)) => {
            tracing::info!(requested = %filename, "Form download of missing file");
            Ok(UploadPage::download_message(MSG_FILE_MISSING).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
