//! The single HTML page: upload form, download form and their messages.

use askama::Template;

/// Shown after a successful upload.
pub const MSG_UPLOADED: &str = "Upload complete";
/// Shown when an upload carried no file.
pub const MSG_NO_FILE: &str = "No file attached.";
/// Shown when an upload could not be read.
pub const MSG_UPLOAD_FAILED: &str = "Upload failed";
/// Shown when the download form was submitted without a name.
pub const MSG_NO_FILENAME: &str = "Enter a filename.";
/// Shown when the requested download does not exist.
pub const MSG_FILE_MISSING: &str = "File does not exist.";

/// Upload/download page.
///
/// `msg` is rendered under the upload form, `download_msg` under the
/// download form. Both are HTML-escaped by the template.
#[derive(Template, Debug, Default, Clone)]
#[template(path = "index.html")]
pub struct UploadPage {
    pub msg: Option<String>,
    pub download_msg: Option<String>,
}

impl UploadPage {
    /// Page with a message under the upload form.
    pub fn upload_message(msg: impl Into<String>) -> Self {
        Self {
            msg: Some(msg.into()),
            download_msg: None,
        }
    }

    /// Page with a message under the download form.
    pub fn download_message(msg: impl Into<String>) -> Self {
        Self {
            msg: None,
            download_msg: Some(msg.into()),
        }
    }

    /// Confirmation for a stored upload.
    pub fn uploaded(storage_name: &str) -> Self {
        Self::upload_message(format!("{MSG_UPLOADED}: {storage_name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty_page() {
        let html = UploadPage::default().render().unwrap();

        assert!(html.contains(r#"action="/upload""#));
        assert!(html.contains(r#"action="/download""#));
        assert!(!html.contains(r#"class="msg""#));
        assert!(!html.contains(r#"class="download-msg""#));
    }

    #[test]
    fn test_render_upload_message() {
        let html = UploadPage::uploaded("t1_20240309_140507_report.pdf")
            .render()
            .unwrap();

        assert!(html.contains("Upload complete: t1_20240309_140507_report.pdf"));
        assert!(!html.contains(r#"class="download-msg""#));
    }

    #[test]
    fn test_render_download_message() {
        let html = UploadPage::download_message(MSG_FILE_MISSING)
            .render()
            .unwrap();

        assert!(html.contains(MSG_FILE_MISSING));
        assert!(!html.contains(r#"class="msg""#));
    }

    #[test]
    fn test_render_escapes_messages() {
        let html = UploadPage::uploaded("<script>x</script>").render().unwrap();

        assert!(!html.contains("<script>x</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
