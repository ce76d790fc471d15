//! Landing page handler.

use crate::web::page::UploadPage;

/// GET / - Render the upload/download page.
pub async fn index() -> UploadPage {
    UploadPage::default()
}
