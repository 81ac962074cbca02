use axum::extract::Multipart;

use papermeta_common::PapermetaError;

/// Form field carrying the document.
pub const FILE_FIELD: &str = "file";

/// An uploaded file with its data and client-supplied name.
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Pull the `file` field out of a multipart upload. Other fields are read
/// and discarded; a broken body in any field rejects the upload.
pub async fn parse_upload(mut multipart: Multipart) -> Result<UploadedFile, PapermetaError> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PapermetaError::InvalidInput(format!("failed to read form field: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == FILE_FIELD {
            let filename = field.file_name().unwrap_or("").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| PapermetaError::InvalidInput(format!("failed to read file data: {e}")))?
                .to_vec();
            file = Some(UploadedFile { filename, data });
        } else {
            field.bytes().await.map_err(|e| {
                PapermetaError::InvalidInput(format!("failed to read form field {name:?}: {e}"))
            })?;
        }
    }

    file.ok_or_else(|| {
        PapermetaError::InvalidInput(format!("no file uploaded; expected form field {FILE_FIELD:?}"))
    })
}
