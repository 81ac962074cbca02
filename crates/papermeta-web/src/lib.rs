//! papermeta-web — HTTP API for uploading papers and reading back their
//! extracted metadata:
//!   - PDF upload and extraction
//!   - Record retrieval and export (JSON / XML / text)
//!   - Verification and statistics views

pub mod handlers;
pub mod router;
pub mod state;
pub mod upload;
