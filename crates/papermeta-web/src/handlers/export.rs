use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use papermeta_common::ApiError;
use papermeta_store::{render_export, ExportFormat};

use crate::handlers::required;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
    pub id: Option<String>,
}

pub async fn export_record(
    State(state): State<SharedState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    // format is checked before the record is looked up
    let format: ExportFormat = required(query.format, "format")?.parse()?;
    let id = required(query.id, "id")?;

    let record = state.store.get(&id)?;
    let rendered = render_export(&record, format)?;

    Ok(([(header::CONTENT_TYPE, rendered.content_type)], rendered.body).into_response())
}
