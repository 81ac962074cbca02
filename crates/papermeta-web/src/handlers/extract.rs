use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use papermeta_common::ApiError;

use crate::handlers::required;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct RecordQuery {
    pub id: Option<String>,
}

/// The full stored record, internal fields included.
pub async fn get_record(
    State(state): State<SharedState>,
    Query(query): Query<RecordQuery>,
) -> Result<Response, ApiError> {
    let id = required(query.id, "id")?;
    let record = state.store.get(&id)?;
    Ok(Json(&*record).into_response())
}
