use axum::{
    extract::{Path, State},
    Json,
};

use papermeta_common::ApiError;
use papermeta_store::VerificationView;

use crate::state::SharedState;

pub async fn get_verification(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<VerificationView>, ApiError> {
    let record = state.store.get(&id)?;
    Ok(Json(VerificationView::from_record(&record)))
}
