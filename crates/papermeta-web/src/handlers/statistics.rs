use axum::{
    extract::{Path, State},
    Json,
};

use papermeta_common::ApiError;
use papermeta_store::StatisticsView;

use crate::state::SharedState;

pub async fn get_statistics(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<StatisticsView>, ApiError> {
    let record = state.store.get(&id)?;
    Ok(Json(StatisticsView::from_record(&record)))
}
