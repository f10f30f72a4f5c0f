//! TSV plan import endpoint

use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, warn};

use super::begin_write;
use crate::db::import::{self as writer, ImportOutcome, ImportSummary};
use crate::error::{ApiError, ApiResult};
use crate::tsv::{group_rows, parse_plan_tsv, ImportError};
use crate::AppState;

fn rejected(errors: Vec<ImportError>) -> ApiError {
    warn!("Plan import rejected with {} error(s)", errors.len());
    ApiError::Validation(errors.iter().map(ToString::to_string).collect())
}

/// POST /api/plans/import
///
/// Body is the raw TSV text. Either every plan is written or none is.
pub async fn import_plans(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<(StatusCode, Json<ImportSummary>)> {
    let rows = parse_plan_tsv(&body).map_err(rejected)?;
    let groups = group_rows(rows).map_err(rejected)?;

    let mut tx = begin_write(&state.db).await?;
    let summary = match writer::import_plans(&mut tx, &groups).await? {
        ImportOutcome::Imported(summary) => summary,
        ImportOutcome::Rejected(errors) => return Err(rejected(errors)),
    };
    tx.commit().await?;

    info!(
        "Imported {} plan(s) from {} row(s)",
        summary.plans_created, summary.rows_imported
    );
    Ok((StatusCode::CREATED, Json(summary)))
}
