// handlers/invoices.rs - invoice reporting endpoints

use axum::extract::State;

use crate::database::Repository;
use crate::middleware::{ApiResponse, ApiResult};
use crate::resources::invoice::{self, Invoice, LatestInvoice, LATEST_LIMIT};
use crate::state::AppState;

/// GET /invoices/latest - five most recent invoices by date
///
/// Customer fields come from a left join, so they are omitted when the
/// customer has since been deleted.
///
/// ```json
/// [{ "id": "65f0c1...", "name": "Ann", "email": "ann@x.com", "imageUrl": "https://...", "amount": 120.5 }]
/// ```
pub async fn latest(State(state): State<AppState>) -> ApiResult<Vec<LatestInvoice>> {
    let rows = Repository::<Invoice>::new(&state.db)
        .aggregate::<LatestInvoice>(invoice::latest_pipeline(LATEST_LIMIT))
        .await?;
    Ok(ApiResponse::success(rows))
}
