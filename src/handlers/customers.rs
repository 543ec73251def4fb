// handlers/customers.rs - customer reporting endpoints

use axum::extract::{Query, State};

use crate::database::Repository;
use crate::filter::{ListParams, Page};
use crate::middleware::{ApiResponse, ApiResult};
use crate::resources::customer::{self, Customer, CustomerWithTotals, FacetPage};
use crate::resources::Resource;
use crate::state::AppState;

/**
 * GET /customers/totals - customers with their invoice totals
 *
 * Same filtering and paging as `GET /customers`; rows and the total count
 * come from a single aggregation.
 *
 * Query: `keyword`, `size`, `page` (all optional)
 *
 * Expected Output:
 * ```json
 * {
 *   "totalRows": 12,
 *   "totalPages": 2,
 *   "pageNumber": 1,
 *   "pageSize": 10,
 *   "data": [
 *     {
 *       "id": "65f0c1...",
 *       "name": "Ann",
 *       "email": "ann@x.com",
 *       "imageUrl": "https://...",
 *       "createdAt": "2024-03-12T10:00:00Z",
 *       "updatedAt": "2024-03-12T10:00:00Z",
 *       "totalInvoices": 3,
 *       "totalPaid": 2,
 *       "totalPending": 1
 *     }
 *   ]
 * }
 * ```
 */
pub async fn totals(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Page<CustomerWithTotals>> {
    let filter = Customer::list_filter(&params)?;
    let page = params.page_request(&state.config.api);

    let facet = Repository::<Customer>::new(&state.db)
        .aggregate::<FacetPage<CustomerWithTotals>>(customer::totals_pipeline(filter, page))
        .await?
        .into_iter()
        .next()
        .unwrap_or_default();

    let total_rows = facet.total_rows();
    Ok(ApiResponse::success(Page::new(page, total_rows, facet.rows)))
}
