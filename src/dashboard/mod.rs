// ============================================================================
// Visualization Front End
// ============================================================================
//
// Stateless: every request reads the whole table and derives its views.
//
// - views:  data contracts (filtered rows, counts, totals, balance series)
// - page:   server-rendered HTML for the views
// - server: actix-web routes
//
// ============================================================================

mod page;
mod server;
mod views;

pub use server::{configure, start_dashboard, DashboardQuery};
pub use views::{
    balance_series, count_matrix, filter_by_date, totals_by_account, BalancePoint, DateRange, TypeCounts, TypeTotals,
};
