use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::DashboardConfig;
use crate::messaging::TransactionMessage;
use crate::metrics::{metrics_handler, Metrics};
use crate::store::TransactionStore;

use super::page::{render_page, PageModel};
use super::views::{balance_series, count_matrix, filter_by_date, totals_by_account, BalancePoint, DateRange};

/// Query string shared by the page and the filtered view.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub account: Option<String>,
}

#[derive(Serialize)]
struct FilteredResponse {
    range: Option<DateRange>,
    rows: Vec<TransactionMessage>,
}

#[derive(Serialize)]
struct BalanceResponse {
    account: String,
    points: Vec<BalancePoint>,
}

/// Serve the dashboard until the process is stopped.
pub async fn start_dashboard(
    config: &DashboardConfig,
    store: Arc<TransactionStore>,
    metrics: Arc<Metrics>,
) -> std::io::Result<()> {
    tracing::info!("📈 Starting dashboard on http://{}:{}/", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(store.clone()))
            .app_data(web::Data::new(metrics.clone()))
            .configure(configure)
    })
    .workers(1)
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

/// Register every dashboard route. Expects `Data<TransactionStore>` and
/// `Data<Arc<Metrics>>` on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index_handler))
        .route("/api/transactions", web::get().to(transactions_handler))
        .route("/api/transactions/filtered", web::get().to(filtered_handler))
        .route("/api/summary/counts", web::get().to(counts_handler))
        .route("/api/summary/totals", web::get().to(totals_handler))
        .route("/api/accounts/{account}/balance", web::get().to(balance_handler))
        .route("/health", web::get().to(health_handler))
        .route("/metrics", web::get().to(metrics_handler));
}

async fn index_handler(store: web::Data<TransactionStore>, query: web::Query<DashboardQuery>) -> impl Responder {
    let table = store.query_all().await;
    let range = DateRange::resolve(&table, query.start, query.end);
    let filtered = match &range {
        Some(range) => filter_by_date(&table, range),
        None => table.clone(),
    };
    let counts = count_matrix(&table);
    let totals = totals_by_account(&table);

    // Default to the first account, like a select box would.
    let accounts = table.accounts();
    let account = query
        .account
        .as_deref()
        .filter(|a| table.contains_account(a))
        .or_else(|| accounts.first().map(String::as_str));
    let series = account.map(|a| balance_series(&table, a)).unwrap_or_default();

    let html = render_page(&PageModel {
        table: &table,
        range,
        filtered: &filtered,
        counts: &counts,
        totals: &totals,
        account,
        series: &series,
    });

    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(html)
}

async fn transactions_handler(store: web::Data<TransactionStore>) -> impl Responder {
    let table = store.query_all().await;
    let rows: Vec<TransactionMessage> = table.iter().map(TransactionMessage::from).collect();
    HttpResponse::Ok().json(rows)
}

async fn filtered_handler(store: web::Data<TransactionStore>, query: web::Query<DashboardQuery>) -> impl Responder {
    let table = store.query_all().await;
    let range = DateRange::resolve(&table, query.start, query.end);
    let rows = match &range {
        Some(range) => filter_by_date(&table, range).iter().map(TransactionMessage::from).collect(),
        None => Vec::new(),
    };

    HttpResponse::Ok().json(FilteredResponse { range, rows })
}

async fn counts_handler(store: web::Data<TransactionStore>) -> impl Responder {
    HttpResponse::Ok().json(count_matrix(&store.query_all().await))
}

async fn totals_handler(store: web::Data<TransactionStore>) -> impl Responder {
    HttpResponse::Ok().json(totals_by_account(&store.query_all().await))
}

async fn balance_handler(store: web::Data<TransactionStore>, account: web::Path<String>) -> impl Responder {
    let account = account.into_inner();
    let table = store.query_all().await;

    if !table.contains_account(&account) {
        return HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("unknown account: {}", account)
        }));
    }

    let points = balance_series(&table, &account);
    HttpResponse::Ok().json(BalanceResponse { account, points })
}

async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "bank-stream-dashboard"
    }))
}
