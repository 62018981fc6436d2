use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;

use super::Metrics;

/// Start the metrics HTTP server
pub async fn start_metrics_server(metrics: Arc<Metrics>, port: u16) -> std::io::Result<()> {
    tracing::info!("📊 Starting metrics server on http://0.0.0.0:{}/metrics", port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(metrics.clone()))
            .route("/metrics", web::get().to(metrics_handler))
    })
    .workers(1)
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

/// Run the metrics server on its own thread and runtime so the pipeline's
/// single-threaded runtime is left alone.
pub fn spawn_metrics_server(metrics: Arc<Metrics>, port: u16) {
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!("Failed to build metrics runtime: {}", e);
                return;
            }
        };
        rt.block_on(async {
            if let Err(e) = start_metrics_server(metrics, port).await {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    });
}

pub async fn metrics_handler(metrics: web::Data<Arc<Metrics>>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = metrics.registry().gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}
