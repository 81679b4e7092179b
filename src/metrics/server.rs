use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use prometheus::{Encoder, Registry, TextEncoder};

/// Start the metrics HTTP server
/// This should be called in a separate thread/runtime to avoid conflicts
pub async fn start_metrics_server(registry: Registry, port: u16) -> std::io::Result<()> {
    tracing::info!("📊 Starting metrics server on http://0.0.0.0:{}/metrics", port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(registry.clone()))
            .route("/metrics", web::get().to(metrics_handler))
            .route("/health", web::get().to(health_handler))
    })
    .workers(1)
    .disable_signals()
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

async fn metrics_handler(registry: web::Data<Registry>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}

async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "geo-courier"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{body::to_bytes, test};
    use prometheus::IntCounter;

    #[actix_web::test]
    async fn test_metrics_endpoint_renders_registry() {
        let registry = Registry::new();
        let counter = IntCounter::new("orders_generated_total", "test").unwrap();
        registry.register(Box::new(counter.clone())).unwrap();
        counter.inc();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(registry))
                .route("/metrics", web::get().to(metrics_handler)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
        assert!(resp.status().is_success());

        let body = to_bytes(resp.into_body()).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("orders_generated_total 1"));
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let app = test::init_service(App::new().route("/health", web::get().to(health_handler))).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert!(resp.status().is_success());
    }
}
