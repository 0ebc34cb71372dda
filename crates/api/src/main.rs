use std::sync::Arc;

#[tokio::main]
async fn main() {
    movequote_observability::init();

    let config = movequote_api::config::ApiConfig::from_env();
    let services = Arc::new(movequote_api::app::services::build_services(&config).await);
    let app = movequote_api::app::build_app(&config, services);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind listen address");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
