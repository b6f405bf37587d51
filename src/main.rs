use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use sky_analyzer::client::{Classifier, WorkflowClient};
use sky_analyzer::config::AppConfig;
use sky_analyzer::handlers;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = AppConfig::load().map_err(|e| {
        error!("{e}");
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let client = WorkflowClient::new(config.roboflow.clone()).map_err(|e| {
        error!("could not build workflow client: {e}");
        io::Error::other(e.to_string())
    })?;
    let classifier: web::Data<dyn Classifier> =
        web::Data::from(Arc::new(client) as Arc<dyn Classifier>);

    info!(
        bind = %config.server.bind,
        workspace = %config.roboflow.workspace,
        workflow = %config.roboflow.workflow,
        "Server running"
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .app_data(classifier.clone())
            .service(web::resource("/").route(web::get().to(handlers::index)))
            .service(web::resource("/health").route(web::get().to(handlers::health)))
            .service(web::resource("/analyze").route(web::post().to(handlers::analyze_upload)))
    })
    .bind(&config.server.bind)?
    .run()
    .await
}
