use actix_cors::Cors;
use actix_web::{get, middleware::Logger, App, HttpResponse, HttpServer, Responder};
use anyhow::Result;

use payroll_be::database::init_database;
use payroll_be::{routes, Config};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Payroll Engine API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    log::info!("Starting payroll engine API server...");

    // Load configuration
    let config = Config::from_env()?;
    log::info!(
        "Configuration loaded (environment: {})",
        config.environment
    );

    // Initialize database and run migrations
    init_database(&config.database_url).await?;
    log::info!("Database initialized");

    let server_address = config.server_address();
    let is_development = config.is_development();

    log::info!("Listening on {}", server_address);

    HttpServer::new(move || {
        let cors = if is_development {
            Cors::permissive()
        } else {
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
                .allow_any_header()
                .max_age(3600)
        };

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .service(hello)
            .service(health)
            .configure(routes::configure)
    })
    .bind(server_address)?
    .run()
    .await?;

    Ok(())
}
