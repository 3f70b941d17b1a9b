pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;
pub mod schema;
pub mod state;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use errors::AppError;

pub use db::{create_pool, DbPool};
pub use state::AppState;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Register every route. Shared by the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    use handlers::{address, admin, orders, payments};

    // Malformed bodies and query strings get the same JSON error shape as
    // every other failure.
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/orders")
            .route("/initiate", web::post().to(orders::initiate_order))
            .route("/verify", web::post().to(orders::verify_payment))
            .route("/customer/{user_id}", web::get().to(orders::list_user_orders))
            .route("/track/{reference}", web::get().to(orders::track_guest_order))
            .route("/{id}", web::get().to(orders::get_order)),
    )
    .service(
        web::scope("/admin/orders")
            .route("", web::get().to(admin::list_orders))
            .route("/pending-delivery", web::get().to(admin::list_pending_delivery))
            .route("/{id}/delivery", web::put().to(admin::update_delivery)),
    )
    .route("/address/validate", web::get().to(address::validate_address))
    .route("/webhooks/paystack", web::post().to(payments::paystack_webhook))
    .service(openapi::swagger_ui());
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: web::Data<AppState>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind((host.to_string(), port))?
    .run())
}
