use std::io;
use std::sync::Arc;

use actix_web::web;
use dotenvy::dotenv;
use storefront_orders::config::Config;
use storefront_orders::infrastructure::nominatim::NominatimClient;
use storefront_orders::infrastructure::order_repo::DieselOrderRepository;
use storefront_orders::infrastructure::paystack::PaystackClient;
use storefront_orders::{build_server, create_pool, run_migrations, AppState};

fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(io::Error::other)?;

    let pool = create_pool(&config.database_url).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    // Blocking HTTP clients spin up their own runtime and must be built
    // before the server's runtime starts.
    let gateway = PaystackClient::new(&config.paystack).map_err(io::Error::other)?;
    let geocoder = NominatimClient::new(&config.nominatim).map_err(io::Error::other)?;

    let state = web::Data::new(AppState::new(
        Arc::new(DieselOrderRepository::new(pool)),
        Arc::new(gateway),
        Arc::new(geocoder),
        config.checkout.clone(),
        config.paystack.secret_key.clone(),
    ));

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    actix_web::rt::System::new()
        .block_on(async { build_server(state.clone(), &config.host, config.port)?.await })
}
