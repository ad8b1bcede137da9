use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, App, HttpServer};
use std::io;
use std::sync::Arc;

use taskledger::auth::{PasswordHasher, TokenService};
use taskledger::store::{postgres, PgStore};
use taskledger::{AppState, Config};

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    log::error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    log::info!("Connecting to database at {}", config.database_host());
    let pool = postgres::connect(&config)
        .await
        .map_err(|e| startup_error("Failed to connect to database", e))?;
    postgres::migrate(&pool)
        .await
        .map_err(|e| startup_error("Failed to run migrations", e))?;

    let tokens = config
        .token_ttl()
        .and_then(|ttl| TokenService::new(&config.jwt_secret, ttl))
        .map_err(|e| startup_error("Invalid token configuration", e))?;
    let store = Arc::new(PgStore::new(pool));
    let state = AppState::new(
        store.clone(),
        store,
        PasswordHasher::new(config.bcrypt_cost),
        tokens,
    );

    let origins = config.cors_origins.clone();
    log::info!("Starting TaskLedger server at {}", config.server_url());

    HttpServer::new(move || {
        let cors = origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allow_any_header()
            .expose_headers(vec![header::WWW_AUTHENTICATE])
            .supports_credentials()
            .max_age(3600);

        let state = state.clone();
        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .configure(move |cfg| state.configure(cfg))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
