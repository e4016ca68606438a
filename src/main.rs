use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;

use tasktracker::auth::{AuthMiddleware, JwtKeys};
use tasktracker::config::Config;
use tasktracker::db::{PgRepository, Repository};
use tasktracker::error::AppError;
use tasktracker::services;

fn startup_error(err: AppError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;
    let pg = PgRepository::connect(&config.database_url, config.database_max_connections)
        .await
        .map_err(startup_error)?;
    let repo: Arc<dyn Repository> = Arc::new(pg);

    if let Some(admin) = &config.admin {
        services::auth::ensure_admin(repo.as_ref(), admin)
            .await
            .map_err(startup_error)?;
    }

    let repo = web::Data::from(repo);
    let keys = web::Data::new(JwtKeys::from_config(&config));

    info!("Starting task tracker server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware)
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(tasktracker::configure(repo.clone(), keys.clone()))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
