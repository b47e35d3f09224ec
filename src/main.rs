use std::io;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::info;

use employee_directory::config::AppConfig;
use employee_directory::services::EmployeeService;
use employee_directory::{db, handlers, middleware};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;

    let store = db::connect(&config.store)
        .await
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    let service = web::Data::new(EmployeeService::new(store.clone(), config.pagination));

    info!(
        "Starting server at {}:{}{} (CORS origin: {})",
        config.host, config.port, config.api_prefix, config.cors_origin
    );

    let cors_origin = config.cors_origin.clone();
    let api_prefix = config.api_prefix.clone();
    // HttpServer stops gracefully on SIGINT/SIGTERM.
    HttpServer::new(move || {
        let api_prefix = api_prefix.clone();
        App::new()
            .wrap(Logger::default())
            .wrap(middleware::security_headers())
            .wrap(middleware::cors(&cors_origin))
            .app_data(service.clone())
            .configure(move |cfg| handlers::mount(cfg, &api_prefix))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    store.close().await;
    info!("Server stopped, store connections closed");
    Ok(())
}
