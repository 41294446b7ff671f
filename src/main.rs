use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;

use faena_console_server::database::Store;
use faena_console_server::models::session::SessionAuthenticationMiddlewareFactory;
use faena_console_server::routes;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let bind_addr: String = std::env::var("FAENA_BIND_ADDR")
        .unwrap_or_else(|_| String::from("127.0.0.1:8000"));
    let session_secret: String = std::env::var("SESSION_SECRET")
        .unwrap_or_else(|_| String::from("faena-console-development-secret"));

    let store = web::Data::new(Store::seed(session_secret));
    log::info!("listening on {bind_addr}");

    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .wrap(SessionAuthenticationMiddlewareFactory)
            .configure(routes::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
