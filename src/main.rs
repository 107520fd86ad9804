use std::fs::OpenOptions;

use actix_web::{web, App, HttpServer};
use migration::{Migrator, MigratorTrait as _};
use sea_orm::Database;
use tracing::{info, Level};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{filter, fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

use crate::{auth::Authority, payroll::PayrollPolicy};

mod config;
mod consts;

mod audit;
mod auth;
mod entity;
mod pages;
mod payroll;

#[cfg(test)]
mod test_support;

#[actix_web::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let log_file = OpenOptions::new()
        .append(true)
        .create(true)
        .open("trace.log")
        .unwrap();

    let subscriber = Registry::default()
        .with(
            fmt::layer()
                .with_ansi(true)
                .with_line_number(true)
                .with_filter(EnvFilter::from_default_env())
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(log_file)
                .with_filter(filter::LevelFilter::from_level(Level::TRACE))
        );

    tracing::subscriber::set_global_default(subscriber).unwrap();

    let config::Config {
        host_address,
        database_opt,
        jwt_key,
        access_token_ttl,
        tax_table,
    } = config::load();

    let connection = Database::connect(database_opt).await.expect("Unable to connect to database");
    Migrator::up(&connection, None).await.expect("Unable to run migrations");

    let database = web::Data::new(connection);
    let authority = web::Data::new(Authority::new(jwt_key.as_bytes(), access_token_ttl));
    let policy = web::Data::new(PayrollPolicy::new(tax_table));

    info!(%host_address, "starting payroll service");

    let server = HttpServer::new(move || {
        App::new()
            .app_data(database.clone())
            .app_data(authority.clone())
            .app_data(policy.clone())
            .wrap(TracingLogger::default())
            .configure(pages::config)
    });

    server
        .bind(host_address).unwrap()
        .run().await.unwrap();
}
