use std::{env, net::{SocketAddr, ToSocketAddrs as _}, str::FromStr as _};

use chrono::Duration;
use rust_decimal::Decimal;
use sea_orm::ConnectOptions;
use tracing::info;

use crate::{consts::DEFAULT_ACCESS_TOKEN_TTL_MINUTES, payroll::tax::TaxTable};

pub struct Config {
    pub host_address: SocketAddr,

    pub database_opt: ConnectOptions,

    pub jwt_key: String,
    pub access_token_ttl: Duration,

    pub tax_table: TaxTable,
}

pub fn load() -> Config {
    Config {
        host_address: load_host_address(),
        database_opt: load_database_opt().into(),
        jwt_key: load_jwt_key(),
        access_token_ttl: load_access_token_ttl(),
        tax_table: load_tax_table(),
    }
}

fn load_host_address() -> SocketAddr {
    info!("Loading environment `HOST_ADDRESS`");

    let var = env::var("HOST_ADDRESS").unwrap_or_else(|_| "127.0.0.1:0".to_string());

    var.to_socket_addrs()
        .expect("`HOST_ADDRESS` is not in a valid format").nth(0)
        .expect("unable to resolve host from `HOST_ADDRESS`")
}

fn load_database_opt() -> impl Into<ConnectOptions> {
    info!("Loading environment `DATABASE_URL`");

    env::var("DATABASE_URL").expect("Environment `DATABASE_URL` is required to be set")
}

fn load_jwt_key() -> String {
    info!("Loading environment `JWT_SECRET`");

    env::var("JWT_SECRET").expect("Environment `JWT_SECRET` is required to be set")
}

fn load_access_token_ttl() -> Duration {
    info!("Loading environment `ACCESS_TOKEN_TTL_MINUTES`");

    let minutes = match env::var("ACCESS_TOKEN_TTL_MINUTES") {
        Ok(var) => var.parse().expect("`ACCESS_TOKEN_TTL_MINUTES` must be a whole number of minutes"),
        Err(_) => DEFAULT_ACCESS_TOKEN_TTL_MINUTES,
    };

    Duration::minutes(minutes)
}

fn load_tax_table() -> TaxTable {
    info!("Loading environment `INSS_RATE`");

    let mut table = TaxTable::default();

    if let Ok(var) = env::var("INSS_RATE") {
        let rate = Decimal::from_str(&var).expect("`INSS_RATE` must be a decimal fraction, e.g. 0.03");
        assert!(rate >= Decimal::ZERO && rate <= Decimal::ONE, "`INSS_RATE` must be between 0 and 1");

        table.contribution_rate = rate;
    }

    table
}
