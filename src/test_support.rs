use chrono::{Local, NaiveDate};
use migration::{Migrator, MigratorTrait as _};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, IntoActiveModel as _};
use uuid::Uuid;

use crate::entity::{employee, prelude::*, user};

/// Fresh in-memory SQLite database with every migration applied.
pub(crate) async fn database() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    // Each pooled connection would otherwise see its own empty database
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt).await.expect("Unable to open in-memory database");
    Migrator::up(&db, None).await.expect("Unable to run migrations");

    db
}

pub(crate) fn employee_model(name: &str, base_salary: Option<Decimal>, is_active: bool) -> employee::Model {
    employee::Model {
        id: Uuid::new_v4(),
        created_at: Local::now().fixed_offset(),
        updated_at: Local::now().fixed_offset(),
        name: name.to_owned(),
        email: format!("{}@example.com", name.to_lowercase()),
        department: "Finance".to_owned(),
        position: "Analyst".to_owned(),
        hire_date: NaiveDate::from_ymd_opt(2023, 1, 9).unwrap(),
        base_salary,
        is_active,
    }
}

pub(crate) async fn insert_employee(
    db: &impl ConnectionTrait,
    name: &str,
    base_salary: Option<Decimal>,
    is_active: bool,
) -> employee::Model {
    let model = employee_model(name, base_salary, is_active);

    Employee::insert(model.clone().into_active_model())
        .exec_without_returning(db).await
        .expect("Unable to insert employee");

    model
}

pub(crate) async fn insert_user(db: &impl ConnectionTrait, email: &str, is_active: bool) -> user::Model {
    let model = user::Model {
        id: Uuid::new_v4(),
        created_at: Local::now().fixed_offset(),
        updated_at: Local::now().fixed_offset(),
        email: email.to_owned(),
        password: Vec::new(),
        full_name: None,
        is_active,
        is_superuser: false,
    };

    User::insert(model.clone().into_active_model())
        .exec_without_returning(db).await
        .expect("Unable to insert user");

    model
}
