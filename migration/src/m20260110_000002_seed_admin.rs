use sea_orm_migration::{prelude::*, sea_orm::prelude::Uuid};
use sha2::Digest as _;

use crate::m20260110_000001_init::User;

const ADMIN_EMAIL: &str = "admin@payroll.local";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Default credentials are `admin@payroll.local` / `admin`, rotate after the first login
        let hashed_password = sha2::Sha256::digest(format!("admin:{ADMIN_EMAIL}")).to_vec();

        manager
            .exec_stmt(Query::insert()
                .into_table(User::Table)
                .columns(["id", "created_at", "updated_at", "email", "password", "full_name", "is_active", "is_superuser"])
                .values_panic([
                    Uuid::from_u128(12345).into(),
                    Expr::current_timestamp().into(),
                    Expr::current_timestamp().into(),
                    ADMIN_EMAIL.into(),
                    hashed_password.into(),
                    "Administrator".into(),
                    true.into(),
                    true.into(),
                ])
                .to_owned()
            ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(Query::delete()
                .from_table(User::Table)
                .and_where(Expr::col(User::Email).eq(ADMIN_EMAIL))
                .to_owned()
            ).await?;

        Ok(())
    }
}
