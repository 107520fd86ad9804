use sea_orm_migration::prelude::*;

use crate::util::{default_table_statement, id_only_table_statement, money, DefaultColumn};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(default_table_statement()
                .table(User::Table)
                .col(ColumnDef::new(User::Email)
                    .string()
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(User::Password)
                    .binary()
                    .not_null()) // SHA-256 of `password:email`
                .col(ColumnDef::new(User::FullName)
                    .string()
                    .null())
                .col(ColumnDef::new(User::IsActive)
                    .boolean()
                    .not_null()
                    .default(true))
                .col(ColumnDef::new(User::IsSuperuser)
                    .boolean()
                    .not_null()
                    .default(false))
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(Employee::Table)
                .col(ColumnDef::new(Employee::Name)
                    .string()
                    .not_null())
                .col(ColumnDef::new(Employee::Email)
                    .string()
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(Employee::Department)
                    .string()
                    .not_null())
                .col(ColumnDef::new(Employee::Position)
                    .string()
                    .not_null())
                .col(ColumnDef::new(Employee::HireDate)
                    .date()
                    .not_null())
                .col(ColumnDef::new(Employee::BaseSalary)
                    .decimal_len(14, 2)
                    .null())
                .col(ColumnDef::new(Employee::IsActive)
                    .boolean()
                    .not_null()
                    .default(true))
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(FinancialRecord::Table)
                .col(ColumnDef::new(FinancialRecord::RecordType)
                    .string_len(16)
                    .not_null())
                .col(ColumnDef::new(FinancialRecord::Category)
                    .string()
                    .not_null())
                .col(money(FinancialRecord::Amount))
                .col(ColumnDef::new(FinancialRecord::Currency)
                    .string_len(3)
                    .not_null())
                .col(ColumnDef::new(FinancialRecord::Date)
                    .timestamp_with_time_zone()
                    .not_null())
                .col(ColumnDef::new(FinancialRecord::Description)
                    .text()
                    .null())
                .col(ColumnDef::new(FinancialRecord::EmployeeId)
                    .uuid()
                    .null())
                .foreign_key(ForeignKey::create()
                    .name("fk_financial_record_employee")
                    .from(FinancialRecord::Table, FinancialRecord::EmployeeId)
                    .to(Employee::Table, DefaultColumn::Id)
                    .on_delete(ForeignKeyAction::SetNull))
                .take()
            ).await?;

        manager
            .create_index(Index::create()
                .name("idx_financial_record_employee_category_date")
                .table(FinancialRecord::Table)
                .col(FinancialRecord::EmployeeId)
                .col(FinancialRecord::Category)
                .col(FinancialRecord::Date)
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(Payroll::Table)
                .col(ColumnDef::new(Payroll::EmployeeId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Payroll::Period)
                    .string_len(7)
                    .not_null()) // YYYY-MM
                .col(money(Payroll::GrossSalary))
                .col(money(Payroll::NetSalary))
                .col(money(Payroll::TotalDeductions))
                .col(ColumnDef::new(Payroll::Status)
                    .string_len(16)
                    .not_null()
                    .default("DRAFT"))
                .foreign_key(ForeignKey::create()
                    .name("fk_payroll_employee")
                    .from(Payroll::Table, Payroll::EmployeeId)
                    .to(Employee::Table, DefaultColumn::Id)
                    .on_delete(ForeignKeyAction::Restrict))
                .take()
            ).await?;

        // One payroll per employee and period. Generation relies on this index
        // instead of checking beforehand.
        manager
            .create_index(Index::create()
                .name("uq_payroll_employee_period")
                .table(Payroll::Table)
                .col(Payroll::EmployeeId)
                .col(Payroll::Period)
                .unique()
                .take()
            ).await?;

        manager
            .create_index(Index::create()
                .name("idx_payroll_period")
                .table(Payroll::Table)
                .col(Payroll::Period)
                .take()
            ).await?;

        manager
            .create_table(id_only_table_statement()
                .table(PayrollItem::Table)
                .col(ColumnDef::new(PayrollItem::PayrollId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(PayrollItem::Position)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(PayrollItem::ItemType)
                    .string_len(16)
                    .not_null())
                .col(ColumnDef::new(PayrollItem::Description)
                    .string()
                    .not_null())
                .col(money(PayrollItem::Amount))
                .foreign_key(ForeignKey::create()
                    .name("fk_payroll_item_payroll")
                    .from(PayrollItem::Table, PayrollItem::PayrollId)
                    .to(Payroll::Table, DefaultColumn::Id)
                    .on_delete(ForeignKeyAction::Cascade))
                .take()
            ).await?;

        manager
            .create_table(id_only_table_statement()
                .table(AuditLog::Table)
                .col(ColumnDef::new(DefaultColumn::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null())
                .col(ColumnDef::new(AuditLog::EntityType)
                    .string()
                    .not_null())
                .col(ColumnDef::new(AuditLog::EntityId)
                    .string()
                    .not_null())
                .col(ColumnDef::new(AuditLog::Action)
                    .string_len(16)
                    .not_null())
                .col(ColumnDef::new(AuditLog::Changes)
                    .json()
                    .null())
                .col(ColumnDef::new(AuditLog::PerformedBy)
                    .string()
                    .not_null()
                    .default("system"))
                .col(ColumnDef::new(AuditLog::Description)
                    .text()
                    .null())
                .take()
            ).await?;

        manager
            .create_index(Index::create()
                .name("idx_audit_log_entity")
                .table(AuditLog::Table)
                .col(AuditLog::EntityType)
                .col(AuditLog::EntityId)
                .take()
            ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            AuditLog::Table.into_iden(),
            PayrollItem::Table.into_iden(),
            Payroll::Table.into_iden(),
            FinancialRecord::Table.into_iden(),
            Employee::Table.into_iden(),
            User::Table.into_iden(),
        ] {
            manager
                .drop_table(TableDropStatement::new()
                    .table(table)
                    .if_exists()
                    .take()
                ).await?;
        }

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum User {
    Table,
    Email,
    Password,
    FullName,
    IsActive,
    IsSuperuser,
}

#[derive(DeriveIden)]
enum Employee {
    Table,
    Name,
    Email,
    Department,
    Position,
    HireDate,
    BaseSalary,
    IsActive,
}

#[derive(DeriveIden)]
enum FinancialRecord {
    Table,
    RecordType,
    Category,
    Amount,
    Currency,
    Date,
    Description,
    EmployeeId,
}

#[derive(DeriveIden)]
enum Payroll {
    Table,
    EmployeeId,
    Period,
    GrossSalary,
    NetSalary,
    TotalDeductions,
    Status,
}

#[derive(DeriveIden)]
enum PayrollItem {
    Table,
    PayrollId,
    Position,
    ItemType,
    Description,
    Amount,
}

#[derive(DeriveIden)]
enum AuditLog {
    Table,
    EntityType,
    EntityId,
    Action,
    Changes,
    PerformedBy,
    Description,
}
