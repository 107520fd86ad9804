pub mod prelude;

pub mod audit_log;
pub mod employee;
pub mod financial_record;
pub mod payroll;
pub mod payroll_item;
pub mod sea_orm_active_enums;
pub mod user;
