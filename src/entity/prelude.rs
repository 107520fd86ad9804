pub use super::audit_log::Entity as AuditLog;
pub use super::employee::Entity as Employee;
pub use super::financial_record::Entity as FinancialRecord;
pub use super::payroll::Entity as Payroll;
pub use super::payroll_item::Entity as PayrollItem;
pub use super::user::Entity as User;
