//! Payroll generation and lifecycle.
//!
//! Generation resolves a base salary, assembles the line items (earnings
//! first, then income tax and social security) and persists the result as a
//! DRAFT payroll. From there a payroll only moves forward: DRAFT, PROCESSED,
//! PAID. Only drafts can be deleted.

pub mod assembler;
pub mod batch;
pub mod error;
pub mod lifecycle;
pub mod period;
pub mod salary;
pub mod tax;

pub use error::PayrollError;

use salary::SalaryResolver;
use tax::TaxTable;

/// Everything generation needs besides the database: the tax table and the
/// order in which a base salary is looked up.
#[derive(Debug, Clone, Default)]
pub struct PayrollPolicy {
    pub tax: TaxTable,
    pub salary: SalaryResolver,
}

impl PayrollPolicy {
    pub fn new(tax: TaxTable) -> Self {
        Self {
            tax,
            salary: SalaryResolver::default(),
        }
    }
}
