use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    assembler::{assemble, validate_items, LineItem},
    lifecycle::{self, PayrollWithItems},
    period::validate_period,
    PayrollError, PayrollPolicy,
};
use crate::entity::{employee, payroll, prelude::*};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub employee_id: Uuid,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub succeeded: Vec<payroll::Model>,
    pub failed: Vec<BatchFailure>,
}

/// Generates a payroll for every active employee, or only for
/// `employee_ids` when that list is non-empty.
///
/// Employees are handled one by one, each in its own transaction. A failure
/// for one employee is recorded in [`BatchOutcome::failed`] and never undoes
/// or stops the others. Listed ids that are unknown or inactive are reported
/// there too.
pub async fn generate_for_period(
    db: &DatabaseConnection,
    policy: &PayrollPolicy,
    period: &str,
    employee_ids: Option<&[Uuid]>,
) -> Result<BatchOutcome, PayrollError> {
    validate_period(period)?;

    let employee_ids = employee_ids.filter(|ids| !ids.is_empty());

    let query = match employee_ids {
        Some(ids) => Employee::find().filter(employee::Column::Id.is_in(ids.iter().copied())),
        None => Employee::find().filter(employee::Column::IsActive.eq(true)),
    };

    let employees = query
        .order_by_asc(employee::Column::Name)
        .all(db).await?;

    let mut outcome = BatchOutcome::default();

    for &employee_id in employee_ids.unwrap_or_default() {
        let known = employees.iter().any(|e| e.id == employee_id);
        let reported = outcome.failed.iter().any(|f| f.employee_id == employee_id);

        if !known && !reported {
            skip(&mut outcome, period, PayrollError::EmployeeNotFound(employee_id), employee_id);
        }
    }

    for employee in employees {
        if !employee.is_active {
            skip(&mut outcome, period, PayrollError::EmployeeInactive(employee.id), employee.id);
            continue;
        }

        match generate(db, policy, &employee, period, Vec::new()).await {
            Ok(generated) => outcome.succeeded.push(generated.payroll),
            Err(err) => {
                warn!(employee_id = %employee.id, period, error = %err, "payroll generation failed for employee");

                outcome.failed.push(BatchFailure {
                    employee_id: employee.id,
                    error: err.to_string(),
                });
            },
        }
    }

    info!(period, succeeded = outcome.succeeded.len(), failed = outcome.failed.len(), "batch payroll generation finished");

    Ok(outcome)
}

fn skip(outcome: &mut BatchOutcome, period: &str, reason: PayrollError, employee_id: Uuid) {
    debug!(%employee_id, period, %reason, "skipping listed employee");

    outcome.failed.push(BatchFailure {
        employee_id,
        error: reason.to_string(),
    });
}

/// Generates one employee's payroll with optional bonuses, allowances or
/// deductions on top of the resolved base salary.
pub async fn generate_for_employee(
    db: &DatabaseConnection,
    policy: &PayrollPolicy,
    employee_id: Uuid,
    period: &str,
    supplemental: Vec<LineItem>,
) -> Result<PayrollWithItems, PayrollError> {
    validate_period(period)?;
    validate_items(&supplemental)?;

    let employee = Employee::find_by_id(employee_id)
        .one(db).await?
        .ok_or(PayrollError::EmployeeNotFound(employee_id))?;

    generate(db, policy, &employee, period, supplemental).await
}

async fn generate(
    db: &DatabaseConnection,
    policy: &PayrollPolicy,
    employee: &employee::Model,
    period: &str,
    supplemental: Vec<LineItem>,
) -> Result<PayrollWithItems, PayrollError> {
    let base_salary = policy.salary.resolve(db, employee).await?;
    let assembly = assemble(base_salary, supplemental, &policy.tax);

    lifecycle::create(db, employee.id, period, assembly).await
}
