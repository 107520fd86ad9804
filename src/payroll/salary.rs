use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use tracing::debug;

use crate::{
    consts::SALARY_CATEGORY,
    entity::{employee, financial_record, prelude::*},
};

/// Where a base salary can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalarySource {
    /// `employee.base_salary`
    EmployeeField,
    /// Amount of the employee's most recent `SALARY` financial record
    LatestSalaryRecord,
}

impl SalarySource {
    async fn lookup<C: ConnectionTrait>(self, db: &C, employee: &employee::Model) -> Result<Option<Decimal>, DbErr> {
        match self {
            SalarySource::EmployeeField => Ok(employee.base_salary),
            SalarySource::LatestSalaryRecord => {
                let record = FinancialRecord::find()
                    .filter(financial_record::Column::EmployeeId.eq(employee.id))
                    .filter(financial_record::Column::Category.eq(SALARY_CATEGORY))
                    .order_by_desc(financial_record::Column::Date)
                    .one(db).await?;

                Ok(record.map(|r| r.amount))
            },
        }
    }
}

/// Ordered fallback chain for the base salary. The first source yielding a
/// positive amount wins; when none does the base salary is zero and
/// generation carries on with whatever supplemental items it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryResolver {
    chain: Vec<SalarySource>,
}

impl SalaryResolver {
    pub fn new(chain: impl Into<Vec<SalarySource>>) -> Self {
        Self { chain: chain.into() }
    }

    pub async fn resolve<C: ConnectionTrait>(&self, db: &C, employee: &employee::Model) -> Result<Decimal, DbErr> {
        for source in &self.chain {
            if let Some(amount) = source.lookup(db, employee).await? {
                if amount > Decimal::ZERO {
                    debug!(employee_id = %employee.id, ?source, %amount, "resolved base salary");
                    return Ok(amount);
                }
            }
        }

        debug!(employee_id = %employee.id, "no salary basis found, using zero");

        Ok(Decimal::ZERO)
    }
}

impl Default for SalaryResolver {
    fn default() -> Self {
        Self::new([SalarySource::EmployeeField, SalarySource::LatestSalaryRecord])
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Local};
    use rust_decimal_macros::dec;
    use sea_orm::{ActiveValue::Set, DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use crate::{entity::sea_orm_active_enums::FinancialRecordType, test_support};

    use super::*;

    async fn insert_salary_record(db: &impl ConnectionTrait, employee_id: Uuid, amount: Decimal, days_ago: i64) {
        FinancialRecord::insert(financial_record::ActiveModel {
            id: Set(Uuid::new_v4()),
            created_at: Set(Local::now().fixed_offset()),
            updated_at: Set(Local::now().fixed_offset()),
            record_type: Set(FinancialRecordType::Expense),
            category: Set(SALARY_CATEGORY.to_owned()),
            amount: Set(amount),
            currency: Set("MZN".to_owned()),
            date: Set((Local::now() - Duration::days(days_ago)).fixed_offset()),
            description: Set(None),
            employee_id: Set(Some(employee_id)),
        }).exec_without_returning(db).await.unwrap();
    }

    #[actix_web::test]
    async fn test_prefers_employee_field() {
        let db = test_support::database().await;
        let employee = test_support::insert_employee(&db, "Alice", Some(dec!(80000)), true).await;
        insert_salary_record(&db, employee.id, dec!(50000), 1).await;

        let salary = SalaryResolver::default().resolve(&db, &employee).await.unwrap();
        assert_eq!(salary, dec!(80000));
    }

    #[actix_web::test]
    async fn test_falls_back_to_latest_salary_record() {
        let db = test_support::database().await;
        let employee = test_support::insert_employee(&db, "Bob", Some(Decimal::ZERO), true).await;
        insert_salary_record(&db, employee.id, dec!(45000), 40).await;
        insert_salary_record(&db, employee.id, dec!(47000), 10).await;

        let salary = SalaryResolver::default().resolve(&db, &employee).await.unwrap();
        assert_eq!(salary, dec!(47000));
    }

    #[actix_web::test]
    async fn test_zero_without_any_basis() {
        let db = test_support::database().await;
        let employee = test_support::insert_employee(&db, "Carol", None, true).await;

        let salary = SalaryResolver::default().resolve(&db, &employee).await.unwrap();
        assert_eq!(salary, Decimal::ZERO);
    }

    #[actix_web::test]
    async fn test_custom_chain_skips_employee_field() {
        let db = test_support::database().await;
        let employee = test_support::insert_employee(&db, "Dave", Some(dec!(80000)), true).await;
        insert_salary_record(&db, employee.id, dec!(61000), 3).await;

        let salary = SalaryResolver::new([SalarySource::LatestSalaryRecord]).resolve(&db, &employee).await.unwrap();
        assert_eq!(salary, dec!(61000));
    }

    #[actix_web::test]
    async fn test_employee_field_does_not_query() {
        // An empty mock would fail any query issued against it
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let employee = test_support::employee_model("Eve", Some(dec!(30000)), true);

        let salary = SalaryResolver::default().resolve(&db, &employee).await.unwrap();
        assert_eq!(salary, dec!(30000));
        assert!(db.into_transaction_log().is_empty());
    }
}
