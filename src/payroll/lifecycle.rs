use chrono::Local;
use sea_orm::{
    sea_query::Expr, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::{assembler::Assembly, error::LifecycleAction, PayrollError};
use crate::entity::{payroll, payroll_item, prelude::*, sea_orm_active_enums::PayrollStatus};

/// Payroll header together with its line items, in generation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollWithItems {
    #[serde(flatten)]
    pub payroll: payroll::Model,
    pub items: Vec<payroll_item::Model>,
}

/// Result of a status change. `previous` equals the current status when the
/// call changed nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub payroll: payroll::Model,
    pub previous: PayrollStatus,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.previous != self.payroll.status
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayrollFilter {
    All,
    Period(String),
    Employee(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u64,
    pub limit: u64,
}

/// Persists a freshly assembled payroll as a DRAFT, header and items in one
/// transaction.
///
/// Uniqueness of (employee, period) is left to the database index; a
/// violation surfaces as [`PayrollError::Duplicate`] and nothing is written.
pub async fn create(
    db: &DatabaseConnection,
    employee_id: Uuid,
    period: &str,
    assembly: Assembly,
) -> Result<PayrollWithItems, PayrollError> {
    let now = Local::now().fixed_offset();

    let payroll = payroll::Model {
        id: Uuid::new_v4(),
        created_at: now,
        updated_at: now,
        employee_id,
        period: period.to_owned(),
        gross_salary: assembly.gross_salary,
        net_salary: assembly.net_salary,
        total_deductions: assembly.total_deductions,
        status: PayrollStatus::Draft,
    };

    let items = assembly.items.into_iter()
        .enumerate()
        .map(|(position, item)| payroll_item::Model {
            id: Uuid::new_v4(),
            payroll_id: payroll.id,
            position: position as i32,
            item_type: item.item_type,
            description: item.description,
            amount: item.amount,
        })
        .collect::<Vec<_>>();

    let txn = db.begin().await?;

    Payroll::insert(payroll::ActiveModel {
        id: Set(payroll.id),
        created_at: Set(payroll.created_at),
        updated_at: Set(payroll.updated_at),
        employee_id: Set(payroll.employee_id),
        period: Set(payroll.period.clone()),
        gross_salary: Set(payroll.gross_salary),
        net_salary: Set(payroll.net_salary),
        total_deductions: Set(payroll.total_deductions),
        status: Set(payroll.status),
    })
        .exec_without_returning(&txn).await
        .map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => PayrollError::Duplicate {
                employee_id,
                period: period.to_owned(),
            },
            _ => PayrollError::Database(err),
        })?;

    if !items.is_empty() {
        PayrollItem::insert_many(items.iter().map(|item| payroll_item::ActiveModel {
            id: Set(item.id),
            payroll_id: Set(item.payroll_id),
            position: Set(item.position),
            item_type: Set(item.item_type),
            description: Set(item.description.clone()),
            amount: Set(item.amount),
        }))
            .exec_without_returning(&txn).await?;
    }

    txn.commit().await?;

    info!(payroll_id = %payroll.id, %employee_id, period, gross = %payroll.gross_salary, net = %payroll.net_salary, "payroll created");

    Ok(PayrollWithItems { payroll, items })
}

/// DRAFT to PROCESSED. Processing an already processed payroll returns it
/// untouched.
pub async fn process(db: &DatabaseConnection, payroll_id: Uuid) -> Result<Transition, PayrollError> {
    let transition = advance(db, payroll_id, PayrollStatus::Draft, PayrollStatus::Processed, LifecycleAction::Process).await;

    match transition {
        Err(PayrollError::InvalidTransition { status: PayrollStatus::Processed, .. }) => {
            debug!(%payroll_id, "payroll already processed");

            let payroll = find(db, payroll_id).await?;
            Ok(Transition { previous: payroll.status, payroll })
        },
        other => other,
    }
}

/// PROCESSED to PAID.
pub async fn mark_paid(db: &DatabaseConnection, payroll_id: Uuid) -> Result<Transition, PayrollError> {
    advance(db, payroll_id, PayrollStatus::Processed, PayrollStatus::Paid, LifecycleAction::MarkPaid).await
}

/// Removes a DRAFT payroll; its items go with it through the cascading
/// foreign key.
pub async fn delete(db: &DatabaseConnection, payroll_id: Uuid) -> Result<payroll::Model, PayrollError> {
    let txn = db.begin().await?;

    let payroll = Payroll::find_by_id(payroll_id)
        .one(&txn).await?
        .ok_or(PayrollError::NotFound(payroll_id))?;

    let res = Payroll::delete_many()
        .filter(payroll::Column::Id.eq(payroll_id))
        .filter(payroll::Column::Status.eq(PayrollStatus::Draft))
        .exec(&txn).await?;

    if res.rows_affected == 0 {
        return Err(PayrollError::InvalidTransition {
            status: payroll.status,
            action: LifecycleAction::Delete,
        });
    }

    txn.commit().await?;

    info!(%payroll_id, "payroll deleted");

    Ok(payroll)
}

pub async fn get(db: &DatabaseConnection, payroll_id: Uuid) -> Result<PayrollWithItems, PayrollError> {
    let payroll = find(db, payroll_id).await?;

    let items = PayrollItem::find()
        .filter(payroll_item::Column::PayrollId.eq(payroll_id))
        .order_by_asc(payroll_item::Column::Position)
        .all(db).await?;

    Ok(PayrollWithItems { payroll, items })
}

/// Payroll headers, newest period first.
pub async fn list(db: &DatabaseConnection, filter: PayrollFilter, page: Page) -> Result<Vec<payroll::Model>, PayrollError> {
    let query = match filter {
        PayrollFilter::All => Payroll::find(),
        PayrollFilter::Period(period) => Payroll::find().filter(payroll::Column::Period.eq(period)),
        PayrollFilter::Employee(employee_id) => Payroll::find().filter(payroll::Column::EmployeeId.eq(employee_id)),
    };

    let payrolls = query
        .order_by_desc(payroll::Column::Period)
        .order_by_asc(payroll::Column::CreatedAt)
        .offset(page.skip)
        .limit(page.limit)
        .all(db).await?;

    Ok(payrolls)
}

async fn find(db: &DatabaseConnection, payroll_id: Uuid) -> Result<payroll::Model, PayrollError> {
    Payroll::find_by_id(payroll_id)
        .one(db).await?
        .ok_or(PayrollError::NotFound(payroll_id))
}

/// Moves a payroll from `from` to `to` with a single conditional update, so
/// two concurrent requests can never both act on the same status.
async fn advance(
    db: &DatabaseConnection,
    payroll_id: Uuid,
    from: PayrollStatus,
    to: PayrollStatus,
    action: LifecycleAction,
) -> Result<Transition, PayrollError> {
    let txn = db.begin().await?;

    let res = Payroll::update_many()
        .col_expr(payroll::Column::Status, Expr::value(to))
        .col_expr(payroll::Column::UpdatedAt, Expr::value(Local::now().fixed_offset()))
        .filter(payroll::Column::Id.eq(payroll_id))
        .filter(payroll::Column::Status.eq(from))
        .exec(&txn).await?;

    let payroll = Payroll::find_by_id(payroll_id)
        .one(&txn).await?
        .ok_or(PayrollError::NotFound(payroll_id))?;

    if res.rows_affected == 0 {
        return Err(PayrollError::InvalidTransition {
            status: payroll.status,
            action,
        });
    }

    txn.commit().await?;

    info!(%payroll_id, %from, %to, "payroll status changed");

    Ok(Transition { payroll, previous: from })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sea_orm::{PaginatorTrait as _, TransactionTrait as _};

    use crate::{
        entity::sea_orm_active_enums::PayrollItemType,
        payroll::{assembler::assemble, tax::TaxTable},
        test_support,
    };

    use super::*;

    async fn draft(db: &DatabaseConnection, employee_id: Uuid, period: &str) -> PayrollWithItems {
        let assembly = assemble(dec!(100000), Vec::new(), &TaxTable::mozambique());

        create(db, employee_id, period, assembly).await.unwrap()
    }

    #[actix_web::test]
    async fn test_create_persists_header_and_items() {
        let db = test_support::database().await;
        let employee = test_support::insert_employee(&db, "Alice", None, true).await;

        let created = draft(&db, employee.id, "2024-10").await;

        assert_eq!(created.payroll.status, PayrollStatus::Draft);
        assert_eq!(created.payroll.gross_salary, dec!(100000));
        assert_eq!(created.payroll.total_deductions, dec!(8800.00));
        assert_eq!(created.payroll.net_salary, dec!(91200.00));

        let fetched = get(&db, created.payroll.id).await.unwrap();
        assert_eq!(fetched.payroll.id, created.payroll.id);
        assert_eq!(fetched.payroll.net_salary, dec!(91200));

        let lines = fetched.items.iter()
            .map(|i| (i.position, i.item_type, i.amount))
            .collect::<Vec<_>>();
        assert_eq!(lines, vec![
            (0, PayrollItemType::Salary, dec!(100000)),
            (1, PayrollItemType::Tax, dec!(-5800)),
            (2, PayrollItemType::Deduction, dec!(-3000)),
        ]);
    }

    #[actix_web::test]
    async fn test_create_twice_is_duplicate() {
        let db = test_support::database().await;
        let employee = test_support::insert_employee(&db, "Alice", None, true).await;

        draft(&db, employee.id, "2024-10").await;

        let assembly = assemble(dec!(100000), Vec::new(), &TaxTable::mozambique());
        let err = create(&db, employee.id, "2024-10", assembly).await.unwrap_err();
        assert!(matches!(err, PayrollError::Duplicate { employee_id, ref period } if employee_id == employee.id && period == "2024-10"));

        assert_eq!(Payroll::find().count(&db).await.unwrap(), 1);
        assert_eq!(PayrollItem::find().count(&db).await.unwrap(), 3);

        // Another period is fine
        draft(&db, employee.id, "2024-11").await;
        assert_eq!(Payroll::find().count(&db).await.unwrap(), 2);
    }

    #[actix_web::test]
    async fn test_create_without_items() {
        let db = test_support::database().await;
        let employee = test_support::insert_employee(&db, "Alice", None, true).await;

        let assembly = assemble(Decimal::ZERO, Vec::new(), &TaxTable::mozambique());
        let created = create(&db, employee.id, "2024-10", assembly).await.unwrap();

        assert!(created.items.is_empty());
        assert_eq!(created.payroll.net_salary, Decimal::ZERO);
        assert!(get(&db, created.payroll.id).await.unwrap().items.is_empty());
    }

    #[actix_web::test]
    async fn test_lifecycle_forward() {
        let db = test_support::database().await;
        let employee = test_support::insert_employee(&db, "Alice", None, true).await;
        let id = draft(&db, employee.id, "2024-10").await.payroll.id;

        let processed = process(&db, id).await.unwrap();
        assert_eq!(processed.previous, PayrollStatus::Draft);
        assert_eq!(processed.payroll.status, PayrollStatus::Processed);
        assert!(processed.changed());

        // Processing again is a no-op
        let again = process(&db, id).await.unwrap();
        assert_eq!(again.payroll.status, PayrollStatus::Processed);
        assert!(!again.changed());

        let paid = mark_paid(&db, id).await.unwrap();
        assert_eq!(paid.previous, PayrollStatus::Processed);
        assert_eq!(paid.payroll.status, PayrollStatus::Paid);
    }

    #[actix_web::test]
    async fn test_lifecycle_rejects_invalid_transitions() {
        let db = test_support::database().await;
        let employee = test_support::insert_employee(&db, "Alice", None, true).await;
        let id = draft(&db, employee.id, "2024-10").await.payroll.id;

        let err = mark_paid(&db, id).await.unwrap_err();
        assert!(matches!(err, PayrollError::InvalidTransition { status: PayrollStatus::Draft, action: LifecycleAction::MarkPaid }));

        process(&db, id).await.unwrap();

        let err = delete(&db, id).await.unwrap_err();
        assert!(matches!(err, PayrollError::InvalidTransition { status: PayrollStatus::Processed, action: LifecycleAction::Delete }));

        mark_paid(&db, id).await.unwrap();

        let err = delete(&db, id).await.unwrap_err();
        assert!(matches!(err, PayrollError::InvalidTransition { status: PayrollStatus::Paid, action: LifecycleAction::Delete }));

        let err = process(&db, id).await.unwrap_err();
        assert!(matches!(err, PayrollError::InvalidTransition { status: PayrollStatus::Paid, action: LifecycleAction::Process }));

        let err = mark_paid(&db, id).await.unwrap_err();
        assert!(matches!(err, PayrollError::InvalidTransition { status: PayrollStatus::Paid, action: LifecycleAction::MarkPaid }));

        // Nothing moved backwards
        assert_eq!(get(&db, id).await.unwrap().payroll.status, PayrollStatus::Paid);
    }

    #[actix_web::test]
    async fn test_unknown_payroll() {
        let db = test_support::database().await;
        let id = Uuid::new_v4();

        assert!(matches!(process(&db, id).await, Err(PayrollError::NotFound(missing)) if missing == id));
        assert!(matches!(mark_paid(&db, id).await, Err(PayrollError::NotFound(_))));
        assert!(matches!(delete(&db, id).await, Err(PayrollError::NotFound(_))));
        assert!(matches!(get(&db, id).await, Err(PayrollError::NotFound(_))));
    }

    #[actix_web::test]
    async fn test_delete_draft_cascades_items() {
        let db = test_support::database().await;
        let employee = test_support::insert_employee(&db, "Alice", None, true).await;
        let created = draft(&db, employee.id, "2024-10").await;

        let deleted = delete(&db, created.payroll.id).await.unwrap();
        assert_eq!(deleted.id, created.payroll.id);

        assert_eq!(Payroll::find().count(&db).await.unwrap(), 0);
        assert_eq!(PayrollItem::find().count(&db).await.unwrap(), 0);

        // The slot is free again
        draft(&db, employee.id, "2024-10").await;
    }

    #[actix_web::test]
    async fn test_list_filters() {
        let db = test_support::database().await;
        let alice = test_support::insert_employee(&db, "Alice", None, true).await;
        let bob = test_support::insert_employee(&db, "Bob", None, true).await;

        draft(&db, alice.id, "2024-09").await;
        draft(&db, alice.id, "2024-10").await;
        draft(&db, bob.id, "2024-10").await;

        let page = Page { skip: 0, limit: 100 };

        let all = list(&db, PayrollFilter::All, page).await.unwrap();
        let periods = all.iter().map(|p| p.period.as_str()).collect::<Vec<_>>();
        assert_eq!(periods, vec!["2024-10", "2024-10", "2024-09"]);

        let october = list(&db, PayrollFilter::Period("2024-10".to_owned()), page).await.unwrap();
        assert_eq!(october.len(), 2);

        let alices = list(&db, PayrollFilter::Employee(alice.id), page).await.unwrap();
        assert!(alices.iter().all(|p| p.employee_id == alice.id));
        assert_eq!(alices.len(), 2);

        let second_page = list(&db, PayrollFilter::All, Page { skip: 2, limit: 1 }).await.unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].period, "2024-09");
    }

    #[actix_web::test]
    async fn test_failed_create_leaves_no_items() {
        let db = test_support::database().await;
        let employee = test_support::insert_employee(&db, "Alice", None, true).await;
        draft(&db, employee.id, "2024-10").await;

        // Items of a rejected duplicate must not be left behind
        let supplemental = vec![crate::payroll::assembler::LineItem::new(PayrollItemType::Bonus, "Bonus", dec!(500))];
        let assembly = assemble(dec!(100000), supplemental, &TaxTable::mozambique());
        assert!(create(&db, employee.id, "2024-10", assembly).await.is_err());

        assert_eq!(PayrollItem::find().count(&db).await.unwrap(), 3);

        // The connection is usable again, nothing is left open
        let txn = db.begin().await.unwrap();
        txn.commit().await.unwrap();
    }
}
