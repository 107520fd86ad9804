use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PayrollStatus;

/// Payroll header. Serialized on its own it is the summary projection; the
/// line items live in [`super::payroll_item`].
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payroll")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub employee_id: Uuid,
    pub period: String,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub gross_salary: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub net_salary: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_deductions: Decimal,
    pub status: PayrollStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Employee,
    #[sea_orm(has_many = "super::payroll_item::Entity")]
    PayrollItem,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::payroll_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayrollItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
