use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PayrollItemType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payroll_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub payroll_id: Uuid,
    pub position: i32,
    pub item_type: PayrollItemType,
    pub description: String,
    /// Earnings are positive, deductions and taxes negative
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub amount: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payroll::Entity",
        from = "Column::PayrollId",
        to = "super::payroll::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Payroll,
}

impl Related<super::payroll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payroll.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
