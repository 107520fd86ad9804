use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    tax::{flat_contribution, progressive_tax, TaxTable},
    PayrollError,
};
use crate::{
    consts::{BASE_SALARY_DESCRIPTION, INCOME_TAX_DESCRIPTION, SOCIAL_SECURITY_DESCRIPTION},
    entity::sea_orm_active_enums::PayrollItemType,
};

/// A payroll line before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "type")]
    pub item_type: PayrollItemType,
    pub description: String,
    pub amount: Decimal,
}

impl LineItem {
    pub fn new(item_type: PayrollItemType, description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            item_type,
            description: description.into(),
            amount,
        }
    }
}

/// Checks caller supplied items before they are assembled: whole cents only,
/// earnings strictly positive, deductions and taxes strictly negative.
pub fn validate_items(items: &[LineItem]) -> Result<(), PayrollError> {
    for (index, item) in items.iter().enumerate() {
        let reason = if item.amount.scale() > 2 {
            Some("amount must not have more than 2 decimal places")
        } else if item.item_type.is_earning() && item.amount <= Decimal::ZERO {
            Some("earnings must be positive")
        } else if !item.item_type.is_earning() && item.amount >= Decimal::ZERO {
            Some("deductions must be negative")
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(PayrollError::InvalidItem { index, reason });
        }
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub items: Vec<LineItem>,
    pub gross_salary: Decimal,
    pub total_deductions: Decimal,
    pub net_salary: Decimal,
}

/// Builds the line items of one payroll: base salary, supplemental items in
/// the order given, then income tax and social security.
///
/// Only earning-class items count towards gross. Supplemental deductions are
/// kept as given and their magnitude is added to the total deductions next to
/// the computed withholdings, so that `net = gross - total_deductions` holds
/// over every deduction-class line.
pub fn assemble(base_salary: Decimal, supplemental: Vec<LineItem>, table: &TaxTable) -> Assembly {
    let mut items = Vec::with_capacity(supplemental.len() + 3);
    let mut gross_salary = Decimal::ZERO;
    let mut supplemental_deductions = Decimal::ZERO;

    if base_salary > Decimal::ZERO {
        items.push(LineItem::new(PayrollItemType::Salary, BASE_SALARY_DESCRIPTION, base_salary));
        gross_salary += base_salary;
    }

    for item in supplemental {
        if item.item_type.is_earning() {
            gross_salary += item.amount;
        } else {
            supplemental_deductions += item.amount.abs();
        }

        items.push(item);
    }

    // Never tax below zero
    let taxable = gross_salary.max(Decimal::ZERO);

    let income_tax = progressive_tax(taxable, &table.brackets);
    if income_tax > Decimal::ZERO {
        items.push(LineItem::new(PayrollItemType::Tax, INCOME_TAX_DESCRIPTION, -income_tax));
    }

    let contribution = flat_contribution(taxable, table.contribution_rate);
    if contribution > Decimal::ZERO {
        items.push(LineItem::new(PayrollItemType::Deduction, SOCIAL_SECURITY_DESCRIPTION, -contribution));
    }

    let total_deductions = income_tax + contribution + supplemental_deductions;

    Assembly {
        items,
        gross_salary,
        total_deductions,
        net_salary: gross_salary - total_deductions,
    }
}
