use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    consts::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT},
    payroll::{assembler::LineItem, lifecycle::Page},
};

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct GeneratePayroll {
    pub(super) period: String,
    #[serde(default)]
    pub(super) employee_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct GenerateEmployeePayroll {
    #[serde(default)]
    pub(super) items: Vec<LineItem>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct Pagination {
    pub(super) skip: Option<u64>,
    pub(super) limit: Option<u64>,
}

impl Pagination {
    pub(super) fn page(&self) -> Page {
        Page {
            skip: self.skip.unwrap_or(0),
            limit: self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults_and_clamp() {
        assert_eq!(Pagination::default().page(), Page { skip: 0, limit: DEFAULT_PAGE_LIMIT });

        let page = Pagination { skip: Some(20), limit: Some(5000) }.page();
        assert_eq!(page, Page { skip: 20, limit: MAX_PAGE_LIMIT });
    }
}
