/// Canonical `YYYY-MM` pay period width
pub const PERIOD_LEN: usize = 7;

/// Financial record category used as the fallback salary basis
pub const SALARY_CATEGORY: &str = "SALARY";

pub const BASE_SALARY_DESCRIPTION: &str = "Base Salary";
pub const INCOME_TAX_DESCRIPTION: &str = "IRT (Income Tax)";
pub const SOCIAL_SECURITY_DESCRIPTION: &str = "INSS (Social Security)";

/// Audit log entity type for payroll rows
pub const PAYROLL_ENTITY: &str = "PAYROLL";

pub const DEFAULT_PAGE_LIMIT: u64 = 100;
pub const MAX_PAGE_LIMIT: u64 = 100;

pub const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 30;
