use chrono::NaiveDate;

use super::PayrollError;
use crate::consts::PERIOD_LEN;

/// Accepts only the canonical `YYYY-MM` form with a real month.
pub fn validate_period(period: &str) -> Result<(), PayrollError> {
    let well_formed = period.len() == PERIOD_LEN
        && period.bytes().enumerate().all(|(i, b)| if i == 4 { b == b'-' } else { b.is_ascii_digit() })
        && NaiveDate::parse_from_str(&format!("{period}-01"), "%Y-%m-%d").is_ok();

    if well_formed {
        Ok(())
    } else {
        Err(PayrollError::InvalidPeriod(period.to_owned()))
    }
}
