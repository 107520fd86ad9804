use std::fmt;

use actix_web::{body, http::{header::ContentType, StatusCode}, HttpResponse};
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::entity::sea_orm_active_enums::PayrollStatus;

/// Lifecycle operation that was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Process,
    MarkPaid,
    Delete,
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LifecycleAction::Process => "process",
            LifecycleAction::MarkPaid => "mark as paid",
            LifecycleAction::Delete => "delete",
        })
    }
}

#[derive(Debug, Error)]
pub enum PayrollError {
    #[error("payroll already exists for employee {employee_id} in period {period}")]
    Duplicate { employee_id: Uuid, period: String },

    #[error("payroll {0} not found")]
    NotFound(Uuid),

    #[error("employee {0} not found")]
    EmployeeNotFound(Uuid),

    #[error("employee {0} is inactive")]
    EmployeeInactive(Uuid),

    #[error("cannot {action} a payroll in {status} status")]
    InvalidTransition { status: PayrollStatus, action: LifecycleAction },

    #[error("invalid period `{0}`, expected YYYY-MM")]
    InvalidPeriod(String),

    #[error("invalid item {index}: {reason}")]
    InvalidItem { index: usize, reason: &'static str },

    #[error("database error")]
    Database(#[from] DbErr),
}

impl actix_web::error::ResponseError for PayrollError {
    fn error_response(&self) -> HttpResponse<body::BoxBody> {
        if let PayrollError::Database(err) = self {
            tracing::error!(error = %err, "payroll database failure");
        }

        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            PayrollError::Duplicate { .. } => StatusCode::CONFLICT,
            PayrollError::NotFound(_) | PayrollError::EmployeeNotFound(_) => StatusCode::NOT_FOUND,
            PayrollError::InvalidTransition { .. }
            | PayrollError::InvalidPeriod(_)
            | PayrollError::InvalidItem { .. }
            | PayrollError::EmployeeInactive(_) => StatusCode::BAD_REQUEST,
            PayrollError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
