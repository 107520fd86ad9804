use std::str::FromStr;

use actix_web::{delete, dev, get, post, web, FromRequest, HttpRequest, HttpResponse, Responder};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    audit::{self, AuditEntry},
    consts::PAYROLL_ENTITY,
    entity::{payroll, sea_orm_active_enums::AuditAction, user},
    payroll::{
        batch,
        lifecycle::{self, PayrollFilter, PayrollWithItems, Transition},
        PayrollError, PayrollPolicy,
    },
};

use extractor::PayrollId;
use model::*;

mod extractor;
mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(generate_payroll)
        .service(generate_employee_payroll)
        .service(list_payrolls)
        .service(list_payrolls_by_period)
        .service(list_employee_payrolls)
        .service(get_payroll)
        .service(process_payroll)
        .service(pay_payroll)
        .service(delete_payroll);
}

async fn record_created(db: &DatabaseConnection, payroll: &payroll::Model, performed_by: &str) {
    let snapshot = serde_json::to_value(payroll).unwrap_or_default();

    audit::record(db, AuditEntry {
        entity_type: PAYROLL_ENTITY,
        entity_id: payroll.id.to_string(),
        action: AuditAction::Create,
        changes: Some(Value::Object(audit::diff(&Value::Null, &snapshot))),
        performed_by,
        description: Some(format!("Payroll generated for period {}", payroll.period)),
    }).await;
}

async fn record_transition(db: &DatabaseConnection, transition: &Transition, performed_by: &str, description: &str) {
    // Re-processing is a no-op and leaves no trace
    if !transition.changed() {
        return;
    }

    let changes = audit::diff(
        &json!({ "status": transition.previous }),
        &json!({ "status": transition.payroll.status }),
    );

    audit::record(db, AuditEntry {
        entity_type: PAYROLL_ENTITY,
        entity_id: transition.payroll.id.to_string(),
        action: AuditAction::Update,
        changes: Some(Value::Object(changes)),
        performed_by,
        description: Some(description.to_owned()),
    }).await;
}

#[post("/generate")]
async fn generate_payroll(
    db: web::Data<DatabaseConnection>,
    policy: web::Data<PayrollPolicy>,
    user: user::Model,
    payload: web::Json<GeneratePayroll>,
) -> Result<impl Responder, PayrollError> {
    let outcome = batch::generate_for_period(
        db.get_ref(),
        policy.get_ref(),
        &payload.period,
        payload.employee_ids.as_deref(),
    ).await?;

    for payroll in &outcome.succeeded {
        record_created(db.get_ref(), payroll, &user.email).await;
    }

    Ok(web::Json(outcome))
}

#[post("/generate/{employee_id}/{period}")]
async fn generate_employee_payroll(
    db: web::Data<DatabaseConnection>,
    policy: web::Data<PayrollPolicy>,
    user: user::Model,
    path: web::Path<(Uuid, String)>,
    payload: Option<web::Json<GenerateEmployeePayroll>>,
) -> Result<impl Responder, PayrollError> {
    let (employee_id, period) = path.into_inner();
    let supplemental = payload.map(|p| p.into_inner().items).unwrap_or_default();

    let generated = batch::generate_for_employee(db.get_ref(), policy.get_ref(), employee_id, &period, supplemental).await?;

    record_created(db.get_ref(), &generated.payroll, &user.email).await;

    Ok(HttpResponse::Created().json(generated))
}

#[get("")]
async fn list_payrolls(db: web::Data<DatabaseConnection>, _user: user::Model, query: web::Query<Pagination>) -> Result<impl Responder, PayrollError> {
    let payrolls = lifecycle::list(db.get_ref(), PayrollFilter::All, query.page()).await?;

    Ok(web::Json(payrolls))
}

#[get("/period/{period}")]
async fn list_payrolls_by_period(
    db: web::Data<DatabaseConnection>,
    _user: user::Model,
    period: web::Path<String>,
    query: web::Query<Pagination>,
) -> Result<impl Responder, PayrollError> {
    let payrolls = lifecycle::list(db.get_ref(), PayrollFilter::Period(period.into_inner()), query.page()).await?;

    Ok(web::Json(payrolls))
}

#[get("/employee/{employee_id}")]
async fn list_employee_payrolls(
    db: web::Data<DatabaseConnection>,
    _user: user::Model,
    employee_id: web::Path<Uuid>,
    query: web::Query<Pagination>,
) -> Result<impl Responder, PayrollError> {
    let payrolls = lifecycle::list(db.get_ref(), PayrollFilter::Employee(employee_id.into_inner()), query.page()).await?;

    Ok(web::Json(payrolls))
}

#[get("/{payroll_id}")]
async fn get_payroll(_user: user::Model, payroll: PayrollWithItems) -> impl Responder {
    web::Json(payroll)
}

#[post("/{payroll_id}/process")]
async fn process_payroll(db: web::Data<DatabaseConnection>, user: user::Model, payroll_id: PayrollId) -> Result<impl Responder, PayrollError> {
    let transition = lifecycle::process(db.get_ref(), *payroll_id).await?;

    record_transition(db.get_ref(), &transition, &user.email, "Payroll processed").await;

    Ok(web::Json(transition.payroll))
}

#[post("/{payroll_id}/pay")]
async fn pay_payroll(db: web::Data<DatabaseConnection>, user: user::Model, payroll_id: PayrollId) -> Result<impl Responder, PayrollError> {
    let transition = lifecycle::mark_paid(db.get_ref(), *payroll_id).await?;

    record_transition(db.get_ref(), &transition, &user.email, "Payroll marked as paid").await;

    Ok(web::Json(transition.payroll))
}

#[delete("/{payroll_id}")]
async fn delete_payroll(db: web::Data<DatabaseConnection>, user: user::Model, payroll_id: PayrollId) -> Result<impl Responder, PayrollError> {
    let payroll = lifecycle::delete(db.get_ref(), *payroll_id).await?;

    let snapshot = serde_json::to_value(&payroll).unwrap_or_default();

    audit::record(db.get_ref(), AuditEntry {
        entity_type: PAYROLL_ENTITY,
        entity_id: payroll.id.to_string(),
        action: AuditAction::Delete,
        changes: Some(Value::Object(audit::diff(&snapshot, &Value::Null))),
        performed_by: &user.email,
        description: Some(format!("Payroll for period {} deleted", payroll.period)),
    }).await;

    Ok(web::Json(payroll))
}
