use std::ops::Deref;

use super::*;

/// `payroll_id` path segment parsed as a UUID.
pub(super) struct PayrollId(pub(super) Uuid);

impl Deref for PayrollId {
    type Target = Uuid;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for PayrollId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let payroll_id = req.match_info().get("payroll_id").expect("This extractor must be used under `payroll_id` path");

        ready(
            Uuid::from_str(payroll_id)
                .map(PayrollId)
                .map_err(|_| actix_web::error::ErrorBadRequest("invalid `payroll_id`"))
        )
    }
}

impl FromRequest for PayrollWithItems {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let payroll_id = PayrollId::from_request(&req, &mut dev::Payload::None).await?;

            let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");

            Ok(lifecycle::get(db.get_ref(), *payroll_id).await?)
        })
    }
}
