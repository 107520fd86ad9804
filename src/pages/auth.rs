use actix_web::{get, post, web, Responder};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{auth::Authority, entity::{prelude::*, user}};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(login)
        .service(whoami);
}

#[derive(Debug, Serialize, Deserialize)]
struct Login {
    email: String,
    password: String,
}

/// Stored password digest: SHA-256 of `password:email`
fn digest(password: &str, email: &str) -> Vec<u8> {
    Sha256::digest(format!("{password}:{email}")).to_vec()
}

#[post("/login")]
async fn login(db: web::Data<DatabaseConnection>, authority: web::Data<Authority>, credentials: web::Json<Login>) -> actix_web::Result<impl Responder> {
    let hashed_password = digest(&credentials.password, &credentials.email);

    let Some(user) = User::find()
        .filter(user::Column::Email.eq(&credentials.email))
        .filter(user::Column::Password.eq(hashed_password))
        .one(db.get_ref()).await
        .map_err(|err| {
            tracing::error!(error = %err, "unable to look up user");
            actix_web::error::ErrorInternalServerError("internal server error")
        })?
    else {
        return Err(actix_web::error::ErrorForbidden("invalid credentials"));
    };

    if !user.is_active {
        return Err(actix_web::error::ErrorBadRequest("inactive user"));
    }

    tracing::info!(email = %user.email, "user logged in");

    Ok(authority.issue_for(&user)?)
}

#[get("")]
async fn whoami(user: user::Model) -> impl Responder {
    web::Json(user)
}
