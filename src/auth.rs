use actix_web::{body, dev, http::{self, header::ContentType, StatusCode}, web, FromRequest, HttpRequest, HttpResponse};
use chrono::{Duration, Local};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::{prelude::*, user};

/// Issues and verifies HS256 bearer tokens. The token subject is the user's
/// email; everything else about the caller is looked up on every request.
pub struct Authority {
    jwt_key: (EncodingKey, DecodingKey),
    ttl: Duration,
}

impl Authority {
    pub fn new(jwt_key: &[u8], ttl: Duration) -> Self {
        Self {
            jwt_key: (EncodingKey::from_secret(jwt_key), DecodingKey::from_secret(jwt_key)),
            ttl,
        }
    }

    pub fn issue_for(&self, user: &user::Model) -> Result<String, AuthError> {
        let claims = Claims {
            exp: (Local::now() + self.ttl).timestamp(),
            sub: user.email.clone(),
        };

        Ok(encode(&Header::default(), &claims, &self.jwt_key.0)?)
    }

    /// Returns the email the token was issued for.
    pub fn authorize(&self, token: impl AsRef<str>) -> Result<String, AuthError> {
        let payload = decode::<Claims>(token.as_ref(), &self.jwt_key.1, &Validation::default())?;

        Ok(payload.claims.sub)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    exp: i64,
    sub: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authority error")]
    AuthorityError(#[from] jsonwebtoken::errors::Error),
}

impl actix_web::error::ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse<body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(self.to_string())
    }

    fn status_code(&self) -> http::StatusCode {
        match self {
            AuthError::AuthorityError(_) => StatusCode::FORBIDDEN,
        }
    }
}

/// Resolves the caller from the bearer token and rejects inactive accounts.
impl FromRequest for user::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // Basically grabs the value after space ( ) from `Authorization` header
            // Example: Bearer sometoken
            //                 ^ grabs this value
            let Some(Ok(Some((_, token)))) = req.headers()
                .get("Authorization")
                .map(|v|
                    v.to_str()
                        .map(|str| str.split_once(" "))
                )
            else {
                return Err(actix_web::error::ErrorUnauthorized("unauthorized"))
            };

            let authority = req.app_data::<web::Data<Authority>>().expect("Authority must be attached");
            let email = authority.authorize(token)?;

            let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");

            let Some(user) = User::find()
                .filter(user::Column::Email.eq(&email))
                .one(db.get_ref()).await
                .map_err(|err| {
                    tracing::error!(error = %err, "unable to look up caller");
                    actix_web::error::ErrorInternalServerError("internal server error")
                })?
            else {
                return Err(actix_web::error::ErrorUnauthorized("unauthorized"))
            };

            if !user.is_active {
                return Err(actix_web::error::ErrorBadRequest("inactive user"))
            }

            Ok(user)
        })
    }
}
