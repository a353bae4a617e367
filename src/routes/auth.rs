use actix_web::{HttpResponse, Responder, get, post, put, web};
use serde_json::json;

use crate::auth::{AuthenticatedUser, JwtService};
use crate::forms::auth::{ChangePasswordForm, ChangePasswordPayload, LoginForm, LoginPayload};
use crate::repository::DieselRepository;
use crate::routes::{ok_json, ok_message};
use crate::services::ServiceError;
use crate::services::auth as auth_service;

#[post("/login")]
async fn login(
    web::Json(form): web::Json<LoginForm>,
    jwt: web::Data<JwtService>,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let payload = LoginPayload::try_from(form).map_err(ServiceError::from)?;
    let dto = auth_service::login(payload, jwt.get_ref(), repo.get_ref())?;
    Ok(ok_json(dto))
}

#[get("/me")]
async fn me(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let dto = auth_service::me(&user, repo.get_ref())?;
    Ok(ok_json(dto))
}

/// Reaching this handler at all means the bearer token resolved to a live
/// account, so it only echoes the caller's identity.
#[get("/verify")]
async fn verify(user: AuthenticatedUser) -> impl Responder {
    ok_json(json!({
        "id": user.id.get(),
        "username": user.username.as_str(),
        "role": user.role.as_str(),
    }))
}

#[put("/change-password")]
async fn change_password(
    web::Json(form): web::Json<ChangePasswordForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let payload = ChangePasswordPayload::try_from(form).map_err(ServiceError::from)?;
    auth_service::change_password(payload, &user, repo.get_ref())?;
    Ok(ok_message("password updated"))
}

/// Tokens are stateless, so logout is an acknowledgement; clients discard
/// the token.
#[post("/logout")]
async fn logout(_user: AuthenticatedUser) -> impl Responder {
    ok_message("logged out")
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(login)
            .service(me)
            .service(verify)
            .service(change_password)
            .service(logout),
    );
}
