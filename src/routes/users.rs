use actix_web::{HttpResponse, delete, get, patch, post, put, web};

use crate::auth::AuthenticatedUser;
use crate::domain::types::UserId;
use crate::forms::users::{
    CreateUserForm, CreateUserPayload, UpdateUserForm, UpdateUserPayload, UserListParams,
};
use crate::repository::DieselRepository;
use crate::routes::{created_json, ok_json, ok_list, ok_message};
use crate::services::ServiceError;
use crate::services::users as user_service;

fn user_id(raw: i32) -> Result<UserId, ServiceError> {
    UserId::new(raw).map_err(|_| ServiceError::not_found("user not found"))
}

#[get("")]
async fn list(
    params: web::Query<UserListParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let (items, pagination) = user_service::list_users(params.into_inner(), &user, repo.get_ref())?;
    Ok(ok_list(items, pagination))
}

#[get("/stats")]
async fn stats(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let dto = user_service::user_stats(&user, repo.get_ref())?;
    Ok(ok_json(dto))
}

#[get("/{id}")]
async fn detail(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let dto = user_service::get_user(user_id(path.into_inner())?, &user, repo.get_ref())?;
    Ok(ok_json(dto))
}

#[post("")]
async fn create(
    web::Json(form): web::Json<CreateUserForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let payload = CreateUserPayload::try_from(form).map_err(ServiceError::from)?;
    let dto = user_service::create_user(payload, &user, repo.get_ref())?;
    Ok(created_json(dto))
}

#[put("/{id}")]
async fn update(
    path: web::Path<i32>,
    web::Json(form): web::Json<UpdateUserForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let payload = UpdateUserPayload::try_from(form).map_err(ServiceError::from)?;
    let dto = user_service::update_user(user_id(path.into_inner())?, payload, &user, repo.get_ref())?;
    Ok(ok_json(dto))
}

#[delete("/{id}")]
async fn delete_one(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    user_service::delete_user(user_id(path.into_inner())?, &user, repo.get_ref())?;
    Ok(ok_message("user deleted"))
}

#[patch("/{id}/toggle-status")]
async fn toggle_status(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let dto =
        user_service::toggle_user_status(user_id(path.into_inner())?, &user, repo.get_ref())?;
    Ok(ok_json(dto))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(list)
            .service(stats)
            .service(create)
            .service(detail)
            .service(update)
            .service(delete_one)
            .service(toggle_status),
    );
}
