use actix_web::{HttpResponse, delete, get, patch, post, put, web};

use crate::auth::AuthenticatedUser;
use crate::domain::types::CategoryId;
use crate::forms::categories::{
    CategoryListParams, CreateCategoryForm, CreateCategoryPayload, ReorderCategoriesForm,
    ReorderCategoriesPayload, UpdateCategoryForm, UpdateCategoryPayload,
};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{created_json, ok_json, ok_list, ok_message};
use crate::services::ServiceError;
use crate::services::categories as category_service;

fn category_id(raw: i32) -> Result<CategoryId, ServiceError> {
    CategoryId::new(raw).map_err(|_| ServiceError::not_found("category not found"))
}

#[get("")]
async fn list(
    params: web::Query<CategoryListParams>,
    _user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let (items, pagination) = category_service::list_categories(params.into_inner(), repo.get_ref())?;
    Ok(ok_list(items, pagination))
}

#[get("/active")]
async fn active(
    _user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let items = category_service::active_categories(repo.get_ref())?;
    Ok(ok_json(items))
}

#[get("/stats")]
async fn stats(
    _user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let dto = category_service::category_stats(repo.get_ref())?;
    Ok(ok_json(dto))
}

#[get("/{id}")]
async fn detail(
    path: web::Path<i32>,
    _user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let dto = category_service::get_category(category_id(path.into_inner())?, repo.get_ref())?;
    Ok(ok_json(dto))
}

#[post("")]
async fn create(
    web::Json(form): web::Json<CreateCategoryForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let payload = CreateCategoryPayload::try_from(form).map_err(ServiceError::from)?;
    let dto = category_service::create_category(payload, &user, repo.get_ref())?;
    Ok(created_json(dto))
}

#[post("/reorder")]
async fn reorder(
    web::Json(form): web::Json<ReorderCategoriesForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let payload = ReorderCategoriesPayload::try_from(form).map_err(ServiceError::from)?;
    let result = category_service::reorder_categories(payload, &user, repo.get_ref())?;
    Ok(ok_json(result))
}

#[put("/{id}")]
async fn update(
    path: web::Path<i32>,
    web::Json(form): web::Json<UpdateCategoryForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let payload = UpdateCategoryPayload::try_from(form).map_err(ServiceError::from)?;
    let dto = category_service::update_category(
        category_id(path.into_inner())?,
        payload,
        &user,
        repo.get_ref(),
    )?;
    Ok(ok_json(dto))
}

#[delete("/{id}")]
async fn delete_one(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    category_service::delete_category(category_id(path.into_inner())?, &user, repo.get_ref())?;
    Ok(ok_message("category deleted"))
}

#[patch("/{id}/toggle-status")]
async fn toggle_status(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServiceError> {
    let dto = category_service::toggle_category_status(
        category_id(path.into_inner())?,
        &user,
        config.cascade_category_deactivation,
        repo.get_ref(),
    )?;
    Ok(ok_json(dto))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/categories")
            .service(list)
            .service(active)
            .service(stats)
            .service(create)
            .service(reorder)
            .service(detail)
            .service(update)
            .service(delete_one)
            .service(toggle_status),
    );
}
