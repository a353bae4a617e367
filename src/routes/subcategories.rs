use actix_web::{HttpResponse, delete, get, patch, post, put, web};

use crate::auth::AuthenticatedUser;
use crate::domain::types::{CategoryId, SubcategoryId};
use crate::forms::subcategories::{
    CreateSubcategoryForm, CreateSubcategoryPayload, ReorderSubcategoriesForm,
    ReorderSubcategoriesPayload, SubcategoryListParams, UpdateSubcategoryForm,
    UpdateSubcategoryPayload,
};
use crate::repository::DieselRepository;
use crate::routes::{created_json, ok_json, ok_list, ok_message};
use crate::services::ServiceError;
use crate::services::subcategories as subcategory_service;

fn subcategory_id(raw: i32) -> Result<SubcategoryId, ServiceError> {
    SubcategoryId::new(raw).map_err(|_| ServiceError::not_found("subcategory not found"))
}

#[get("")]
async fn list(
    params: web::Query<SubcategoryListParams>,
    _user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let (items, pagination) =
        subcategory_service::list_subcategories(params.into_inner(), repo.get_ref())?;
    Ok(ok_list(items, pagination))
}

#[get("/active")]
async fn active(
    _user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let items = subcategory_service::active_subcategories(repo.get_ref())?;
    Ok(ok_json(items))
}

#[get("/stats")]
async fn stats(
    _user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let dto = subcategory_service::subcategory_stats(repo.get_ref())?;
    Ok(ok_json(dto))
}

#[get("/category/{category_id}")]
async fn by_category(
    path: web::Path<i32>,
    _user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let category_id = CategoryId::new(path.into_inner())
        .map_err(|_| ServiceError::not_found("category not found"))?;
    let items = subcategory_service::subcategories_by_category(category_id, repo.get_ref())?;
    Ok(ok_json(items))
}

#[get("/{id}")]
async fn detail(
    path: web::Path<i32>,
    _user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let dto =
        subcategory_service::get_subcategory(subcategory_id(path.into_inner())?, repo.get_ref())?;
    Ok(ok_json(dto))
}

#[post("")]
async fn create(
    web::Json(form): web::Json<CreateSubcategoryForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let payload = CreateSubcategoryPayload::try_from(form).map_err(ServiceError::from)?;
    let dto = subcategory_service::create_subcategory(payload, &user, repo.get_ref())?;
    Ok(created_json(dto))
}

#[post("/reorder")]
async fn reorder(
    web::Json(form): web::Json<ReorderSubcategoriesForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let payload = ReorderSubcategoriesPayload::try_from(form).map_err(ServiceError::from)?;
    let result = subcategory_service::reorder_subcategories(payload, &user, repo.get_ref())?;
    Ok(ok_json(result))
}

#[put("/{id}")]
async fn update(
    path: web::Path<i32>,
    web::Json(form): web::Json<UpdateSubcategoryForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let payload = UpdateSubcategoryPayload::try_from(form).map_err(ServiceError::from)?;
    let dto = subcategory_service::update_subcategory(
        subcategory_id(path.into_inner())?,
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
    subcategory_service::delete_subcategory(
        subcategory_id(path.into_inner())?,
        &user,
        repo.get_ref(),
    )?;
    Ok(ok_message("subcategory deleted"))
}

#[patch("/{id}/toggle-status")]
async fn toggle_status(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let dto = subcategory_service::toggle_subcategory_status(
        subcategory_id(path.into_inner())?,
        &user,
        repo.get_ref(),
    )?;
    Ok(ok_json(dto))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subcategories")
            .service(list)
            .service(active)
            .service(stats)
            .service(by_category)
            .service(create)
            .service(reorder)
            .service(detail)
            .service(update)
            .service(delete_one)
            .service(toggle_status),
    );
}
