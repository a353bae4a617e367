use actix_web::{HttpResponse, delete, get, patch, post, put, web};

use crate::auth::AuthenticatedUser;
use crate::domain::types::{CategoryId, ProductId, SubcategoryId};
use crate::forms::products::{
    CreateProductForm, CreateProductPayload, ProductListParams, ReorderProductsForm,
    ReorderProductsPayload, UpdateProductForm, UpdateProductPayload, UpdateStockForm,
    UpdateStockPayload,
};
use crate::repository::DieselRepository;
use crate::routes::{created_json, ok_json, ok_list, ok_message};
use crate::services::ServiceError;
use crate::services::products as product_service;

fn product_id(raw: i32) -> Result<ProductId, ServiceError> {
    ProductId::new(raw).map_err(|_| ServiceError::not_found("product not found"))
}

#[get("")]
async fn list(
    params: web::Query<ProductListParams>,
    _user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let (items, pagination) = product_service::list_products(params.into_inner(), repo.get_ref())?;
    Ok(ok_list(items, pagination))
}

#[get("/active")]
async fn active(
    _user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let items = product_service::active_products(repo.get_ref())?;
    Ok(ok_json(items))
}

#[get("/featured")]
async fn featured(
    _user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let items = product_service::featured_products(repo.get_ref())?;
    Ok(ok_json(items))
}

#[get("/stats")]
async fn stats(
    _user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let dto = product_service::product_stats(repo.get_ref())?;
    Ok(ok_json(dto))
}

#[get("/sku/{sku}")]
async fn by_sku(
    path: web::Path<String>,
    _user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let dto = product_service::get_product_by_sku(&path.into_inner(), repo.get_ref())?;
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
    let items = product_service::products_by_category(category_id, repo.get_ref())?;
    Ok(ok_json(items))
}

#[get("/subcategory/{subcategory_id}")]
async fn by_subcategory(
    path: web::Path<i32>,
    _user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let subcategory_id = SubcategoryId::new(path.into_inner())
        .map_err(|_| ServiceError::not_found("subcategory not found"))?;
    let items = product_service::products_by_subcategory(subcategory_id, repo.get_ref())?;
    Ok(ok_json(items))
}

#[get("/{id}")]
async fn detail(
    path: web::Path<i32>,
    _user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let dto = product_service::get_product(product_id(path.into_inner())?, repo.get_ref())?;
    Ok(ok_json(dto))
}

#[post("")]
async fn create(
    web::Json(form): web::Json<CreateProductForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let payload = CreateProductPayload::try_from(form).map_err(ServiceError::from)?;
    let dto = product_service::create_product(payload, &user, repo.get_ref())?;
    Ok(created_json(dto))
}

#[post("/reorder")]
async fn reorder(
    web::Json(form): web::Json<ReorderProductsForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let payload = ReorderProductsPayload::try_from(form).map_err(ServiceError::from)?;
    let result = product_service::reorder_products(payload, &user, repo.get_ref())?;
    Ok(ok_json(result))
}

#[put("/{id}")]
async fn update(
    path: web::Path<i32>,
    web::Json(form): web::Json<UpdateProductForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let payload = UpdateProductPayload::try_from(form).map_err(ServiceError::from)?;
    let dto = product_service::update_product(
        product_id(path.into_inner())?,
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
    product_service::delete_product(product_id(path.into_inner())?, &user, repo.get_ref())?;
    Ok(ok_message("product deleted"))
}

#[patch("/{id}/toggle-status")]
async fn toggle_status(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let dto = product_service::toggle_product_status(
        product_id(path.into_inner())?,
        &user,
        repo.get_ref(),
    )?;
    Ok(ok_json(dto))
}

#[patch("/{id}/stock")]
async fn update_stock(
    path: web::Path<i32>,
    web::Json(form): web::Json<UpdateStockForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> Result<HttpResponse, ServiceError> {
    let payload = UpdateStockPayload::try_from(form).map_err(ServiceError::from)?;
    let dto = product_service::update_stock(
        product_id(path.into_inner())?,
        payload,
        &user,
        repo.get_ref(),
    )?;
    Ok(ok_json(dto))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/products")
            .service(list)
            .service(active)
            .service(featured)
            .service(stats)
            .service(by_sku)
            .service(by_category)
            .service(by_subcategory)
            .service(create)
            .service(reorder)
            .service(detail)
            .service(update)
            .service(delete_one)
            .service(toggle_status)
            .service(update_stock),
    );
}
