//! Product operations: CRUD, stock adjustment, featured/SKU lookups and
//! aggregates. Creation and parent changes validate both hierarchy links.

use crate::auth::AuthenticatedUser;
use crate::domain::category::Category;
use crate::domain::product::{Product, Stock};
use crate::domain::subcategory::Subcategory;
use crate::domain::types::{CategoryId, ProductId, SubcategoryId};
use crate::dto::categories::ReorderResultDto;
use crate::dto::products::{ProductDto, ProductStatsDto};
use crate::forms::products::{
    CreateProductPayload, ProductListParams, ReorderProductsPayload, UpdateProductPayload,
    UpdateStockPayload,
};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated, Pagination};
use crate::repository::{
    CategoryReader, ProductListQuery, ProductReader, ProductWriter, SubcategoryReader,
};
use crate::services::{ServiceError, ServiceResult, require_admin, STATS_TOP_COUNT};

/// Resolve and validate the pair of hierarchy links a product points at:
/// both parents must exist, be active and agree with each other.
fn resolve_parents<R>(
    category_id: CategoryId,
    subcategory_id: SubcategoryId,
    repo: &R,
) -> ServiceResult<(Category, Subcategory)>
where
    R: CategoryReader + SubcategoryReader,
{
    let category = repo
        .get_category_by_id(category_id)?
        .ok_or_else(|| ServiceError::not_found("category not found"))?;
    if !category.is_active {
        return Err(ServiceError::inactive_parent(
            "category is inactive and cannot receive products",
        ));
    }
    let subcategory = repo
        .get_subcategory_by_id(subcategory_id)?
        .ok_or_else(|| ServiceError::not_found("subcategory not found"))?;
    if !subcategory.is_active {
        return Err(ServiceError::inactive_parent(
            "subcategory is inactive and cannot receive products",
        ));
    }
    if subcategory.category_id != category_id {
        return Err(ServiceError::HierarchyMismatch(format!(
            "subcategory {subcategory_id} does not belong to category {category_id}"
        )));
    }
    Ok((category, subcategory))
}

pub fn list_products<R: ProductReader>(
    params: ProductListParams,
    repo: &R,
) -> ServiceResult<(Vec<ProductDto>, Option<Paginated>)> {
    let mut query = ProductListQuery::default();
    if let Some(category_id) = params.category_id {
        query = query.category(CategoryId::new(category_id)?);
    }
    if let Some(subcategory_id) = params.subcategory_id {
        query = query.subcategory(SubcategoryId::new(subcategory_id)?);
    }
    if let Some(search) = params.search.filter(|s| !s.trim().is_empty()) {
        query = query.search(search.trim());
    }
    if let Some(is_active) = params.is_active {
        query = query.active(is_active);
    }
    query = query.price_range(params.min_price, params.max_price);
    if params.low_stock {
        query = query.low_stock();
    }
    let pagination = params
        .page
        .map(|page| Pagination::new(page, params.limit.unwrap_or(DEFAULT_ITEMS_PER_PAGE)));
    query.pagination = pagination;

    let (total, products) = repo.list_products(query)?;
    let items = products.into_iter().map(ProductDto::from).collect();
    Ok((items, pagination.map(|p| Paginated::new(p, total))))
}

/// Active products in display order, without pagination.
pub fn active_products<R: ProductReader>(repo: &R) -> ServiceResult<Vec<ProductDto>> {
    let (_, products) = repo.list_products(ProductListQuery::default().active(true))?;
    Ok(products.into_iter().map(ProductDto::from).collect())
}

/// Active products flagged as featured.
pub fn featured_products<R: ProductReader>(repo: &R) -> ServiceResult<Vec<ProductDto>> {
    let (_, products) =
        repo.list_products(ProductListQuery::default().active(true).featured(true))?;
    Ok(products.into_iter().map(ProductDto::from).collect())
}

fn with_parent_names<R>(product: Product, repo: &R) -> ServiceResult<ProductDto>
where
    R: CategoryReader + SubcategoryReader,
{
    let category = repo.get_category_by_id(product.category_id)?;
    let subcategory = repo.get_subcategory_by_id(product.subcategory_id)?;
    let dto = ProductDto::from(product);
    Ok(match (category, subcategory) {
        (Some(category), Some(subcategory)) => {
            dto.with_parent_names(category.name.as_str(), subcategory.name.as_str())
        }
        _ => dto,
    })
}

/// Detail view with both parent names resolved.
pub fn get_product<R>(id: ProductId, repo: &R) -> ServiceResult<ProductDto>
where
    R: ProductReader + CategoryReader + SubcategoryReader,
{
    let product = repo
        .get_product_by_id(id)?
        .ok_or_else(|| ServiceError::not_found("product not found"))?;
    with_parent_names(product, repo)
}

/// Case-insensitive SKU lookup.
pub fn get_product_by_sku<R>(sku: &str, repo: &R) -> ServiceResult<ProductDto>
where
    R: ProductReader + CategoryReader + SubcategoryReader,
{
    let product = repo
        .get_product_by_sku(sku.trim())?
        .ok_or_else(|| ServiceError::not_found("product not found"))?;
    with_parent_names(product, repo)
}

/// Active products of one category, which must exist and be active.
pub fn products_by_category<R>(
    category_id: CategoryId,
    repo: &R,
) -> ServiceResult<Vec<ProductDto>>
where
    R: ProductReader + CategoryReader,
{
    let category = repo
        .get_category_by_id(category_id)?
        .filter(|c| c.is_active)
        .ok_or_else(|| ServiceError::not_found("category not found"))?;
    let (_, products) = repo.list_products(
        ProductListQuery::default()
            .category(category.id)
            .active(true),
    )?;
    Ok(products.into_iter().map(ProductDto::from).collect())
}

/// Active products of one subcategory, which must exist and be active.
pub fn products_by_subcategory<R>(
    subcategory_id: SubcategoryId,
    repo: &R,
) -> ServiceResult<Vec<ProductDto>>
where
    R: ProductReader + SubcategoryReader,
{
    let subcategory = repo
        .get_subcategory_by_id(subcategory_id)?
        .filter(|s| s.is_active)
        .ok_or_else(|| ServiceError::not_found("subcategory not found"))?;
    let (_, products) = repo.list_products(
        ProductListQuery::default()
            .subcategory(subcategory.id)
            .active(true),
    )?;
    Ok(products.into_iter().map(ProductDto::from).collect())
}

pub fn create_product<R>(
    payload: CreateProductPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<ProductDto>
where
    R: ProductReader + ProductWriter + CategoryReader + SubcategoryReader,
{
    let (category, subcategory) =
        resolve_parents(payload.category_id, payload.subcategory_id, repo)?;

    if repo
        .find_product_by_sku(payload.sku.as_str(), None)?
        .is_some()
    {
        return Err(ServiceError::duplicate("SKU already in use"));
    }
    if repo
        .find_product_by_name(
            payload.category_id,
            payload.subcategory_id,
            payload.name.as_str(),
            None,
        )?
        .is_some()
    {
        return Err(ServiceError::duplicate(
            "product name already in use within this subcategory",
        ));
    }

    let created = repo.create_product(&payload.into_new_product(user.id))?;
    Ok(ProductDto::from(created)
        .with_parent_names(category.name.as_str(), subcategory.name.as_str()))
}

pub fn update_product<R>(
    id: ProductId,
    payload: UpdateProductPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<ProductDto>
where
    R: ProductReader + ProductWriter + CategoryReader + SubcategoryReader,
{
    if payload.is_empty() {
        return Err(ServiceError::validation("no fields to update"));
    }
    let current = repo
        .get_product_by_id(id)?
        .ok_or_else(|| ServiceError::not_found("product not found"))?;

    let target_category = payload.category_id.unwrap_or(current.category_id);
    let target_subcategory = payload.subcategory_id.unwrap_or(current.subcategory_id);
    if payload.category_id.is_some() || payload.subcategory_id.is_some() {
        resolve_parents(target_category, target_subcategory, repo)?;
    }

    if let Some(sku) = &payload.sku {
        if repo.find_product_by_sku(sku.as_str(), Some(id))?.is_some() {
            return Err(ServiceError::duplicate("SKU already in use"));
        }
    }
    if payload.name.is_some() || payload.category_id.is_some() || payload.subcategory_id.is_some()
    {
        let target_name = payload
            .name
            .as_ref()
            .map(|n| n.as_str())
            .unwrap_or(current.name.as_str());
        if repo
            .find_product_by_name(target_category, target_subcategory, target_name, Some(id))?
            .is_some()
        {
            return Err(ServiceError::duplicate(
                "product name already in use within this subcategory",
            ));
        }
    }

    let updated = repo.update_product(id, &payload.into_patch(), user.id)?;
    Ok(ProductDto::from(updated))
}

/// Delete a product. Admin only. Products are leaves, so no dependent
/// guard applies.
pub fn delete_product<R>(id: ProductId, user: &AuthenticatedUser, repo: &R) -> ServiceResult<()>
where
    R: ProductReader + ProductWriter,
{
    require_admin(user)?;
    repo.get_product_by_id(id)?
        .ok_or_else(|| ServiceError::not_found("product not found"))?;
    repo.delete_product(id)?;
    Ok(())
}

pub fn toggle_product_status<R>(
    id: ProductId,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<ProductDto>
where
    R: ProductReader + ProductWriter,
{
    let product = repo
        .get_product_by_id(id)?
        .ok_or_else(|| ServiceError::not_found("product not found"))?;

    let patch = crate::domain::product::ProductPatch {
        is_active: Some(!product.is_active),
        ..Default::default()
    };
    let updated = repo.update_product(id, &patch, user.id)?;
    Ok(ProductDto::from(updated))
}

/// Adjust the stock block. Fields not supplied keep their current values;
/// the form layer already clamped negative counters to zero.
pub fn update_stock<R>(
    id: ProductId,
    payload: UpdateStockPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<ProductDto>
where
    R: ProductReader + ProductWriter,
{
    let current = repo
        .get_product_by_id(id)?
        .ok_or_else(|| ServiceError::not_found("product not found"))?;

    let stock = Stock {
        quantity: payload.quantity,
        min_stock: payload.min_stock.unwrap_or(current.stock.min_stock),
        track_stock: payload.track_stock.unwrap_or(current.stock.track_stock),
    };
    let patch = crate::domain::product::ProductPatch {
        stock: Some(stock),
        ..Default::default()
    };
    let updated = repo.update_product(id, &patch, user.id)?;
    Ok(ProductDto::from(updated))
}

pub fn reorder_products<R>(
    payload: ReorderProductsPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<ReorderResultDto>
where
    R: ProductWriter,
{
    let mut updated = 0;
    let mut failed = Vec::new();
    for (position, id) in payload.ids.iter().enumerate() {
        match repo.set_product_sort_order(*id, position as i32, user.id) {
            Ok(1..) => updated += 1,
            Ok(0) => failed.push(id.get()),
            Err(e) => {
                log::error!("reordering product {id}: {e}");
                failed.push(id.get());
            }
        }
    }
    if failed.is_empty() {
        Ok(ReorderResultDto { updated })
    } else {
        Err(ServiceError::PartialFailure {
            message: format!("{updated} products reordered, {} failed", failed.len()),
            failed,
        })
    }
}

pub fn product_stats<R: ProductReader>(repo: &R) -> ServiceResult<ProductStatsDto> {
    let stats = repo.product_stats(STATS_TOP_COUNT)?;
    Ok(ProductStatsDto {
        total: stats.total,
        active: stats.active,
        featured: stats.featured,
        digital: stats.digital,
        total_price: stats.total_price,
        average_price: stats.average_price,
        low_stock: stats.low_stock.into_iter().map(ProductDto::from).collect(),
        most_expensive: stats
            .most_expensive
            .into_iter()
            .map(ProductDto::from)
            .collect(),
    })
}
