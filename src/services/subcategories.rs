//! Subcategory operations. Creation and re-parenting enforce that the
//! referenced category exists and is active; deactivation always cascades
//! to the subcategory's products.

use crate::auth::AuthenticatedUser;
use crate::domain::slug::Slug;
use crate::domain::types::{CategoryId, SubcategoryId};
use crate::dto::subcategories::{SubcategoryCountDto, SubcategoryDto, SubcategoryStatsDto};
use crate::dto::categories::ReorderResultDto;
use crate::forms::subcategories::{
    CreateSubcategoryPayload, ReorderSubcategoriesPayload, SubcategoryListParams,
    UpdateSubcategoryPayload,
};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated, Pagination};
use crate::repository::{
    CategoryReader, SubcategoryListQuery, SubcategoryReader, SubcategoryWriter,
};
use crate::services::{ServiceError, ServiceResult, require_admin, STATS_TOP_COUNT};

fn require_active_category<R: CategoryReader>(
    category_id: CategoryId,
    repo: &R,
) -> ServiceResult<()> {
    let category = repo
        .get_category_by_id(category_id)?
        .ok_or_else(|| ServiceError::not_found("category not found"))?;
    if !category.is_active {
        return Err(ServiceError::inactive_parent(
            "category is inactive and cannot receive subcategories",
        ));
    }
    Ok(())
}

pub fn list_subcategories<R: SubcategoryReader>(
    params: SubcategoryListParams,
    repo: &R,
) -> ServiceResult<(Vec<SubcategoryDto>, Option<Paginated>)> {
    let mut query = SubcategoryListQuery::default();
    if let Some(category_id) = params.category_id {
        query = query.category(CategoryId::new(category_id)?);
    }
    if let Some(search) = params.search.filter(|s| !s.trim().is_empty()) {
        query = query.search(search.trim());
    }
    if let Some(is_active) = params.is_active {
        query = query.active(is_active);
    }
    let pagination = params
        .page
        .map(|page| Pagination::new(page, params.limit.unwrap_or(DEFAULT_ITEMS_PER_PAGE)));
    query.pagination = pagination;

    let (total, subcategories) = repo.list_subcategories(query)?;
    let items = subcategories
        .into_iter()
        .map(SubcategoryDto::from)
        .collect();
    Ok((items, pagination.map(|p| Paginated::new(p, total))))
}

/// Active subcategories in display order, without pagination.
pub fn active_subcategories<R: SubcategoryReader>(repo: &R) -> ServiceResult<Vec<SubcategoryDto>> {
    let (_, subcategories) =
        repo.list_subcategories(SubcategoryListQuery::default().active(true))?;
    Ok(subcategories
        .into_iter()
        .map(SubcategoryDto::from)
        .collect())
}

/// Detail view with the parent category name resolved.
pub fn get_subcategory<R>(id: SubcategoryId, repo: &R) -> ServiceResult<SubcategoryDto>
where
    R: SubcategoryReader + CategoryReader,
{
    let subcategory = repo
        .get_subcategory_by_id(id)?
        .ok_or_else(|| ServiceError::not_found("subcategory not found"))?;
    let category = repo.get_category_by_id(subcategory.category_id)?;
    let dto = SubcategoryDto::from(subcategory);
    Ok(match category {
        Some(category) => dto.with_category_name(category.name.as_str()),
        None => dto,
    })
}

/// Subcategories of one category. The category must exist.
pub fn subcategories_by_category<R>(
    category_id: CategoryId,
    repo: &R,
) -> ServiceResult<Vec<SubcategoryDto>>
where
    R: SubcategoryReader + CategoryReader,
{
    repo.get_category_by_id(category_id)?
        .ok_or_else(|| ServiceError::not_found("category not found"))?;
    let (_, subcategories) = repo.list_subcategories(
        SubcategoryListQuery::default()
            .category(category_id)
            .active(true),
    )?;
    Ok(subcategories
        .into_iter()
        .map(SubcategoryDto::from)
        .collect())
}

pub fn create_subcategory<R>(
    payload: CreateSubcategoryPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<SubcategoryDto>
where
    R: SubcategoryReader + SubcategoryWriter + CategoryReader,
{
    require_active_category(payload.category_id, repo)?;

    if repo
        .find_subcategory_by_name(payload.category_id, payload.name.as_str(), None)?
        .is_some()
    {
        return Err(ServiceError::duplicate(
            "subcategory name already in use within this category",
        ));
    }
    let slug = Slug::derive(payload.name.as_str());
    if repo.find_subcategory_by_slug(slug.as_str(), None)?.is_some() {
        return Err(ServiceError::duplicate("subcategory slug already in use"));
    }

    let created = repo.create_subcategory(&payload.into_new_subcategory(user.id))?;
    Ok(SubcategoryDto::from(created))
}

pub fn update_subcategory<R>(
    id: SubcategoryId,
    payload: UpdateSubcategoryPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<SubcategoryDto>
where
    R: SubcategoryReader + SubcategoryWriter + CategoryReader,
{
    if payload.is_empty() {
        return Err(ServiceError::validation("no fields to update"));
    }
    let current = repo
        .get_subcategory_by_id(id)?
        .ok_or_else(|| ServiceError::not_found("subcategory not found"))?;

    // Re-parenting targets must be live categories.
    if let Some(category_id) = payload.category_id {
        if category_id != current.category_id {
            require_active_category(category_id, repo)?;
        }
    }

    // Sibling uniqueness is checked against the category the record will
    // end up in after the update.
    let target_category = payload.category_id.unwrap_or(current.category_id);
    if payload.name.is_some() || payload.category_id.is_some() {
        let target_name = payload
            .name
            .as_ref()
            .map(|n| n.as_str())
            .unwrap_or(current.name.as_str());
        if repo
            .find_subcategory_by_name(target_category, target_name, Some(id))?
            .is_some()
        {
            return Err(ServiceError::duplicate(
                "subcategory name already in use within this category",
            ));
        }
    }
    if let Some(name) = &payload.name {
        let slug = Slug::derive(name.as_str());
        if repo
            .find_subcategory_by_slug(slug.as_str(), Some(id))?
            .is_some()
        {
            return Err(ServiceError::duplicate("subcategory slug already in use"));
        }
    }

    let updated = repo.update_subcategory(id, &payload.into_patch(), user.id)?;
    Ok(SubcategoryDto::from(updated))
}

/// Delete a subcategory. Admin only; blocked while products reference it.
pub fn delete_subcategory<R>(
    id: SubcategoryId,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<()>
where
    R: SubcategoryReader + SubcategoryWriter,
{
    require_admin(user)?;
    repo.get_subcategory_by_id(id)?
        .ok_or_else(|| ServiceError::not_found("subcategory not found"))?;

    let products = repo.count_subcategory_products(id)?;
    if products > 0 {
        return Err(ServiceError::HasDependents(format!(
            "subcategory has {products} products"
        )));
    }

    repo.delete_subcategory(id)?;
    Ok(())
}

/// Flip the active flag. Deactivation always deactivates the subcategory's
/// products, stamping the acting user on each.
pub fn toggle_subcategory_status<R>(
    id: SubcategoryId,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<SubcategoryDto>
where
    R: SubcategoryReader + SubcategoryWriter,
{
    let subcategory = repo
        .get_subcategory_by_id(id)?
        .ok_or_else(|| ServiceError::not_found("subcategory not found"))?;
    let activate = !subcategory.is_active;

    let patch = crate::domain::subcategory::SubcategoryPatch {
        is_active: Some(activate),
        ..Default::default()
    };
    let updated = repo.update_subcategory(id, &patch, user.id)?;

    if !activate {
        let affected = repo.deactivate_subcategory_products(id, user.id)?;
        log::info!("subcategory {id} deactivated along with {affected} products");
    }

    Ok(SubcategoryDto::from(updated))
}

pub fn reorder_subcategories<R>(
    payload: ReorderSubcategoriesPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<ReorderResultDto>
where
    R: SubcategoryWriter,
{
    let mut updated = 0;
    let mut failed = Vec::new();
    for (position, id) in payload.ids.iter().enumerate() {
        match repo.set_subcategory_sort_order(*id, position as i32, user.id) {
            Ok(1..) => updated += 1,
            Ok(0) => failed.push(id.get()),
            Err(e) => {
                log::error!("reordering subcategory {id}: {e}");
                failed.push(id.get());
            }
        }
    }
    if failed.is_empty() {
        Ok(ReorderResultDto { updated })
    } else {
        Err(ServiceError::PartialFailure {
            message: format!("{updated} subcategories reordered, {} failed", failed.len()),
            failed,
        })
    }
}

pub fn subcategory_stats<R: SubcategoryReader>(repo: &R) -> ServiceResult<SubcategoryStatsDto> {
    let stats = repo.subcategory_stats(STATS_TOP_COUNT)?;
    Ok(SubcategoryStatsDto {
        total: stats.total,
        active: stats.active,
        inactive: stats.total - stats.active,
        top_by_products: stats
            .top_by_products
            .into_iter()
            .map(|(subcategory, count)| SubcategoryCountDto {
                id: subcategory.id.get(),
                name: subcategory.name.into_inner(),
                category_id: subcategory.category_id.get(),
                count,
            })
            .collect(),
    })
}
