//! Category operations: CRUD, status toggling with the optional cascade,
//! reordering and aggregates.

use crate::auth::AuthenticatedUser;
use crate::domain::slug::Slug;
use crate::domain::types::CategoryId;
use crate::dto::categories::{
    CategoryCountDto, CategoryDetailDto, CategoryDto, CategoryStatsDto, ReorderResultDto,
};
use crate::dto::subcategories::SubcategoryDto;
use crate::forms::categories::{
    CategoryListParams, CreateCategoryPayload, ReorderCategoriesPayload, UpdateCategoryPayload,
};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated, Pagination};
use crate::repository::{
    CategoryListQuery, CategoryReader, CategoryWriter, SubcategoryListQuery, SubcategoryReader,
};
use crate::services::{ServiceError, ServiceResult, require_admin, STATS_TOP_COUNT};

/// List categories with optional filters. The pagination block is present
/// only when the client asked for a page.
pub fn list_categories<R: CategoryReader>(
    params: CategoryListParams,
    repo: &R,
) -> ServiceResult<(Vec<CategoryDto>, Option<Paginated>)> {
    let mut query = CategoryListQuery::default();
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

    let (total, categories) = repo.list_categories(query)?;
    let items = categories.into_iter().map(CategoryDto::from).collect();
    Ok((items, pagination.map(|p| Paginated::new(p, total))))
}

/// Active categories in display order, without pagination.
pub fn active_categories<R: CategoryReader>(repo: &R) -> ServiceResult<Vec<CategoryDto>> {
    let (_, categories) = repo.list_categories(CategoryListQuery::default().active(true))?;
    Ok(categories.into_iter().map(CategoryDto::from).collect())
}

/// Detail view: the category plus its active subcategories.
pub fn get_category<R>(id: CategoryId, repo: &R) -> ServiceResult<CategoryDetailDto>
where
    R: CategoryReader + SubcategoryReader,
{
    let category = repo
        .get_category_by_id(id)?
        .ok_or_else(|| ServiceError::not_found("category not found"))?;
    let (_, subcategories) =
        repo.list_subcategories(SubcategoryListQuery::default().category(id).active(true))?;
    Ok(CategoryDetailDto {
        category: CategoryDto::from(category),
        subcategories: subcategories
            .into_iter()
            .map(SubcategoryDto::from)
            .collect(),
    })
}

pub fn create_category<R>(
    payload: CreateCategoryPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<CategoryDto>
where
    R: CategoryReader + CategoryWriter,
{
    if repo
        .find_category_by_name(payload.name.as_str(), None)?
        .is_some()
    {
        return Err(ServiceError::duplicate("category name already in use"));
    }
    let slug = Slug::derive(payload.name.as_str());
    if repo.find_category_by_slug(slug.as_str(), None)?.is_some() {
        return Err(ServiceError::duplicate("category slug already in use"));
    }

    let created = repo.create_category(&payload.into_new_category(user.id))?;
    Ok(CategoryDto::from(created))
}

pub fn update_category<R>(
    id: CategoryId,
    payload: UpdateCategoryPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<CategoryDto>
where
    R: CategoryReader + CategoryWriter,
{
    if payload.is_empty() {
        return Err(ServiceError::validation("no fields to update"));
    }
    repo.get_category_by_id(id)?
        .ok_or_else(|| ServiceError::not_found("category not found"))?;

    if let Some(name) = &payload.name {
        if repo.find_category_by_name(name.as_str(), Some(id))?.is_some() {
            return Err(ServiceError::duplicate("category name already in use"));
        }
        let slug = Slug::derive(name.as_str());
        if repo
            .find_category_by_slug(slug.as_str(), Some(id))?
            .is_some()
        {
            return Err(ServiceError::duplicate("category slug already in use"));
        }
    }

    let updated = repo.update_category(id, &payload.into_patch(), user.id)?;
    Ok(CategoryDto::from(updated))
}

/// Delete a category. Admin only; blocked while subcategories or products
/// still reference it.
pub fn delete_category<R>(id: CategoryId, user: &AuthenticatedUser, repo: &R) -> ServiceResult<()>
where
    R: CategoryReader + CategoryWriter,
{
    require_admin(user)?;
    repo.get_category_by_id(id)?
        .ok_or_else(|| ServiceError::not_found("category not found"))?;

    let dependents = repo.count_category_dependents(id)?;
    if dependents.any() {
        return Err(ServiceError::HasDependents(format!(
            "category has {} subcategories and {} products",
            dependents.subcategories, dependents.products
        )));
    }

    repo.delete_category(id)?;
    Ok(())
}

/// Flip the active flag. When deactivating and the cascade policy is
/// enabled, every subcategory and product under the category is
/// deactivated as well.
pub fn toggle_category_status<R>(
    id: CategoryId,
    user: &AuthenticatedUser,
    cascade_deactivation: bool,
    repo: &R,
) -> ServiceResult<CategoryDto>
where
    R: CategoryReader + CategoryWriter,
{
    let category = repo
        .get_category_by_id(id)?
        .ok_or_else(|| ServiceError::not_found("category not found"))?;
    let activate = !category.is_active;

    let patch = crate::domain::category::CategoryPatch {
        is_active: Some(activate),
        ..Default::default()
    };
    let updated = repo.update_category(id, &patch, user.id)?;

    if !activate && cascade_deactivation {
        let affected = repo.deactivate_category_children(id, user.id)?;
        log::info!("category {id} deactivated, cascade touched {affected} records");
    }

    Ok(CategoryDto::from(updated))
}

/// Assign sort positions following the order of the supplied ids. Ids that
/// fail to update are collected and reported as a partial failure.
pub fn reorder_categories<R>(
    payload: ReorderCategoriesPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<ReorderResultDto>
where
    R: CategoryWriter,
{
    let mut updated = 0;
    let mut failed = Vec::new();
    for (position, id) in payload.ids.iter().enumerate() {
        match repo.set_category_sort_order(*id, position as i32, user.id) {
            Ok(1..) => updated += 1,
            Ok(0) => failed.push(id.get()),
            Err(e) => {
                log::error!("reordering category {id}: {e}");
                failed.push(id.get());
            }
        }
    }
    if failed.is_empty() {
        Ok(ReorderResultDto { updated })
    } else {
        Err(ServiceError::PartialFailure {
            message: format!("{updated} categories reordered, {} failed", failed.len()),
            failed,
        })
    }
}

pub fn category_stats<R: CategoryReader>(repo: &R) -> ServiceResult<CategoryStatsDto> {
    let stats = repo.category_stats(STATS_TOP_COUNT)?;
    Ok(CategoryStatsDto {
        total: stats.total,
        active: stats.active,
        inactive: stats.total - stats.active,
        top_by_subcategories: stats
            .top_by_subcategories
            .into_iter()
            .map(|(category, count)| CategoryCountDto {
                id: category.id.get(),
                name: category.name.into_inner(),
                count,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::UserId;
    use crate::repository::test::TestRepository;
    use crate::services::tests_support::{admin, category, coordinator, subcategory};

    fn create_payload(name: &str) -> CreateCategoryPayload {
        CreateCategoryPayload {
            name: crate::domain::types::CategoryName::new(name).unwrap(),
            description: crate::domain::types::Description::new("test").unwrap(),
            color: None,
            icon: None,
            is_active: true,
            sort_order: 0,
        }
    }

    #[test]
    fn create_rejects_duplicate_name_case_insensitively() {
        let repo = TestRepository::new().with_categories(vec![category(1, "Bebidas", true)]);
        let err = create_category(create_payload("BEBIDAS"), &admin(), &repo).unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate(_)));
    }

    #[test]
    fn create_rejects_colliding_slug() {
        let repo = TestRepository::new().with_categories(vec![category(1, "Panadería", true)]);
        // "Panaderia" normalizes to the same slug as "Panadería".
        let err = create_category(create_payload("Panaderia"), &admin(), &repo).unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate(_)));
    }

    #[test]
    fn create_returns_dto_with_derived_slug() {
        let repo = TestRepository::new();
        let dto = create_category(create_payload("Bebidas Frías"), &coordinator(), &repo).unwrap();
        assert_eq!(dto.slug, "bebidas-frias");
        assert!(dto.is_active);
    }

    #[test]
    fn update_with_no_fields_is_a_validation_error() {
        let repo = TestRepository::new().with_categories(vec![category(1, "Bebidas", true)]);
        let err = update_category(
            CategoryId::new(1).unwrap(),
            UpdateCategoryPayload::default(),
            &admin(),
            &repo,
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
    }

    #[test]
    fn update_missing_category_is_not_found() {
        let repo = TestRepository::new();
        let payload = UpdateCategoryPayload {
            sort_order: Some(5),
            ..Default::default()
        };
        let err =
            update_category(CategoryId::new(9).unwrap(), payload, &admin(), &repo).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn delete_requires_admin() {
        let repo = TestRepository::new().with_categories(vec![category(1, "Bebidas", true)]);
        let err = delete_category(CategoryId::new(1).unwrap(), &coordinator(), &repo).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[test]
    fn delete_blocked_by_dependents() {
        let repo = TestRepository::new()
            .with_categories(vec![category(1, "Bebidas", true)])
            .with_subcategories(vec![subcategory(10, 1, "Sodas", true)]);
        let err = delete_category(CategoryId::new(1).unwrap(), &admin(), &repo).unwrap_err();
        assert!(matches!(err, ServiceError::HasDependents(_)));
    }

    #[test]
    fn deactivation_cascades_only_when_enabled() {
        let repo = TestRepository::new()
            .with_categories(vec![category(1, "Bebidas", true)])
            .with_subcategories(vec![subcategory(10, 1, "Sodas", true)]);
        let dto = toggle_category_status(CategoryId::new(1).unwrap(), &admin(), false, &repo)
            .unwrap();
        assert!(!dto.is_active);
        let child = repo
            .get_subcategory_by_id(crate::domain::types::SubcategoryId::new(10).unwrap())
            .unwrap()
            .unwrap();
        assert!(child.is_active);
    }

    #[test]
    fn deactivation_cascade_touches_children() {
        let repo = TestRepository::new()
            .with_categories(vec![category(1, "Bebidas", true)])
            .with_subcategories(vec![subcategory(10, 1, "Sodas", true)]);
        toggle_category_status(CategoryId::new(1).unwrap(), &admin(), true, &repo).unwrap();
        let child = repo
            .get_subcategory_by_id(crate::domain::types::SubcategoryId::new(10).unwrap())
            .unwrap()
            .unwrap();
        assert!(!child.is_active);
        assert_eq!(child.updated_by, Some(UserId::new(1).unwrap()));
    }

    #[test]
    fn reorder_reports_missing_ids_as_partial_failure() {
        let repo = TestRepository::new()
            .with_categories(vec![category(1, "Bebidas", true), category(2, "Pan", true)]);
        let payload = ReorderCategoriesPayload {
            ids: vec![
                CategoryId::new(2).unwrap(),
                CategoryId::new(99).unwrap(),
                CategoryId::new(1).unwrap(),
            ],
        };
        let err = reorder_categories(payload, &admin(), &repo).unwrap_err();
        match err {
            ServiceError::PartialFailure { failed, .. } => assert_eq!(failed, vec![99]),
            other => panic!("expected partial failure, got {other:?}"),
        }
        // Successful entries kept their new positions.
        let moved = repo
            .get_category_by_id(CategoryId::new(2).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(moved.sort_order, 0);
    }

    #[test]
    fn reorder_succeeds_when_all_ids_exist() {
        let repo = TestRepository::new()
            .with_categories(vec![category(1, "Bebidas", true), category(2, "Pan", true)]);
        let payload = ReorderCategoriesPayload {
            ids: vec![CategoryId::new(2).unwrap(), CategoryId::new(1).unwrap()],
        };
        let result = reorder_categories(payload, &coordinator(), &repo).unwrap();
        assert_eq!(result.updated, 2);
    }

    #[test]
    fn stats_count_inactive() {
        let repo = TestRepository::new().with_categories(vec![
            category(1, "Bebidas", true),
            category(2, "Pan", false),
        ]);
        let stats = category_stats(&repo).unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.inactive, 1);
    }

    #[test]
    fn list_without_page_has_no_pagination_block() {
        let repo = TestRepository::new().with_categories(vec![category(1, "Bebidas", true)]);
        let (items, pagination) = list_categories(CategoryListParams::default(), &repo).unwrap();
        assert_eq!(items.len(), 1);
        assert!(pagination.is_none());
    }

    #[test]
    fn list_with_page_reports_totals() {
        let repo = TestRepository::new().with_categories(vec![
            category(1, "Bebidas", true),
            category(2, "Pan", true),
            category(3, "Lácteos", true),
        ]);
        let params = CategoryListParams {
            page: Some(1),
            limit: Some(2),
            ..Default::default()
        };
        let (items, pagination) = list_categories(params, &repo).unwrap();
        assert_eq!(items.len(), 2);
        let pagination = pagination.unwrap();
        assert_eq!(pagination.total, 3);
        assert_eq!(pagination.pages, 2);
    }

    #[test]
    fn detail_lists_only_active_subcategories() {
        let repo = TestRepository::new()
            .with_categories(vec![category(1, "Bebidas", true)])
            .with_subcategories(vec![
                subcategory(10, 1, "Sodas", true),
                subcategory(11, 1, "Jugos", false),
            ]);
        let detail = get_category(CategoryId::new(1).unwrap(), &repo).unwrap();
        assert_eq!(detail.subcategories.len(), 1);
        assert_eq!(detail.subcategories[0].name, "Sodas");
    }

    #[test]
    fn non_admins_can_create() {
        let repo = TestRepository::new();
        assert!(create_category(create_payload("Bebidas"), &coordinator(), &repo).is_ok());
    }
}
