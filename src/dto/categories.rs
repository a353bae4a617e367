use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::category::Category;
use crate::dto::subcategories::SubcategoryDto;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryDto {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub slug: String,
    pub is_active: bool,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub created_by: i32,
    pub updated_by: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Category> for CategoryDto {
    fn from(value: Category) -> Self {
        Self {
            id: value.id.get(),
            name: value.name.into_inner(),
            description: value.description.into_inner(),
            slug: value.slug.into_inner(),
            is_active: value.is_active,
            color: value.color.map(|c| c.into_inner()),
            icon: value.icon.map(|i| i.into_inner()),
            sort_order: value.sort_order,
            created_by: value.created_by.get(),
            updated_by: value.updated_by.map(|u| u.get()),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Detail view: the category together with its active subcategories.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryDetailDto {
    #[serde(flatten)]
    pub category: CategoryDto,
    pub subcategories: Vec<SubcategoryDto>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryCountDto {
    pub id: i32,
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryStatsDto {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub top_by_subcategories: Vec<CategoryCountDto>,
}

/// Outcome of a reorder batch: how many records were repositioned.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReorderResultDto {
    pub updated: usize,
}
