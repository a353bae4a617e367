use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::subcategory::Subcategory;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubcategoryDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub slug: String,
    pub is_active: bool,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub category_id: i32,
    /// Populated on detail reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    pub sort_order: i32,
    pub created_by: i32,
    pub updated_by: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Subcategory> for SubcategoryDto {
    fn from(value: Subcategory) -> Self {
        Self {
            id: value.id.get(),
            name: value.name.into_inner(),
            description: value.description.map(|d| d.into_inner()),
            slug: value.slug.into_inner(),
            is_active: value.is_active,
            color: value.color.map(|c| c.into_inner()),
            icon: value.icon.map(|i| i.into_inner()),
            category_id: value.category_id.get(),
            category_name: None,
            sort_order: value.sort_order,
            created_by: value.created_by.get(),
            updated_by: value.updated_by.map(|u| u.get()),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl SubcategoryDto {
    pub fn with_category_name(mut self, name: impl Into<String>) -> Self {
        self.category_name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubcategoryCountDto {
    pub id: i32,
    pub name: String,
    pub category_id: i32,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubcategoryStatsDto {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub top_by_products: Vec<SubcategoryCountDto>,
}
