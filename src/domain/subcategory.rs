use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::slug::Slug;
use crate::domain::types::{
    CategoryId, Description, HexColor, NonEmptyString, SubcategoryId, SubcategoryName, UserId,
};

/// Middle level of the catalog hierarchy. Always belongs to a category,
/// which must exist and be active at creation and update time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub name: SubcategoryName,
    pub description: Option<Description>,
    pub slug: Slug,
    pub is_active: bool,
    pub color: Option<HexColor>,
    pub icon: Option<NonEmptyString>,
    pub category_id: CategoryId,
    pub sort_order: i32,
    pub created_by: UserId,
    pub updated_by: Option<UserId>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Data required to insert a new [`Subcategory`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSubcategory {
    pub name: SubcategoryName,
    pub description: Option<Description>,
    pub slug: Slug,
    pub is_active: bool,
    pub color: Option<HexColor>,
    pub icon: Option<NonEmptyString>,
    pub category_id: CategoryId,
    pub sort_order: i32,
    pub created_by: UserId,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Partial update for a [`Subcategory`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubcategoryPatch {
    pub name: Option<SubcategoryName>,
    pub slug: Option<Slug>,
    pub description: Option<Description>,
    pub color: Option<HexColor>,
    pub icon: Option<NonEmptyString>,
    pub category_id: Option<CategoryId>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}
