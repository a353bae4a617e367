use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::slug::Slug;
use crate::domain::types::{CategoryId, CategoryName, Description, HexColor, NonEmptyString, UserId};

/// Top level of the catalog hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    pub description: Description,
    pub slug: Slug,
    pub is_active: bool,
    pub color: Option<HexColor>,
    pub icon: Option<NonEmptyString>,
    pub sort_order: i32,
    pub created_by: UserId,
    pub updated_by: Option<UserId>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Data required to insert a new [`Category`]. The slug is always derived
/// from the name by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCategory {
    pub name: CategoryName,
    pub description: Description,
    pub slug: Slug,
    pub is_active: bool,
    pub color: Option<HexColor>,
    pub icon: Option<NonEmptyString>,
    pub sort_order: i32,
    pub created_by: UserId,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Partial update for a [`Category`]. `None` fields are left untouched;
/// `slug` is populated only when `name` is present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryPatch {
    pub name: Option<CategoryName>,
    pub slug: Option<Slug>,
    pub description: Option<Description>,
    pub color: Option<HexColor>,
    pub icon: Option<NonEmptyString>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}
