use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::category::{
    Category as DomainCategory, CategoryPatch, NewCategory as DomainNewCategory,
};
use crate::domain::types::{
    CategoryName, Description, HexColor, NonEmptyString, TypeConstraintError, UserId,
};

/// Diesel model representing the `categories` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::categories)]
pub struct Category {
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

/// Insertable form of [`Category`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::categories)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
    pub slug: String,
    pub is_active: bool,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub created_by: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Changeset for partial category updates. `None` fields are skipped;
/// `updated_by`/`updated_at` are always written.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::categories)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub is_active: Option<bool>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
    pub updated_by: i32,
    pub updated_at: NaiveDateTime,
}

impl CategoryChanges {
    pub fn from_patch(patch: CategoryPatch, updated_by: UserId, now: NaiveDateTime) -> Self {
        Self {
            name: patch.name.map(CategoryName::into_inner),
            description: patch.description.map(Description::into_inner),
            slug: patch.slug.map(Into::into),
            is_active: patch.is_active,
            color: patch.color.map(HexColor::into_inner),
            icon: patch.icon.map(NonEmptyString::into_inner),
            sort_order: patch.sort_order,
            updated_by: updated_by.get(),
            updated_at: now,
        }
    }
}

impl TryFrom<Category> for DomainCategory {
    type Error = TypeConstraintError;

    fn try_from(category: Category) -> Result<Self, Self::Error> {
        Ok(Self {
            id: category.id.try_into()?,
            name: CategoryName::new(category.name)?,
            description: Description::new(category.description)?,
            slug: category.slug.try_into()?,
            is_active: category.is_active,
            color: category.color.map(HexColor::new).transpose()?,
            icon: category
                .icon
                .map(|icon| NonEmptyString::new_for_field(icon, "icon"))
                .transpose()?,
            sort_order: category.sort_order,
            created_by: category.created_by.try_into()?,
            updated_by: category.updated_by.map(TryInto::try_into).transpose()?,
            created_at: category.created_at,
            updated_at: category.updated_at,
        })
    }
}

impl From<DomainNewCategory> for NewCategory {
    fn from(category: DomainNewCategory) -> Self {
        Self {
            name: category.name.into_inner(),
            description: category.description.into_inner(),
            slug: category.slug.into_inner(),
            is_active: category.is_active,
            color: category.color.map(HexColor::into_inner),
            icon: category.icon.map(NonEmptyString::into_inner),
            sort_order: category.sort_order,
            created_by: category.created_by.get(),
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}
