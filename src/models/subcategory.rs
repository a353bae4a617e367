use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::subcategory::{
    NewSubcategory as DomainNewSubcategory, Subcategory as DomainSubcategory, SubcategoryPatch,
};
use crate::domain::types::{
    Description, HexColor, NonEmptyString, SubcategoryName, TypeConstraintError, UserId,
};

/// Diesel model representing the `subcategories` table.
#[derive(Debug, Clone, Identifiable, Queryable, Associations)]
#[diesel(table_name = crate::schema::subcategories)]
#[diesel(belongs_to(crate::models::category::Category))]
pub struct Subcategory {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub slug: String,
    pub is_active: bool,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub category_id: i32,
    pub sort_order: i32,
    pub created_by: i32,
    pub updated_by: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`Subcategory`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::subcategories)]
pub struct NewSubcategory {
    pub name: String,
    pub description: Option<String>,
    pub slug: String,
    pub is_active: bool,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub category_id: i32,
    pub sort_order: i32,
    pub created_by: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Changeset for partial subcategory updates.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::subcategories)]
pub struct SubcategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub is_active: Option<bool>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub category_id: Option<i32>,
    pub sort_order: Option<i32>,
    pub updated_by: i32,
    pub updated_at: NaiveDateTime,
}

impl SubcategoryChanges {
    pub fn from_patch(patch: SubcategoryPatch, updated_by: UserId, now: NaiveDateTime) -> Self {
        Self {
            name: patch.name.map(SubcategoryName::into_inner),
            description: patch.description.map(Description::into_inner),
            slug: patch.slug.map(Into::into),
            is_active: patch.is_active,
            color: patch.color.map(HexColor::into_inner),
            icon: patch.icon.map(NonEmptyString::into_inner),
            category_id: patch.category_id.map(Into::into),
            sort_order: patch.sort_order,
            updated_by: updated_by.get(),
            updated_at: now,
        }
    }
}

impl TryFrom<Subcategory> for DomainSubcategory {
    type Error = TypeConstraintError;

    fn try_from(subcategory: Subcategory) -> Result<Self, Self::Error> {
        Ok(Self {
            id: subcategory.id.try_into()?,
            name: SubcategoryName::new(subcategory.name)?,
            description: subcategory.description.map(Description::new).transpose()?,
            slug: subcategory.slug.try_into()?,
            is_active: subcategory.is_active,
            color: subcategory.color.map(HexColor::new).transpose()?,
            icon: subcategory
                .icon
                .map(|icon| NonEmptyString::new_for_field(icon, "icon"))
                .transpose()?,
            category_id: subcategory.category_id.try_into()?,
            sort_order: subcategory.sort_order,
            created_by: subcategory.created_by.try_into()?,
            updated_by: subcategory.updated_by.map(TryInto::try_into).transpose()?,
            created_at: subcategory.created_at,
            updated_at: subcategory.updated_at,
        })
    }
}

impl From<DomainNewSubcategory> for NewSubcategory {
    fn from(subcategory: DomainNewSubcategory) -> Self {
        Self {
            name: subcategory.name.into_inner(),
            description: subcategory.description.map(Description::into_inner),
            slug: subcategory.slug.into_inner(),
            is_active: subcategory.is_active,
            color: subcategory.color.map(HexColor::into_inner),
            icon: subcategory.icon.map(NonEmptyString::into_inner),
            category_id: subcategory.category_id.get(),
            sort_order: subcategory.sort_order,
            created_by: subcategory.created_by.get(),
            created_at: subcategory.created_at,
            updated_at: subcategory.updated_at,
        }
    }
}
