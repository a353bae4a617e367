use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use crate::domain::slug::Slug;
use crate::domain::subcategory::{NewSubcategory, SubcategoryPatch};
use crate::domain::types::{
    CategoryId, Description, HexColor, NonEmptyString, SubcategoryName, UserId,
};
use crate::forms::FormError;

/// Query parameters accepted by the subcategory list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SubcategoryListParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub category_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubcategoryForm {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub category_id: i32,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateSubcategoryPayload {
    pub name: SubcategoryName,
    pub description: Option<Description>,
    pub category_id: CategoryId,
    pub color: Option<HexColor>,
    pub icon: Option<NonEmptyString>,
    pub is_active: bool,
    pub sort_order: i32,
}

impl CreateSubcategoryPayload {
    /// Build the insertable record, deriving the slug from the name.
    pub fn into_new_subcategory(self, created_by: UserId) -> NewSubcategory {
        let now = Utc::now().naive_utc();
        let slug = Slug::derive(self.name.as_str());
        NewSubcategory {
            name: self.name,
            description: self.description,
            slug,
            is_active: self.is_active,
            color: self.color,
            icon: self.icon,
            category_id: self.category_id,
            sort_order: self.sort_order,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<CreateSubcategoryForm> for CreateSubcategoryPayload {
    type Error = FormError;

    fn try_from(value: CreateSubcategoryForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            name: SubcategoryName::new(value.name)?,
            description: value.description.map(Description::new).transpose()?,
            category_id: CategoryId::new(value.category_id)?,
            color: value.color.map(HexColor::new).transpose()?,
            icon: value
                .icon
                .map(|icon| NonEmptyString::new_for_field(icon, "icon"))
                .transpose()?,
            is_active: value.is_active.unwrap_or(true),
            sort_order: value.sort_order.unwrap_or(0),
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSubcategoryForm {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub category_id: Option<i32>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSubcategoryPayload {
    pub name: Option<SubcategoryName>,
    pub description: Option<Description>,
    pub category_id: Option<CategoryId>,
    pub color: Option<HexColor>,
    pub icon: Option<NonEmptyString>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

impl UpdateSubcategoryPayload {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
            && self.color.is_none()
            && self.icon.is_none()
            && self.is_active.is_none()
            && self.sort_order.is_none()
    }

    /// Build the changeset; a name change recomputes the slug.
    pub fn into_patch(self) -> SubcategoryPatch {
        let slug = self.name.as_ref().map(|name| Slug::derive(name.as_str()));
        SubcategoryPatch {
            name: self.name,
            slug,
            description: self.description,
            color: self.color,
            icon: self.icon,
            category_id: self.category_id,
            is_active: self.is_active,
            sort_order: self.sort_order,
        }
    }
}

impl TryFrom<UpdateSubcategoryForm> for UpdateSubcategoryPayload {
    type Error = FormError;

    fn try_from(value: UpdateSubcategoryForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            name: value.name.map(SubcategoryName::new).transpose()?,
            description: value.description.map(Description::new).transpose()?,
            category_id: value.category_id.map(CategoryId::new).transpose()?,
            color: value.color.map(HexColor::new).transpose()?,
            icon: value
                .icon
                .map(|icon| NonEmptyString::new_for_field(icon, "icon"))
                .transpose()?,
            is_active: value.is_active,
            sort_order: value.sort_order,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReorderSubcategoriesForm {
    #[validate(length(min = 1))]
    pub ids: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReorderSubcategoriesPayload {
    pub ids: Vec<crate::domain::types::SubcategoryId>,
}

impl TryFrom<ReorderSubcategoriesForm> for ReorderSubcategoriesPayload {
    type Error = FormError;

    fn try_from(value: ReorderSubcategoriesForm) -> Result<Self, Self::Error> {
        value.validate()?;
        let ids = value
            .ids
            .into_iter()
            .map(crate::domain::types::SubcategoryId::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ids })
    }
}
