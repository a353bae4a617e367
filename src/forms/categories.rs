use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use crate::domain::category::{CategoryPatch, NewCategory};
use crate::domain::slug::Slug;
use crate::domain::types::{
    CategoryId, CategoryName, Description, HexColor, NonEmptyString, UserId,
};
use crate::forms::FormError;

/// Query parameters accepted by the category list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryListParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryForm {
    #[validate(length(min = 3, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateCategoryPayload {
    pub name: CategoryName,
    pub description: Description,
    pub color: Option<HexColor>,
    pub icon: Option<NonEmptyString>,
    pub is_active: bool,
    pub sort_order: i32,
}

impl CreateCategoryPayload {
    /// Build the insertable record, deriving the slug from the name.
    pub fn into_new_category(self, created_by: UserId) -> NewCategory {
        let now = Utc::now().naive_utc();
        let slug = Slug::derive(self.name.as_str());
        NewCategory {
            name: self.name,
            description: self.description,
            slug,
            is_active: self.is_active,
            color: self.color,
            icon: self.icon,
            sort_order: self.sort_order,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<CreateCategoryForm> for CreateCategoryPayload {
    type Error = FormError;

    fn try_from(value: CreateCategoryForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            name: CategoryName::new(value.name)?,
            description: Description::new(value.description)?,
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
pub struct UpdateCategoryForm {
    #[validate(length(min = 3, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateCategoryPayload {
    pub name: Option<CategoryName>,
    pub description: Option<Description>,
    pub color: Option<HexColor>,
    pub icon: Option<NonEmptyString>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

impl UpdateCategoryPayload {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.color.is_none()
            && self.icon.is_none()
            && self.is_active.is_none()
            && self.sort_order.is_none()
    }

    /// Build the changeset; a name change recomputes the slug.
    pub fn into_patch(self) -> CategoryPatch {
        let slug = self.name.as_ref().map(|name| Slug::derive(name.as_str()));
        CategoryPatch {
            name: self.name,
            slug,
            description: self.description,
            color: self.color,
            icon: self.icon,
            is_active: self.is_active,
            sort_order: self.sort_order,
        }
    }
}

impl TryFrom<UpdateCategoryForm> for UpdateCategoryPayload {
    type Error = FormError;

    fn try_from(value: UpdateCategoryForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            name: value.name.map(CategoryName::new).transpose()?,
            description: value.description.map(Description::new).transpose()?,
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
pub struct ReorderCategoriesForm {
    #[validate(length(min = 1))]
    pub ids: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReorderCategoriesPayload {
    pub ids: Vec<CategoryId>,
}

impl TryFrom<ReorderCategoriesForm> for ReorderCategoriesPayload {
    type Error = FormError;

    fn try_from(value: ReorderCategoriesForm) -> Result<Self, Self::Error> {
        value.validate()?;
        let ids = value
            .ids
            .into_iter()
            .map(CategoryId::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ids })
    }
}
