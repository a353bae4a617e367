use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use crate::domain::product::{Dimensions, NewProduct, ProductImage, ProductPatch, Stock};
use crate::domain::slug::Slug;
use crate::domain::types::{
    CategoryId, Description, DimensionValue, ImageUrl, MoneyAmount, ProductId, ProductName,
    ProductPrice, Sku, StockCount, SubcategoryId, Tag, UserId,
};
use crate::forms::FormError;

/// Query parameters accepted by the product list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub category_id: Option<i32>,
    pub subcategory_id: Option<i32>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    #[serde(default)]
    pub low_stock: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct StockForm {
    pub quantity: Option<i32>,
    pub min_stock: Option<i32>,
    pub track_stock: Option<bool>,
}

impl StockForm {
    /// Negative counters clamp to zero rather than erroring.
    fn into_stock(self) -> Result<Stock, FormError> {
        Ok(Stock {
            quantity: StockCount::new(self.quantity.unwrap_or(0).max(0))?,
            min_stock: StockCount::new(self.min_stock.unwrap_or(0).max(0))?,
            track_stock: self.track_stock.unwrap_or(false),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DimensionsForm {
    pub weight: Option<f64>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl DimensionsForm {
    fn into_dimensions(self) -> Result<Dimensions, FormError> {
        Ok(Dimensions {
            weight: self.weight.map(DimensionValue::new).transpose()?,
            length: self.length.map(DimensionValue::new).transpose()?,
            width: self.width.map(DimensionValue::new).transpose()?,
            height: self.height.map(DimensionValue::new).transpose()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ImageForm {
    pub url: String,
    pub alt: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

impl ImageForm {
    fn into_image(self) -> Result<ProductImage, FormError> {
        Ok(ProductImage {
            url: ImageUrl::new(self.url)?,
            alt: self.alt,
            is_primary: self.is_primary,
        })
    }
}

fn convert_images(images: Vec<ImageForm>) -> Result<Vec<ProductImage>, FormError> {
    images.into_iter().map(ImageForm::into_image).collect()
}

fn convert_tags(tags: Vec<String>) -> Result<Vec<Tag>, FormError> {
    tags.into_iter()
        .map(|tag| Tag::new(tag).map_err(Into::into))
        .collect()
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductForm {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 500))]
    pub short_description: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub description: Option<String>,
    #[validate(length(min = 3, max = 50))]
    pub sku: String,
    #[validate(range(min = 1))]
    pub category_id: i32,
    #[validate(range(min = 1))]
    pub subcategory_id: i32,
    pub price: f64,
    pub compare_price: Option<f64>,
    pub cost: Option<f64>,
    pub stock: Option<StockForm>,
    pub dimensions: Option<DimensionsForm>,
    #[serde(default)]
    pub images: Vec<ImageForm>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_digital: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateProductPayload {
    pub name: ProductName,
    pub short_description: Option<Description>,
    pub description: Option<Description>,
    pub sku: Sku,
    pub category_id: CategoryId,
    pub subcategory_id: SubcategoryId,
    pub price: ProductPrice,
    pub compare_price: Option<MoneyAmount>,
    pub cost: Option<MoneyAmount>,
    pub stock: Stock,
    pub dimensions: Option<Dimensions>,
    pub images: Vec<ProductImage>,
    pub tags: Vec<Tag>,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_digital: bool,
    pub sort_order: i32,
}

impl CreateProductPayload {
    /// Build the insertable record, deriving the slug from the name.
    pub fn into_new_product(self, created_by: UserId) -> NewProduct {
        let now = Utc::now().naive_utc();
        let slug = Slug::derive(self.name.as_str());
        NewProduct {
            name: self.name,
            short_description: self.short_description,
            description: self.description,
            slug,
            sku: self.sku,
            category_id: self.category_id,
            subcategory_id: self.subcategory_id,
            price: self.price,
            compare_price: self.compare_price,
            cost: self.cost,
            stock: self.stock,
            dimensions: self.dimensions,
            images: self.images,
            tags: self.tags,
            is_active: self.is_active,
            is_featured: self.is_featured,
            is_digital: self.is_digital,
            sort_order: self.sort_order,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<CreateProductForm> for CreateProductPayload {
    type Error = FormError;

    fn try_from(value: CreateProductForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            name: ProductName::new(value.name)?,
            short_description: value.short_description.map(Description::new).transpose()?,
            description: value.description.map(Description::new).transpose()?,
            sku: Sku::new(value.sku)?,
            category_id: CategoryId::new(value.category_id)?,
            subcategory_id: SubcategoryId::new(value.subcategory_id)?,
            price: ProductPrice::new(value.price)?,
            compare_price: value.compare_price.map(MoneyAmount::new).transpose()?,
            cost: value.cost.map(MoneyAmount::new).transpose()?,
            stock: value.stock.unwrap_or_default().into_stock()?,
            dimensions: value
                .dimensions
                .map(DimensionsForm::into_dimensions)
                .transpose()?,
            images: convert_images(value.images)?,
            tags: convert_tags(value.tags)?,
            is_active: value.is_active.unwrap_or(true),
            is_featured: value.is_featured.unwrap_or(false),
            is_digital: value.is_digital.unwrap_or(false),
            sort_order: value.sort_order.unwrap_or(0),
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProductForm {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub short_description: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub description: Option<String>,
    #[validate(length(min = 3, max = 50))]
    pub sku: Option<String>,
    #[validate(range(min = 1))]
    pub category_id: Option<i32>,
    #[validate(range(min = 1))]
    pub subcategory_id: Option<i32>,
    pub price: Option<f64>,
    pub compare_price: Option<f64>,
    pub cost: Option<f64>,
    pub stock: Option<StockForm>,
    pub dimensions: Option<DimensionsForm>,
    pub images: Option<Vec<ImageForm>>,
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_digital: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateProductPayload {
    pub name: Option<ProductName>,
    pub short_description: Option<Description>,
    pub description: Option<Description>,
    pub sku: Option<Sku>,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    pub price: Option<ProductPrice>,
    pub compare_price: Option<MoneyAmount>,
    pub cost: Option<MoneyAmount>,
    pub stock: Option<Stock>,
    pub dimensions: Option<Dimensions>,
    pub images: Option<Vec<ProductImage>>,
    pub tags: Option<Vec<Tag>>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_digital: Option<bool>,
    pub sort_order: Option<i32>,
}

impl UpdateProductPayload {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.short_description.is_none()
            && self.description.is_none()
            && self.sku.is_none()
            && self.category_id.is_none()
            && self.subcategory_id.is_none()
            && self.price.is_none()
            && self.compare_price.is_none()
            && self.cost.is_none()
            && self.stock.is_none()
            && self.dimensions.is_none()
            && self.images.is_none()
            && self.tags.is_none()
            && self.is_active.is_none()
            && self.is_featured.is_none()
            && self.is_digital.is_none()
            && self.sort_order.is_none()
    }

    /// Build the changeset; a name change recomputes the slug.
    pub fn into_patch(self) -> ProductPatch {
        let slug = self.name.as_ref().map(|name| Slug::derive(name.as_str()));
        ProductPatch {
            name: self.name,
            slug,
            short_description: self.short_description,
            description: self.description,
            sku: self.sku,
            category_id: self.category_id,
            subcategory_id: self.subcategory_id,
            price: self.price,
            compare_price: self.compare_price,
            cost: self.cost,
            stock: self.stock,
            dimensions: self.dimensions,
            images: self.images,
            tags: self.tags,
            is_active: self.is_active,
            is_featured: self.is_featured,
            is_digital: self.is_digital,
            sort_order: self.sort_order,
        }
    }
}

impl TryFrom<UpdateProductForm> for UpdateProductPayload {
    type Error = FormError;

    fn try_from(value: UpdateProductForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            name: value.name.map(ProductName::new).transpose()?,
            short_description: value.short_description.map(Description::new).transpose()?,
            description: value.description.map(Description::new).transpose()?,
            sku: value.sku.map(Sku::new).transpose()?,
            category_id: value.category_id.map(CategoryId::new).transpose()?,
            subcategory_id: value.subcategory_id.map(SubcategoryId::new).transpose()?,
            price: value.price.map(ProductPrice::new).transpose()?,
            compare_price: value.compare_price.map(MoneyAmount::new).transpose()?,
            cost: value.cost.map(MoneyAmount::new).transpose()?,
            stock: value.stock.map(StockForm::into_stock).transpose()?,
            dimensions: value
                .dimensions
                .map(DimensionsForm::into_dimensions)
                .transpose()?,
            images: value.images.map(convert_images).transpose()?,
            tags: value.tags.map(convert_tags).transpose()?,
            is_active: value.is_active,
            is_featured: value.is_featured,
            is_digital: value.is_digital,
            sort_order: value.sort_order,
        })
    }
}

/// Stock adjustment for one product.
#[derive(Debug, Deserialize)]
pub struct UpdateStockForm {
    pub quantity: i32,
    pub min_stock: Option<i32>,
    pub track_stock: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateStockPayload {
    pub quantity: StockCount,
    pub min_stock: Option<StockCount>,
    pub track_stock: Option<bool>,
}

impl TryFrom<UpdateStockForm> for UpdateStockPayload {
    type Error = FormError;

    fn try_from(value: UpdateStockForm) -> Result<Self, Self::Error> {
        Ok(Self {
            // Negative quantities clamp to zero.
            quantity: StockCount::new(value.quantity.max(0))?,
            min_stock: value
                .min_stock
                .map(|m| StockCount::new(m.max(0)))
                .transpose()?,
            track_stock: value.track_stock,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReorderProductsForm {
    #[validate(length(min = 1))]
    pub ids: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReorderProductsPayload {
    pub ids: Vec<ProductId>,
}

impl TryFrom<ReorderProductsForm> for ReorderProductsPayload {
    type Error = FormError;

    fn try_from(value: ReorderProductsForm) -> Result<Self, Self::Error> {
        value.validate()?;
        let ids = value
            .ids
            .into_iter()
            .map(ProductId::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ids })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_form() -> CreateProductForm {
        CreateProductForm {
            name: "Cola 600ml".to_string(),
            short_description: None,
            description: None,
            sku: "col-600".to_string(),
            category_id: 1,
            subcategory_id: 2,
            price: 18.5,
            compare_price: None,
            cost: None,
            stock: None,
            dimensions: None,
            images: vec![],
            tags: vec!["Fizzy".to_string()],
            is_active: None,
            is_featured: None,
            is_digital: None,
            sort_order: None,
        }
    }

    #[test]
    fn create_normalizes_sku_and_tags() {
        let payload = CreateProductPayload::try_from(minimal_form()).unwrap();
        assert_eq!(payload.sku.as_str(), "COL-600");
        assert_eq!(payload.tags[0].as_str(), "fizzy");
        let product = payload.into_new_product(UserId::new(1).unwrap());
        assert_eq!(product.slug.as_str(), "cola-600ml");
    }

    #[test]
    fn create_rejects_non_positive_price() {
        let mut form = minimal_form();
        form.price = 0.0;
        assert!(CreateProductPayload::try_from(form).is_err());
    }

    #[test]
    fn stock_update_clamps_negative_quantity() {
        let payload = UpdateStockPayload::try_from(UpdateStockForm {
            quantity: -4,
            min_stock: None,
            track_stock: None,
        })
        .unwrap();
        assert_eq!(payload.quantity.get(), 0);
    }
}
