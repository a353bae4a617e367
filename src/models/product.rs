use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::{
    Dimensions, NewProduct as DomainNewProduct, Product as DomainProduct, ProductImage,
    ProductPatch, Stock,
};
use crate::domain::types::{
    Description, MoneyAmount, ProductName, ProductPrice, Sku, StockCount, Tag, TypeConstraintError,
    UserId,
};

/// Diesel model representing the `products` table.
///
/// `images`, `tags` and `dimensions` are stored as JSON text and decoded
/// into domain values when crossing into the domain layer.
#[derive(Debug, Clone, Identifiable, Queryable, Associations)]
#[diesel(table_name = crate::schema::products)]
#[diesel(belongs_to(crate::models::subcategory::Subcategory))]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub slug: String,
    pub sku: String,
    pub category_id: i32,
    pub subcategory_id: i32,
    pub price: f64,
    pub compare_price: Option<f64>,
    pub cost: Option<f64>,
    pub stock_quantity: i32,
    pub min_stock: i32,
    pub track_stock: bool,
    pub dimensions: Option<String>,
    pub images: String,
    pub tags: String,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_digital: bool,
    pub sort_order: i32,
    pub created_by: i32,
    pub updated_by: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`Product`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct {
    pub name: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub slug: String,
    pub sku: String,
    pub category_id: i32,
    pub subcategory_id: i32,
    pub price: f64,
    pub compare_price: Option<f64>,
    pub cost: Option<f64>,
    pub stock_quantity: i32,
    pub min_stock: i32,
    pub track_stock: bool,
    pub dimensions: Option<String>,
    pub images: String,
    pub tags: String,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_digital: bool,
    pub sort_order: i32,
    pub created_by: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Changeset for partial product updates.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::products)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub sku: Option<String>,
    pub category_id: Option<i32>,
    pub subcategory_id: Option<i32>,
    pub price: Option<f64>,
    pub compare_price: Option<f64>,
    pub cost: Option<f64>,
    pub stock_quantity: Option<i32>,
    pub min_stock: Option<i32>,
    pub track_stock: Option<bool>,
    pub dimensions: Option<String>,
    pub images: Option<String>,
    pub tags: Option<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_digital: Option<bool>,
    pub sort_order: Option<i32>,
    pub updated_by: i32,
    pub updated_at: NaiveDateTime,
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, TypeConstraintError> {
    serde_json::to_string(value).map_err(|e| TypeConstraintError::InvalidValue(e.to_string()))
}

fn decode_json<T: serde::de::DeserializeOwned>(value: &str) -> Result<T, TypeConstraintError> {
    serde_json::from_str(value).map_err(|e| TypeConstraintError::InvalidValue(e.to_string()))
}

impl ProductChanges {
    pub fn from_patch(
        patch: ProductPatch,
        updated_by: UserId,
        now: NaiveDateTime,
    ) -> Result<Self, TypeConstraintError> {
        let (stock_quantity, min_stock, track_stock) = match patch.stock {
            Some(stock) => (
                Some(stock.quantity.get()),
                Some(stock.min_stock.get()),
                Some(stock.track_stock),
            ),
            None => (None, None, None),
        };
        Ok(Self {
            name: patch.name.map(ProductName::into_inner),
            short_description: patch.short_description.map(Description::into_inner),
            description: patch.description.map(Description::into_inner),
            slug: patch.slug.map(Into::into),
            sku: patch.sku.map(Sku::into_inner),
            category_id: patch.category_id.map(Into::into),
            subcategory_id: patch.subcategory_id.map(Into::into),
            price: patch.price.map(ProductPrice::get),
            compare_price: patch.compare_price.map(MoneyAmount::get),
            cost: patch.cost.map(MoneyAmount::get),
            stock_quantity,
            min_stock,
            track_stock,
            dimensions: patch
                .dimensions
                .map(|dims| encode_json(&dims))
                .transpose()?,
            images: patch.images.map(|images| encode_json(&images)).transpose()?,
            tags: patch.tags.map(|tags| encode_json(&tags)).transpose()?,
            is_active: patch.is_active,
            is_featured: patch.is_featured,
            is_digital: patch.is_digital,
            sort_order: patch.sort_order,
            updated_by: updated_by.get(),
            updated_at: now,
        })
    }
}

impl TryFrom<Product> for DomainProduct {
    type Error = TypeConstraintError;

    fn try_from(product: Product) -> Result<Self, Self::Error> {
        let images: Vec<ProductImage> = decode_json(&product.images)?;
        let tags: Vec<Tag> = decode_json(&product.tags)?;
        let dimensions: Option<Dimensions> = product
            .dimensions
            .as_deref()
            .map(decode_json)
            .transpose()?;
        Ok(Self {
            id: product.id.try_into()?,
            name: ProductName::new(product.name)?,
            short_description: product
                .short_description
                .map(Description::new)
                .transpose()?,
            description: product.description.map(Description::new).transpose()?,
            slug: product.slug.try_into()?,
            sku: Sku::new(product.sku)?,
            category_id: product.category_id.try_into()?,
            subcategory_id: product.subcategory_id.try_into()?,
            price: ProductPrice::new(product.price)?,
            compare_price: product.compare_price.map(MoneyAmount::new).transpose()?,
            cost: product.cost.map(MoneyAmount::new).transpose()?,
            stock: Stock {
                quantity: StockCount::new(product.stock_quantity)?,
                min_stock: StockCount::new(product.min_stock)?,
                track_stock: product.track_stock,
            },
            dimensions,
            images,
            tags,
            is_active: product.is_active,
            is_featured: product.is_featured,
            is_digital: product.is_digital,
            sort_order: product.sort_order,
            created_by: product.created_by.try_into()?,
            updated_by: product.updated_by.map(TryInto::try_into).transpose()?,
            created_at: product.created_at,
            updated_at: product.updated_at,
        })
    }
}

impl TryFrom<DomainNewProduct> for NewProduct {
    type Error = TypeConstraintError;

    fn try_from(product: DomainNewProduct) -> Result<Self, Self::Error> {
        Ok(Self {
            name: product.name.into_inner(),
            short_description: product.short_description.map(Description::into_inner),
            description: product.description.map(Description::into_inner),
            slug: product.slug.into_inner(),
            sku: product.sku.into_inner(),
            category_id: product.category_id.get(),
            subcategory_id: product.subcategory_id.get(),
            price: product.price.get(),
            compare_price: product.compare_price.map(MoneyAmount::get),
            cost: product.cost.map(MoneyAmount::get),
            stock_quantity: product.stock.quantity.get(),
            min_stock: product.stock.min_stock.get(),
            track_stock: product.stock.track_stock,
            dimensions: product
                .dimensions
                .map(|dims| encode_json(&dims))
                .transpose()?,
            images: encode_json(&product.images)?,
            tags: encode_json(&product.tags)?,
            is_active: product.is_active,
            is_featured: product.is_featured,
            is_digital: product.is_digital,
            sort_order: product.sort_order,
            created_by: product.created_by.get(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        })
    }
}
