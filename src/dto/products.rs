use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::product::{Dimensions, Product, ProductImage};

/// Stock block with derived availability flags.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StockDto {
    pub quantity: i32,
    pub min_stock: i32,
    pub track_stock: bool,
    pub is_low: bool,
    pub is_out: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductDto {
    pub id: i32,
    pub name: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub slug: String,
    pub sku: String,
    pub category_id: i32,
    pub subcategory_id: i32,
    /// Populated on detail reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory_name: Option<String>,
    pub price: f64,
    pub compare_price: Option<f64>,
    pub cost: Option<f64>,
    pub stock: StockDto,
    pub dimensions: Option<Dimensions>,
    pub images: Vec<ProductImage>,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_digital: bool,
    pub sort_order: i32,
    pub created_by: i32,
    pub updated_by: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Product> for ProductDto {
    fn from(value: Product) -> Self {
        let stock = StockDto {
            quantity: value.stock.quantity.get(),
            min_stock: value.stock.min_stock.get(),
            track_stock: value.stock.track_stock,
            is_low: value.stock.is_low(),
            is_out: value.stock.is_out(),
        };
        Self {
            id: value.id.get(),
            name: value.name.into_inner(),
            short_description: value.short_description.map(|d| d.into_inner()),
            description: value.description.map(|d| d.into_inner()),
            slug: value.slug.into_inner(),
            sku: value.sku.into_inner(),
            category_id: value.category_id.get(),
            subcategory_id: value.subcategory_id.get(),
            category_name: None,
            subcategory_name: None,
            price: value.price.get(),
            compare_price: value.compare_price.map(|p| p.get()),
            cost: value.cost.map(|c| c.get()),
            stock,
            dimensions: value.dimensions,
            images: value.images,
            tags: value.tags.into_iter().map(|t| t.into_inner()).collect(),
            is_active: value.is_active,
            is_featured: value.is_featured,
            is_digital: value.is_digital,
            sort_order: value.sort_order,
            created_by: value.created_by.get(),
            updated_by: value.updated_by.map(|u| u.get()),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl ProductDto {
    pub fn with_parent_names(
        mut self,
        category_name: impl Into<String>,
        subcategory_name: impl Into<String>,
    ) -> Self {
        self.category_name = Some(category_name.into());
        self.subcategory_name = Some(subcategory_name.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductStatsDto {
    pub total: usize,
    pub active: usize,
    pub featured: usize,
    pub digital: usize,
    pub total_price: f64,
    pub average_price: f64,
    pub low_stock: Vec<ProductDto>,
    pub most_expensive: Vec<ProductDto>,
}
