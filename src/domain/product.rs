use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::slug::Slug;
use crate::domain::types::{
    CategoryId, Description, DimensionValue, ImageUrl, MoneyAmount, ProductId, ProductName,
    ProductPrice, Sku, StockCount, SubcategoryId, Tag, UserId,
};

/// Stock tracking block embedded in a product.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stock {
    pub quantity: StockCount,
    pub min_stock: StockCount,
    pub track_stock: bool,
}

impl Stock {
    /// A product is low on stock when tracking is enabled and the current
    /// quantity fell below the configured minimum.
    pub fn is_low(&self) -> bool {
        self.track_stock && self.quantity.get() < self.min_stock.get()
    }

    pub fn is_out(&self) -> bool {
        self.track_stock && self.quantity.get() == 0
    }
}

impl Default for Stock {
    fn default() -> Self {
        Self {
            quantity: StockCount::new(0).expect("zero is non-negative"),
            min_stock: StockCount::new(0).expect("zero is non-negative"),
            track_stock: false,
        }
    }
}

/// Optional physical dimensions of a product.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Dimensions {
    pub weight: Option<DimensionValue>,
    pub length: Option<DimensionValue>,
    pub width: Option<DimensionValue>,
    pub height: Option<DimensionValue>,
}

/// Product gallery entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductImage {
    pub url: ImageUrl,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

/// Leaf of the catalog hierarchy. References both its subcategory and that
/// subcategory's category; the two links must agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: ProductName,
    pub short_description: Option<Description>,
    pub description: Option<Description>,
    pub slug: Slug,
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
    pub created_by: UserId,
    pub updated_by: Option<UserId>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Information required to create a new [`Product`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProduct {
    pub name: ProductName,
    pub short_description: Option<Description>,
    pub description: Option<Description>,
    pub slug: Slug,
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
    pub created_by: UserId,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Partial update for a [`Product`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<ProductName>,
    pub slug: Option<Slug>,
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

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(quantity: i32, min_stock: i32, track_stock: bool) -> Stock {
        Stock {
            quantity: StockCount::new(quantity).unwrap(),
            min_stock: StockCount::new(min_stock).unwrap(),
            track_stock,
        }
    }

    #[test]
    fn low_stock_requires_tracking() {
        assert!(stock(1, 5, true).is_low());
        assert!(!stock(1, 5, false).is_low());
        assert!(!stock(5, 5, true).is_low());
    }

    #[test]
    fn out_of_stock_requires_tracking() {
        assert!(stock(0, 0, true).is_out());
        assert!(!stock(0, 0, false).is_out());
        assert!(!stock(3, 0, true).is_out());
    }
}
