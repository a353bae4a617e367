//! Fixture builders shared by service unit tests.

use chrono::Utc;

use crate::auth::AuthenticatedUser;
use crate::domain::category::Category;
use crate::domain::product::{Product, Stock};
use crate::domain::slug::Slug;
use crate::domain::subcategory::Subcategory;
use crate::domain::types::{
    CategoryId, CategoryName, Description, Email, PersonName, Phone, ProductId, ProductName,
    ProductPrice, Role, Sku, StockCount, SubcategoryId, SubcategoryName, UserId, Username,
};
use crate::domain::user::User;

pub fn admin() -> AuthenticatedUser {
    AuthenticatedUser {
        id: UserId::new(1).unwrap(),
        username: Username::new("admin").unwrap(),
        email: Email::new("admin@example.com").unwrap(),
        role: Role::Admin,
    }
}

pub fn coordinator() -> AuthenticatedUser {
    AuthenticatedUser {
        id: UserId::new(2).unwrap(),
        username: Username::new("coordinator").unwrap(),
        email: Email::new("coordinator@example.com").unwrap(),
        role: Role::Coordinador,
    }
}

pub fn category(id: i32, name: &str, is_active: bool) -> Category {
    let now = Utc::now().naive_utc();
    Category {
        id: CategoryId::new(id).unwrap(),
        name: CategoryName::new(name).unwrap(),
        description: Description::new(format!("{name} description")).unwrap(),
        slug: Slug::derive(name),
        is_active,
        color: None,
        icon: None,
        sort_order: id,
        created_by: UserId::new(1).unwrap(),
        updated_by: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn subcategory(id: i32, category_id: i32, name: &str, is_active: bool) -> Subcategory {
    let now = Utc::now().naive_utc();
    Subcategory {
        id: SubcategoryId::new(id).unwrap(),
        name: SubcategoryName::new(name).unwrap(),
        description: None,
        slug: Slug::derive(name),
        is_active,
        color: None,
        icon: None,
        category_id: CategoryId::new(category_id).unwrap(),
        sort_order: id,
        created_by: UserId::new(1).unwrap(),
        updated_by: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn product(
    id: i32,
    category_id: i32,
    subcategory_id: i32,
    name: &str,
    sku: &str,
    price: f64,
    is_active: bool,
) -> Product {
    let now = Utc::now().naive_utc();
    Product {
        id: ProductId::new(id).unwrap(),
        name: ProductName::new(name).unwrap(),
        short_description: None,
        description: None,
        slug: Slug::derive(name),
        sku: Sku::new(sku).unwrap(),
        category_id: CategoryId::new(category_id).unwrap(),
        subcategory_id: SubcategoryId::new(subcategory_id).unwrap(),
        price: ProductPrice::new(price).unwrap(),
        compare_price: None,
        cost: None,
        stock: Stock::default(),
        dimensions: None,
        images: vec![],
        tags: vec![],
        is_active,
        is_featured: false,
        is_digital: false,
        sort_order: id,
        created_by: UserId::new(1).unwrap(),
        updated_by: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn stock(quantity: i32, min_stock: i32, track_stock: bool) -> Stock {
    Stock {
        quantity: StockCount::new(quantity).unwrap(),
        min_stock: StockCount::new(min_stock).unwrap(),
        track_stock,
    }
}

pub fn user(id: i32, username: &str, role: Role, is_active: bool, password_hash: &str) -> User {
    let now = Utc::now().naive_utc();
    User {
        id: UserId::new(id).unwrap(),
        username: Username::new(username).unwrap(),
        email: Email::new(format!("{username}@example.com")).unwrap(),
        password_hash: password_hash.to_string(),
        first_name: PersonName::new("Test").unwrap(),
        last_name: PersonName::new(username).unwrap(),
        role,
        is_active,
        phone: Phone::new("5551234567").unwrap(),
        last_login: None,
        created_by: None,
        created_at: now,
        updated_at: now,
    }
}
