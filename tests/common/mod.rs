//! Helpers for integration tests.

use chrono::Utc;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tempfile::NamedTempFile;

use catalogo_api::db::{DbPool, establish_connection_pool};
use catalogo_api::domain::category::{Category, NewCategory};
use catalogo_api::domain::product::{NewProduct, Product, Stock};
use catalogo_api::domain::slug::Slug;
use catalogo_api::domain::subcategory::{NewSubcategory, Subcategory};
use catalogo_api::domain::types::{
    CategoryId, CategoryName, Description, Email, PersonName, Phone, ProductName, ProductPrice,
    Role, Sku, SubcategoryId, SubcategoryName, UserId, Username,
};
use catalogo_api::domain::user::{NewUser, User};
use catalogo_api::repository::{
    CategoryWriter, DieselRepository, ProductWriter, SubcategoryWriter, UserWriter,
};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Temporary database used in integration tests.
pub struct TestDb {
    _tempfile: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let tempfile = NamedTempFile::new().expect("Failed to create temp file");
        let pool = establish_connection_pool(tempfile.path().to_str().unwrap())
            .expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");
        TestDb {
            _tempfile: tempfile,
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

pub fn seed_user(repo: &DieselRepository, username: &str, role: Role) -> User {
    let now = Utc::now().naive_utc();
    repo.create_user(&NewUser {
        username: Username::new(username).expect("valid username"),
        email: Email::new(format!("{username}@example.com")).expect("valid email"),
        password_hash: "$argon2id$stub".to_string(),
        first_name: PersonName::new("Test").expect("valid name"),
        last_name: PersonName::new(username).expect("valid name"),
        role,
        is_active: true,
        phone: Phone::new("5551234567").expect("valid phone"),
        created_by: None,
        created_at: now,
        updated_at: now,
    })
    .expect("should create user")
}

pub fn seed_category(repo: &DieselRepository, name: &str, created_by: UserId) -> Category {
    let now = Utc::now().naive_utc();
    repo.create_category(&NewCategory {
        name: CategoryName::new(name).expect("valid category name"),
        description: Description::new(format!("{name} description")).expect("valid description"),
        slug: Slug::derive(name),
        is_active: true,
        color: None,
        icon: None,
        sort_order: 0,
        created_by,
        created_at: now,
        updated_at: now,
    })
    .expect("should create category")
}

pub fn seed_subcategory(
    repo: &DieselRepository,
    category_id: CategoryId,
    name: &str,
    created_by: UserId,
) -> Subcategory {
    let now = Utc::now().naive_utc();
    repo.create_subcategory(&NewSubcategory {
        name: SubcategoryName::new(name).expect("valid subcategory name"),
        description: None,
        slug: Slug::derive(name),
        is_active: true,
        color: None,
        icon: None,
        category_id,
        sort_order: 0,
        created_by,
        created_at: now,
        updated_at: now,
    })
    .expect("should create subcategory")
}

pub fn seed_product(
    repo: &DieselRepository,
    category_id: CategoryId,
    subcategory_id: SubcategoryId,
    name: &str,
    sku: &str,
    price: f64,
    created_by: UserId,
) -> Product {
    let now = Utc::now().naive_utc();
    repo.create_product(&NewProduct {
        name: ProductName::new(name).expect("valid product name"),
        short_description: None,
        description: None,
        slug: Slug::derive(name),
        sku: Sku::new(sku).expect("valid sku"),
        category_id,
        subcategory_id,
        price: ProductPrice::new(price).expect("valid price"),
        compare_price: None,
        cost: None,
        stock: Stock::default(),
        dimensions: None,
        images: vec![],
        tags: vec![],
        is_active: true,
        is_featured: false,
        is_digital: false,
        sort_order: 0,
        created_by,
        created_at: now,
        updated_at: now,
    })
    .expect("should create product")
}
