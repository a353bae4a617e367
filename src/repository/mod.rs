use diesel::define_sql_function;
use diesel::sql_types::Text;

use crate::db::{DbConnection, DbPool};
use crate::domain::category::{Category, CategoryPatch, NewCategory};
use crate::domain::product::{NewProduct, Product, ProductPatch};
use crate::domain::subcategory::{NewSubcategory, Subcategory, SubcategoryPatch};
use crate::domain::types::{CategoryId, ProductId, Role, SubcategoryId, UserId};
use crate::domain::user::{NewUser, User, UserPatch};
use crate::pagination::Pagination;
use crate::repository::errors::RepositoryResult;

pub mod category;
pub mod errors;
pub mod product;
pub mod subcategory;
#[cfg(test)]
pub mod test;
pub mod user;

define_sql_function! {
    /// SQL `lower()`, used for case-insensitive lookups.
    fn lower(x: Text) -> Text;
}

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Query parameters for listing categories.
#[derive(Debug, Clone, Default)]
pub struct CategoryListQuery {
    /// Case-insensitive substring over name and description.
    pub search: Option<String>,
    /// Restrict to active or inactive records.
    pub is_active: Option<bool>,
    /// Pagination parameters.
    pub pagination: Option<Pagination>,
}

impl CategoryListQuery {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Query parameters for listing subcategories.
#[derive(Debug, Clone, Default)]
pub struct SubcategoryListQuery {
    /// Restrict to children of one category.
    pub category_id: Option<CategoryId>,
    /// Case-insensitive substring over name and description.
    pub search: Option<String>,
    /// Restrict to active or inactive records.
    pub is_active: Option<bool>,
    /// Pagination parameters.
    pub pagination: Option<Pagination>,
}

impl SubcategoryListQuery {
    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Query parameters for listing products.
#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    /// Restrict to active or inactive records.
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Only products with tracking enabled and quantity below minimum.
    pub low_stock: bool,
    /// Case-insensitive substring over name, description, SKU and tags.
    pub search: Option<String>,
    /// Pagination parameters.
    pub pagination: Option<Pagination>,
}

impl ProductListQuery {
    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }
    pub fn subcategory(mut self, subcategory_id: SubcategoryId) -> Self {
        self.subcategory_id = Some(subcategory_id);
        self
    }
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
    pub fn featured(mut self, is_featured: bool) -> Self {
        self.is_featured = Some(is_featured);
        self
    }
    pub fn price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }
    pub fn low_stock(mut self) -> Self {
        self.low_stock = true;
        self
    }
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Query parameters for listing users.
#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    /// Case-insensitive substring over username, email and names.
    pub search: Option<String>,
    /// Pagination parameters.
    pub pagination: Option<Pagination>,
}

impl UserListQuery {
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Dependent-record counts used by deletion guards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryDependents {
    pub subcategories: usize,
    pub products: usize,
}

impl CategoryDependents {
    pub fn any(&self) -> bool {
        self.subcategories > 0 || self.products > 0
    }
}

/// Aggregates backing the category stats endpoint.
#[derive(Debug, Clone)]
pub struct CategoryStats {
    pub total: usize,
    pub active: usize,
    /// Top categories by subcategory count, largest first.
    pub top_by_subcategories: Vec<(Category, usize)>,
}

/// Aggregates backing the subcategory stats endpoint.
#[derive(Debug, Clone)]
pub struct SubcategoryStats {
    pub total: usize,
    pub active: usize,
    /// Top subcategories by product count, largest first.
    pub top_by_products: Vec<(Subcategory, usize)>,
}

/// Aggregates backing the product stats endpoint.
#[derive(Debug, Clone)]
pub struct ProductStats {
    pub total: usize,
    pub active: usize,
    pub featured: usize,
    pub digital: usize,
    pub total_price: f64,
    pub average_price: f64,
    /// Active products with tracking enabled and quantity below minimum.
    pub low_stock: Vec<Product>,
    /// Most expensive active products, priciest first.
    pub most_expensive: Vec<Product>,
}

/// Aggregates backing the user stats endpoint.
#[derive(Debug, Clone)]
pub struct UserStats {
    pub total: usize,
    pub active: usize,
    pub admins: usize,
    pub coordinators: usize,
    /// Most recently created users, newest first.
    pub recent: Vec<User>,
}

/// Read-only operations for category entities.
pub trait CategoryReader {
    /// List categories matching the supplied query, with the total count
    /// before pagination.
    fn list_categories(&self, query: CategoryListQuery)
    -> RepositoryResult<(usize, Vec<Category>)>;
    /// Retrieve a category by its identifier.
    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>>;
    /// Case-insensitive lookup by name, optionally excluding one record.
    fn find_category_by_name(
        &self,
        name: &str,
        exclude: Option<CategoryId>,
    ) -> RepositoryResult<Option<Category>>;
    /// Case-insensitive lookup by slug, optionally excluding one record.
    fn find_category_by_slug(
        &self,
        slug: &str,
        exclude: Option<CategoryId>,
    ) -> RepositoryResult<Option<Category>>;
    /// Count subcategories and products referencing the category.
    fn count_category_dependents(&self, id: CategoryId) -> RepositoryResult<CategoryDependents>;
    /// Aggregate counts for reporting.
    fn category_stats(&self, top: usize) -> RepositoryResult<CategoryStats>;
}

/// Write operations for category entities.
pub trait CategoryWriter {
    /// Persist a new category and return the stored record.
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category>;
    /// Apply a partial update, stamping the actor and timestamp.
    fn update_category(
        &self,
        id: CategoryId,
        patch: &CategoryPatch,
        updated_by: UserId,
    ) -> RepositoryResult<Category>;
    /// Delete a category by id.
    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize>;
    /// Assign an explicit sort position to one category.
    fn set_category_sort_order(
        &self,
        id: CategoryId,
        position: i32,
        updated_by: UserId,
    ) -> RepositoryResult<usize>;
    /// Force-deactivate every subcategory and product under the category,
    /// stamping the actor. Used by the cascade policy switch.
    fn deactivate_category_children(
        &self,
        id: CategoryId,
        updated_by: UserId,
    ) -> RepositoryResult<usize>;
}

/// Read-only operations for subcategory entities.
pub trait SubcategoryReader {
    fn list_subcategories(
        &self,
        query: SubcategoryListQuery,
    ) -> RepositoryResult<(usize, Vec<Subcategory>)>;
    fn get_subcategory_by_id(&self, id: SubcategoryId) -> RepositoryResult<Option<Subcategory>>;
    /// Case-insensitive sibling lookup by name within one category.
    fn find_subcategory_by_name(
        &self,
        category_id: CategoryId,
        name: &str,
        exclude: Option<SubcategoryId>,
    ) -> RepositoryResult<Option<Subcategory>>;
    /// Case-insensitive lookup by slug, optionally excluding one record.
    fn find_subcategory_by_slug(
        &self,
        slug: &str,
        exclude: Option<SubcategoryId>,
    ) -> RepositoryResult<Option<Subcategory>>;
    /// Count products referencing the subcategory.
    fn count_subcategory_products(&self, id: SubcategoryId) -> RepositoryResult<usize>;
    fn subcategory_stats(&self, top: usize) -> RepositoryResult<SubcategoryStats>;
}

/// Write operations for subcategory entities.
pub trait SubcategoryWriter {
    fn create_subcategory(&self, subcategory: &NewSubcategory) -> RepositoryResult<Subcategory>;
    fn update_subcategory(
        &self,
        id: SubcategoryId,
        patch: &SubcategoryPatch,
        updated_by: UserId,
    ) -> RepositoryResult<Subcategory>;
    fn delete_subcategory(&self, id: SubcategoryId) -> RepositoryResult<usize>;
    fn set_subcategory_sort_order(
        &self,
        id: SubcategoryId,
        position: i32,
        updated_by: UserId,
    ) -> RepositoryResult<usize>;
    /// Force-deactivate every product of the subcategory, stamping the
    /// actor. Part of the deactivation cascade.
    fn deactivate_subcategory_products(
        &self,
        id: SubcategoryId,
        updated_by: UserId,
    ) -> RepositoryResult<usize>;
}

/// Read-only operations for product entities.
pub trait ProductReader {
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>>;
    /// Case-insensitive lookup by SKU.
    fn get_product_by_sku(&self, sku: &str) -> RepositoryResult<Option<Product>>;
    /// Case-insensitive SKU lookup, optionally excluding one record.
    fn find_product_by_sku(
        &self,
        sku: &str,
        exclude: Option<ProductId>,
    ) -> RepositoryResult<Option<Product>>;
    /// Case-insensitive name lookup among products sharing the same
    /// category and subcategory.
    fn find_product_by_name(
        &self,
        category_id: CategoryId,
        subcategory_id: SubcategoryId,
        name: &str,
        exclude: Option<ProductId>,
    ) -> RepositoryResult<Option<Product>>;
    fn product_stats(&self, top: usize) -> RepositoryResult<ProductStats>;
}

/// Write operations for product entities.
pub trait ProductWriter {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product>;
    fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
        updated_by: UserId,
    ) -> RepositoryResult<Product>;
    fn delete_product(&self, id: ProductId) -> RepositoryResult<usize>;
    fn set_product_sort_order(
        &self,
        id: ProductId,
        position: i32,
        updated_by: UserId,
    ) -> RepositoryResult<usize>;
}

/// Read-only operations for user accounts.
pub trait UserReader {
    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)>;
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
    /// Case-insensitive lookup by username or email.
    fn get_user_by_identity(&self, identity: &str) -> RepositoryResult<Option<User>>;
    fn find_user_by_username(
        &self,
        username: &str,
        exclude: Option<UserId>,
    ) -> RepositoryResult<Option<User>>;
    fn find_user_by_email(
        &self,
        email: &str,
        exclude: Option<UserId>,
    ) -> RepositoryResult<Option<User>>;
    fn user_stats(&self, recent: usize) -> RepositoryResult<UserStats>;
}

/// Write operations for user accounts.
pub trait UserWriter {
    fn create_user(&self, user: &NewUser) -> RepositoryResult<User>;
    fn update_user(&self, id: UserId, patch: &UserPatch) -> RepositoryResult<User>;
    fn delete_user(&self, id: UserId) -> RepositoryResult<usize>;
}
