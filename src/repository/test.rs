use std::sync::Mutex;

use chrono::Utc;

use crate::domain::category::{Category, CategoryPatch, NewCategory};
use crate::domain::product::{NewProduct, Product, ProductPatch};
use crate::domain::subcategory::{NewSubcategory, Subcategory, SubcategoryPatch};
use crate::domain::types::{CategoryId, ProductId, Role, SubcategoryId, UserId};
use crate::domain::user::{NewUser, User, UserPatch};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    CategoryDependents, CategoryListQuery, CategoryReader, CategoryStats, CategoryWriter,
    ProductListQuery, ProductReader, ProductStats, ProductWriter, SubcategoryListQuery,
    SubcategoryReader, SubcategoryStats, SubcategoryWriter, UserListQuery, UserReader, UserStats,
    UserWriter,
};

#[derive(Default)]
struct State {
    categories: Vec<Category>,
    subcategories: Vec<Subcategory>,
    products: Vec<Product>,
    users: Vec<User>,
    next_id: i32,
}

/// Simple in-memory repository used for unit tests.
#[derive(Default)]
pub struct TestRepository {
    state: Mutex<State>,
}

impl TestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(self, categories: Vec<Category>) -> Self {
        self.state.lock().unwrap().categories = categories;
        self
    }

    pub fn with_subcategories(self, subcategories: Vec<Subcategory>) -> Self {
        self.state.lock().unwrap().subcategories = subcategories;
        self
    }

    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.state.lock().unwrap().products = products;
        self
    }

    pub fn with_users(self, users: Vec<User>) -> Self {
        self.state.lock().unwrap().users = users;
        self
    }

    fn next_id(state: &mut State) -> i32 {
        state.next_id += 1;
        state.next_id + 1000
    }
}

fn apply_pagination<T>(items: Vec<T>, pagination: Option<&crate::pagination::Pagination>) -> Vec<T> {
    match pagination {
        Some(p) => items
            .into_iter()
            .skip((p.page.max(1) - 1) * p.per_page)
            .take(p.per_page)
            .collect(),
        None => items,
    }
}

impl CategoryReader for TestRepository {
    fn list_categories(
        &self,
        query: CategoryListQuery,
    ) -> RepositoryResult<(usize, Vec<Category>)> {
        let state = self.state.lock().unwrap();
        let mut items: Vec<Category> = state.categories.clone();
        if let Some(is_active) = query.is_active {
            items.retain(|c| c.is_active == is_active);
        }
        if let Some(search) = &query.search {
            let search = search.to_lowercase();
            items.retain(|c| {
                c.name.to_lowercase().contains(&search)
                    || c.description.to_lowercase().contains(&search)
            });
        }
        items.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.as_str().cmp(b.name.as_str()))
        });
        let total = items.len();
        Ok((total, apply_pagination(items, query.pagination.as_ref())))
    }

    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        let state = self.state.lock().unwrap();
        Ok(state.categories.iter().find(|c| c.id == id).cloned())
    }

    fn find_category_by_name(
        &self,
        name: &str,
        exclude: Option<CategoryId>,
    ) -> RepositoryResult<Option<Category>> {
        let state = self.state.lock().unwrap();
        let name = name.to_lowercase();
        Ok(state
            .categories
            .iter()
            .find(|c| c.name.to_lowercase() == name && Some(c.id) != exclude)
            .cloned())
    }

    fn find_category_by_slug(
        &self,
        slug: &str,
        exclude: Option<CategoryId>,
    ) -> RepositoryResult<Option<Category>> {
        let state = self.state.lock().unwrap();
        let slug = slug.to_lowercase();
        Ok(state
            .categories
            .iter()
            .find(|c| c.slug.as_str().to_lowercase() == slug && Some(c.id) != exclude)
            .cloned())
    }

    fn count_category_dependents(&self, id: CategoryId) -> RepositoryResult<CategoryDependents> {
        let state = self.state.lock().unwrap();
        Ok(CategoryDependents {
            subcategories: state
                .subcategories
                .iter()
                .filter(|s| s.category_id == id)
                .count(),
            products: state
                .products
                .iter()
                .filter(|p| p.category_id == id)
                .count(),
        })
    }

    fn category_stats(&self, top: usize) -> RepositoryResult<CategoryStats> {
        let state = self.state.lock().unwrap();
        let mut counted: Vec<(Category, usize)> = state
            .categories
            .iter()
            .map(|c| {
                let count = state
                    .subcategories
                    .iter()
                    .filter(|s| s.category_id == c.id)
                    .count();
                (c.clone(), count)
            })
            .filter(|(_, count)| *count > 0)
            .collect();
        counted.sort_by(|a, b| b.1.cmp(&a.1));
        counted.truncate(top);
        Ok(CategoryStats {
            total: state.categories.len(),
            active: state.categories.iter().filter(|c| c.is_active).count(),
            top_by_subcategories: counted,
        })
    }
}

impl CategoryWriter for TestRepository {
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category> {
        let mut state = self.state.lock().unwrap();
        if state
            .categories
            .iter()
            .any(|c| c.name.to_lowercase() == category.name.to_lowercase())
        {
            return Err(RepositoryError::Conflict(
                "categories.name unique constraint".to_string(),
            ));
        }
        let id = Self::next_id(&mut state);
        let created = Category {
            id: CategoryId::new(id)?,
            name: category.name.clone(),
            description: category.description.clone(),
            slug: category.slug.clone(),
            is_active: category.is_active,
            color: category.color.clone(),
            icon: category.icon.clone(),
            sort_order: category.sort_order,
            created_by: category.created_by,
            updated_by: None,
            created_at: category.created_at,
            updated_at: category.updated_at,
        };
        state.categories.push(created.clone());
        Ok(created)
    }

    fn update_category(
        &self,
        id: CategoryId,
        patch: &CategoryPatch,
        updated_by: UserId,
    ) -> RepositoryResult<Category> {
        let mut state = self.state.lock().unwrap();
        let category = state
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if let Some(name) = &patch.name {
            category.name = name.clone();
        }
        if let Some(slug) = &patch.slug {
            category.slug = slug.clone();
        }
        if let Some(description) = &patch.description {
            category.description = description.clone();
        }
        if let Some(color) = &patch.color {
            category.color = Some(color.clone());
        }
        if let Some(icon) = &patch.icon {
            category.icon = Some(icon.clone());
        }
        if let Some(is_active) = patch.is_active {
            category.is_active = is_active;
        }
        if let Some(sort_order) = patch.sort_order {
            category.sort_order = sort_order;
        }
        category.updated_by = Some(updated_by);
        category.updated_at = Utc::now().naive_utc();
        Ok(category.clone())
    }

    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize> {
        let mut state = self.state.lock().unwrap();
        let before = state.categories.len();
        state.categories.retain(|c| c.id != id);
        Ok(before - state.categories.len())
    }

    fn set_category_sort_order(
        &self,
        id: CategoryId,
        position: i32,
        updated_by: UserId,
    ) -> RepositoryResult<usize> {
        let mut state = self.state.lock().unwrap();
        match state.categories.iter_mut().find(|c| c.id == id) {
            Some(category) => {
                category.sort_order = position;
                category.updated_by = Some(updated_by);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn deactivate_category_children(
        &self,
        id: CategoryId,
        updated_by: UserId,
    ) -> RepositoryResult<usize> {
        let mut state = self.state.lock().unwrap();
        let mut affected = 0;
        for subcategory in state
            .subcategories
            .iter_mut()
            .filter(|s| s.category_id == id && s.is_active)
        {
            subcategory.is_active = false;
            subcategory.updated_by = Some(updated_by);
            affected += 1;
        }
        for product in state
            .products
            .iter_mut()
            .filter(|p| p.category_id == id && p.is_active)
        {
            product.is_active = false;
            product.updated_by = Some(updated_by);
            affected += 1;
        }
        Ok(affected)
    }
}

impl SubcategoryReader for TestRepository {
    fn list_subcategories(
        &self,
        query: SubcategoryListQuery,
    ) -> RepositoryResult<(usize, Vec<Subcategory>)> {
        let state = self.state.lock().unwrap();
        let mut items: Vec<Subcategory> = state.subcategories.clone();
        if let Some(category_id) = query.category_id {
            items.retain(|s| s.category_id == category_id);
        }
        if let Some(is_active) = query.is_active {
            items.retain(|s| s.is_active == is_active);
        }
        if let Some(search) = &query.search {
            let search = search.to_lowercase();
            items.retain(|s| {
                s.name.to_lowercase().contains(&search)
                    || s.description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&search))
            });
        }
        items.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.as_str().cmp(b.name.as_str()))
        });
        let total = items.len();
        Ok((total, apply_pagination(items, query.pagination.as_ref())))
    }

    fn get_subcategory_by_id(&self, id: SubcategoryId) -> RepositoryResult<Option<Subcategory>> {
        let state = self.state.lock().unwrap();
        Ok(state.subcategories.iter().find(|s| s.id == id).cloned())
    }

    fn find_subcategory_by_name(
        &self,
        category_id: CategoryId,
        name: &str,
        exclude: Option<SubcategoryId>,
    ) -> RepositoryResult<Option<Subcategory>> {
        let state = self.state.lock().unwrap();
        let name = name.to_lowercase();
        Ok(state
            .subcategories
            .iter()
            .find(|s| {
                s.category_id == category_id
                    && s.name.to_lowercase() == name
                    && Some(s.id) != exclude
            })
            .cloned())
    }

    fn find_subcategory_by_slug(
        &self,
        slug: &str,
        exclude: Option<SubcategoryId>,
    ) -> RepositoryResult<Option<Subcategory>> {
        let state = self.state.lock().unwrap();
        let slug = slug.to_lowercase();
        Ok(state
            .subcategories
            .iter()
            .find(|s| s.slug.as_str().to_lowercase() == slug && Some(s.id) != exclude)
            .cloned())
    }

    fn count_subcategory_products(&self, id: SubcategoryId) -> RepositoryResult<usize> {
        let state = self.state.lock().unwrap();
        Ok(state
            .products
            .iter()
            .filter(|p| p.subcategory_id == id)
            .count())
    }

    fn subcategory_stats(&self, top: usize) -> RepositoryResult<SubcategoryStats> {
        let state = self.state.lock().unwrap();
        let mut counted: Vec<(Subcategory, usize)> = state
            .subcategories
            .iter()
            .map(|s| {
                let count = state
                    .products
                    .iter()
                    .filter(|p| p.subcategory_id == s.id)
                    .count();
                (s.clone(), count)
            })
            .filter(|(_, count)| *count > 0)
            .collect();
        counted.sort_by(|a, b| b.1.cmp(&a.1));
        counted.truncate(top);
        Ok(SubcategoryStats {
            total: state.subcategories.len(),
            active: state.subcategories.iter().filter(|s| s.is_active).count(),
            top_by_products: counted,
        })
    }
}

impl SubcategoryWriter for TestRepository {
    fn create_subcategory(&self, subcategory: &NewSubcategory) -> RepositoryResult<Subcategory> {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let created = Subcategory {
            id: SubcategoryId::new(id)?,
            name: subcategory.name.clone(),
            description: subcategory.description.clone(),
            slug: subcategory.slug.clone(),
            is_active: subcategory.is_active,
            color: subcategory.color.clone(),
            icon: subcategory.icon.clone(),
            category_id: subcategory.category_id,
            sort_order: subcategory.sort_order,
            created_by: subcategory.created_by,
            updated_by: None,
            created_at: subcategory.created_at,
            updated_at: subcategory.updated_at,
        };
        state.subcategories.push(created.clone());
        Ok(created)
    }

    fn update_subcategory(
        &self,
        id: SubcategoryId,
        patch: &SubcategoryPatch,
        updated_by: UserId,
    ) -> RepositoryResult<Subcategory> {
        let mut state = self.state.lock().unwrap();
        let subcategory = state
            .subcategories
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if let Some(name) = &patch.name {
            subcategory.name = name.clone();
        }
        if let Some(slug) = &patch.slug {
            subcategory.slug = slug.clone();
        }
        if let Some(description) = &patch.description {
            subcategory.description = Some(description.clone());
        }
        if let Some(color) = &patch.color {
            subcategory.color = Some(color.clone());
        }
        if let Some(icon) = &patch.icon {
            subcategory.icon = Some(icon.clone());
        }
        if let Some(category_id) = patch.category_id {
            subcategory.category_id = category_id;
        }
        if let Some(is_active) = patch.is_active {
            subcategory.is_active = is_active;
        }
        if let Some(sort_order) = patch.sort_order {
            subcategory.sort_order = sort_order;
        }
        subcategory.updated_by = Some(updated_by);
        subcategory.updated_at = Utc::now().naive_utc();
        Ok(subcategory.clone())
    }

    fn delete_subcategory(&self, id: SubcategoryId) -> RepositoryResult<usize> {
        let mut state = self.state.lock().unwrap();
        let before = state.subcategories.len();
        state.subcategories.retain(|s| s.id != id);
        Ok(before - state.subcategories.len())
    }

    fn set_subcategory_sort_order(
        &self,
        id: SubcategoryId,
        position: i32,
        updated_by: UserId,
    ) -> RepositoryResult<usize> {
        let mut state = self.state.lock().unwrap();
        match state.subcategories.iter_mut().find(|s| s.id == id) {
            Some(subcategory) => {
                subcategory.sort_order = position;
                subcategory.updated_by = Some(updated_by);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn deactivate_subcategory_products(
        &self,
        id: SubcategoryId,
        updated_by: UserId,
    ) -> RepositoryResult<usize> {
        let mut state = self.state.lock().unwrap();
        let mut affected = 0;
        for product in state
            .products
            .iter_mut()
            .filter(|p| p.subcategory_id == id && p.is_active)
        {
            product.is_active = false;
            product.updated_by = Some(updated_by);
            affected += 1;
        }
        Ok(affected)
    }
}

impl ProductReader for TestRepository {
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)> {
        let state = self.state.lock().unwrap();
        let mut items: Vec<Product> = state.products.clone();
        if let Some(category_id) = query.category_id {
            items.retain(|p| p.category_id == category_id);
        }
        if let Some(subcategory_id) = query.subcategory_id {
            items.retain(|p| p.subcategory_id == subcategory_id);
        }
        if let Some(is_active) = query.is_active {
            items.retain(|p| p.is_active == is_active);
        }
        if let Some(is_featured) = query.is_featured {
            items.retain(|p| p.is_featured == is_featured);
        }
        if let Some(min_price) = query.min_price {
            items.retain(|p| p.price.get() >= min_price);
        }
        if let Some(max_price) = query.max_price {
            items.retain(|p| p.price.get() <= max_price);
        }
        if query.low_stock {
            items.retain(|p| p.stock.is_low());
        }
        if let Some(search) = &query.search {
            let search = search.to_lowercase();
            items.retain(|p| {
                p.name.to_lowercase().contains(&search)
                    || p.sku.as_str().to_lowercase().contains(&search)
                    || p.description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&search))
                    || p.tags.iter().any(|t| t.as_str().contains(&search))
            });
        }
        items.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.as_str().cmp(b.name.as_str()))
        });
        let total = items.len();
        Ok((total, apply_pagination(items, query.pagination.as_ref())))
    }

    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        let state = self.state.lock().unwrap();
        Ok(state.products.iter().find(|p| p.id == id).cloned())
    }

    fn get_product_by_sku(&self, sku: &str) -> RepositoryResult<Option<Product>> {
        let state = self.state.lock().unwrap();
        let sku = sku.to_lowercase();
        Ok(state
            .products
            .iter()
            .find(|p| p.sku.as_str().to_lowercase() == sku)
            .cloned())
    }

    fn find_product_by_sku(
        &self,
        sku: &str,
        exclude: Option<ProductId>,
    ) -> RepositoryResult<Option<Product>> {
        let state = self.state.lock().unwrap();
        let sku = sku.to_lowercase();
        Ok(state
            .products
            .iter()
            .find(|p| p.sku.as_str().to_lowercase() == sku && Some(p.id) != exclude)
            .cloned())
    }

    fn find_product_by_name(
        &self,
        category_id: CategoryId,
        subcategory_id: SubcategoryId,
        name: &str,
        exclude: Option<ProductId>,
    ) -> RepositoryResult<Option<Product>> {
        let state = self.state.lock().unwrap();
        let name = name.to_lowercase();
        Ok(state
            .products
            .iter()
            .find(|p| {
                p.category_id == category_id
                    && p.subcategory_id == subcategory_id
                    && p.name.to_lowercase() == name
                    && Some(p.id) != exclude
            })
            .cloned())
    }

    fn product_stats(&self, top: usize) -> RepositoryResult<ProductStats> {
        let state = self.state.lock().unwrap();
        let total = state.products.len();
        let total_price: f64 = state.products.iter().map(|p| p.price.get()).sum();
        let mut low_stock: Vec<Product> = state
            .products
            .iter()
            .filter(|p| p.is_active && p.stock.is_low())
            .cloned()
            .collect();
        low_stock.sort_by_key(|p| p.stock.quantity.get());
        low_stock.truncate(10);
        let mut most_expensive: Vec<Product> = state
            .products
            .iter()
            .filter(|p| p.is_active)
            .cloned()
            .collect();
        most_expensive.sort_by(|a, b| b.price.get().total_cmp(&a.price.get()));
        most_expensive.truncate(top);
        Ok(ProductStats {
            total,
            active: state.products.iter().filter(|p| p.is_active).count(),
            featured: state.products.iter().filter(|p| p.is_featured).count(),
            digital: state.products.iter().filter(|p| p.is_digital).count(),
            total_price,
            average_price: if total > 0 {
                total_price / total as f64
            } else {
                0.0
            },
            low_stock,
            most_expensive,
        })
    }
}

impl ProductWriter for TestRepository {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        let mut state = self.state.lock().unwrap();
        if state
            .products
            .iter()
            .any(|p| p.sku.as_str().eq_ignore_ascii_case(product.sku.as_str()))
        {
            return Err(RepositoryError::Conflict(
                "products.sku unique constraint".to_string(),
            ));
        }
        let id = Self::next_id(&mut state);
        let created = Product {
            id: ProductId::new(id)?,
            name: product.name.clone(),
            short_description: product.short_description.clone(),
            description: product.description.clone(),
            slug: product.slug.clone(),
            sku: product.sku.clone(),
            category_id: product.category_id,
            subcategory_id: product.subcategory_id,
            price: product.price,
            compare_price: product.compare_price,
            cost: product.cost,
            stock: product.stock,
            dimensions: product.dimensions,
            images: product.images.clone(),
            tags: product.tags.clone(),
            is_active: product.is_active,
            is_featured: product.is_featured,
            is_digital: product.is_digital,
            sort_order: product.sort_order,
            created_by: product.created_by,
            updated_by: None,
            created_at: product.created_at,
            updated_at: product.updated_at,
        };
        state.products.push(created.clone());
        Ok(created)
    }

    fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
        updated_by: UserId,
    ) -> RepositoryResult<Product> {
        let mut state = self.state.lock().unwrap();
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if let Some(name) = &patch.name {
            product.name = name.clone();
        }
        if let Some(slug) = &patch.slug {
            product.slug = slug.clone();
        }
        if let Some(short_description) = &patch.short_description {
            product.short_description = Some(short_description.clone());
        }
        if let Some(description) = &patch.description {
            product.description = Some(description.clone());
        }
        if let Some(sku) = &patch.sku {
            product.sku = sku.clone();
        }
        if let Some(category_id) = patch.category_id {
            product.category_id = category_id;
        }
        if let Some(subcategory_id) = patch.subcategory_id {
            product.subcategory_id = subcategory_id;
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(compare_price) = patch.compare_price {
            product.compare_price = Some(compare_price);
        }
        if let Some(cost) = patch.cost {
            product.cost = Some(cost);
        }
        if let Some(stock) = patch.stock {
            product.stock = stock;
        }
        if let Some(dimensions) = patch.dimensions {
            product.dimensions = Some(dimensions);
        }
        if let Some(images) = &patch.images {
            product.images = images.clone();
        }
        if let Some(tags) = &patch.tags {
            product.tags = tags.clone();
        }
        if let Some(is_active) = patch.is_active {
            product.is_active = is_active;
        }
        if let Some(is_featured) = patch.is_featured {
            product.is_featured = is_featured;
        }
        if let Some(is_digital) = patch.is_digital {
            product.is_digital = is_digital;
        }
        if let Some(sort_order) = patch.sort_order {
            product.sort_order = sort_order;
        }
        product.updated_by = Some(updated_by);
        product.updated_at = Utc::now().naive_utc();
        Ok(product.clone())
    }

    fn delete_product(&self, id: ProductId) -> RepositoryResult<usize> {
        let mut state = self.state.lock().unwrap();
        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        Ok(before - state.products.len())
    }

    fn set_product_sort_order(
        &self,
        id: ProductId,
        position: i32,
        updated_by: UserId,
    ) -> RepositoryResult<usize> {
        let mut state = self.state.lock().unwrap();
        match state.products.iter_mut().find(|p| p.id == id) {
            Some(product) => {
                product.sort_order = position;
                product.updated_by = Some(updated_by);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

impl UserReader for TestRepository {
    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)> {
        let state = self.state.lock().unwrap();
        let mut items: Vec<User> = state.users.clone();
        if let Some(role) = query.role {
            items.retain(|u| u.role == role);
        }
        if let Some(is_active) = query.is_active {
            items.retain(|u| u.is_active == is_active);
        }
        if let Some(search) = &query.search {
            let search = search.to_lowercase();
            items.retain(|u| {
                u.username.to_lowercase().contains(&search)
                    || u.email.as_str().contains(&search)
                    || u.first_name.to_lowercase().contains(&search)
                    || u.last_name.to_lowercase().contains(&search)
            });
        }
        items.sort_by(|a, b| a.username.as_str().cmp(b.username.as_str()));
        let total = items.len();
        Ok((total, apply_pagination(items, query.pagination.as_ref())))
    }

    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    fn get_user_by_identity(&self, identity: &str) -> RepositoryResult<Option<User>> {
        let state = self.state.lock().unwrap();
        let identity = identity.to_lowercase();
        Ok(state
            .users
            .iter()
            .find(|u| u.username.to_lowercase() == identity || u.email.as_str() == identity)
            .cloned())
    }

    fn find_user_by_username(
        &self,
        username: &str,
        exclude: Option<UserId>,
    ) -> RepositoryResult<Option<User>> {
        let state = self.state.lock().unwrap();
        let username = username.to_lowercase();
        Ok(state
            .users
            .iter()
            .find(|u| u.username.to_lowercase() == username && Some(u.id) != exclude)
            .cloned())
    }

    fn find_user_by_email(
        &self,
        email: &str,
        exclude: Option<UserId>,
    ) -> RepositoryResult<Option<User>> {
        let state = self.state.lock().unwrap();
        let email = email.to_lowercase();
        Ok(state
            .users
            .iter()
            .find(|u| u.email.as_str() == email && Some(u.id) != exclude)
            .cloned())
    }

    fn user_stats(&self, recent: usize) -> RepositoryResult<UserStats> {
        let state = self.state.lock().unwrap();
        let mut recent_users = state.users.clone();
        recent_users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent_users.truncate(recent);
        Ok(UserStats {
            total: state.users.len(),
            active: state.users.iter().filter(|u| u.is_active).count(),
            admins: state
                .users
                .iter()
                .filter(|u| u.role == Role::Admin)
                .count(),
            coordinators: state
                .users
                .iter()
                .filter(|u| u.role == Role::Coordinador)
                .count(),
            recent: recent_users,
        })
    }
}

impl UserWriter for TestRepository {
    fn create_user(&self, user: &NewUser) -> RepositoryResult<User> {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let created = User {
            id: UserId::new(id)?,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            is_active: user.is_active,
            phone: user.phone.clone(),
            last_login: None,
            created_by: user.created_by,
            created_at: user.created_at,
            updated_at: user.updated_at,
        };
        state.users.push(created.clone());
        Ok(created)
    }

    fn update_user(&self, id: UserId, patch: &UserPatch) -> RepositoryResult<User> {
        let mut state = self.state.lock().unwrap();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if let Some(username) = &patch.username {
            user.username = username.clone();
        }
        if let Some(email) = &patch.email {
            user.email = email.clone();
        }
        if let Some(password_hash) = &patch.password_hash {
            user.password_hash = password_hash.clone();
        }
        if let Some(first_name) = &patch.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &patch.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        if let Some(is_active) = patch.is_active {
            user.is_active = is_active;
        }
        if let Some(phone) = &patch.phone {
            user.phone = phone.clone();
        }
        if let Some(last_login) = patch.last_login {
            user.last_login = Some(last_login);
        }
        user.updated_at = Utc::now().naive_utc();
        Ok(user.clone())
    }

    fn delete_user(&self, id: UserId) -> RepositoryResult<usize> {
        let mut state = self.state.lock().unwrap();
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        Ok(before - state.users.len())
    }
}
