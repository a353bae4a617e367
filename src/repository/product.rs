use chrono::Utc;
use diesel::prelude::*;

use crate::domain::product::{NewProduct, Product, ProductPatch};
use crate::domain::types::{CategoryId, ProductId, SubcategoryId, UserId};
use crate::models::product::{NewProduct as DbNewProduct, Product as DbProduct, ProductChanges};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    DieselRepository, ProductListQuery, ProductReader, ProductStats, ProductWriter, lower,
};

impl ProductReader for DieselRepository {
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let pattern = query
            .search
            .as_ref()
            .map(|s| format!("%{}%", s.to_lowercase()));

        let query_builder = || {
            let mut q = products::table.into_boxed::<diesel::sqlite::Sqlite>();
            if let Some(category_id) = query.category_id {
                q = q.filter(products::category_id.eq(category_id.get()));
            }
            if let Some(subcategory_id) = query.subcategory_id {
                q = q.filter(products::subcategory_id.eq(subcategory_id.get()));
            }
            if let Some(is_active) = query.is_active {
                q = q.filter(products::is_active.eq(is_active));
            }
            if let Some(is_featured) = query.is_featured {
                q = q.filter(products::is_featured.eq(is_featured));
            }
            if let Some(min_price) = query.min_price {
                q = q.filter(products::price.ge(min_price));
            }
            if let Some(max_price) = query.max_price {
                q = q.filter(products::price.le(max_price));
            }
            if query.low_stock {
                q = q
                    .filter(products::track_stock.eq(true))
                    .filter(products::stock_quantity.lt(products::min_stock));
            }
            if let Some(pattern) = &pattern {
                // description is nullable; LIKE over the JSON tags column
                // matches the stored lowercase tag values.
                q = q.filter(
                    lower(products::name)
                        .like(pattern.clone())
                        .nullable()
                        .or(products::description.like(pattern.clone()))
                        .or(lower(products::sku).like(pattern.clone()).nullable())
                        .or(products::tags.like(pattern.clone()).nullable()),
                );
            }
            q
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();
        if let Some(pagination) = &query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let items = items
            .order((products::sort_order.asc(), products::name.asc()))
            .load::<DbProduct>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Product>, _>>()?;

        Ok((total, items))
    }

    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let product = products::table
            .filter(products::id.eq(id.get()))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        Ok(product.map(TryInto::try_into).transpose()?)
    }

    fn get_product_by_sku(&self, sku: &str) -> RepositoryResult<Option<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let product = products::table
            .filter(lower(products::sku).eq(sku.to_lowercase()))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        Ok(product.map(TryInto::try_into).transpose()?)
    }

    fn find_product_by_sku(
        &self,
        sku: &str,
        exclude: Option<ProductId>,
    ) -> RepositoryResult<Option<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let mut q = products::table
            .filter(lower(products::sku).eq(sku.to_lowercase()))
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(exclude) = exclude {
            q = q.filter(products::id.ne(exclude.get()));
        }

        let product = q.first::<DbProduct>(&mut conn).optional()?;
        Ok(product.map(TryInto::try_into).transpose()?)
    }

    fn find_product_by_name(
        &self,
        category_id: CategoryId,
        subcategory_id: SubcategoryId,
        name: &str,
        exclude: Option<ProductId>,
    ) -> RepositoryResult<Option<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let mut q = products::table
            .filter(products::category_id.eq(category_id.get()))
            .filter(products::subcategory_id.eq(subcategory_id.get()))
            .filter(lower(products::name).eq(name.to_lowercase()))
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(exclude) = exclude {
            q = q.filter(products::id.ne(exclude.get()));
        }

        let product = q.first::<DbProduct>(&mut conn).optional()?;
        Ok(product.map(TryInto::try_into).transpose()?)
    }

    fn product_stats(&self, top: usize) -> RepositoryResult<ProductStats> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let total = products::table.count().get_result::<i64>(&mut conn)? as usize;
        let active = products::table
            .filter(products::is_active.eq(true))
            .count()
            .get_result::<i64>(&mut conn)? as usize;
        let featured = products::table
            .filter(products::is_featured.eq(true))
            .count()
            .get_result::<i64>(&mut conn)? as usize;
        let digital = products::table
            .filter(products::is_digital.eq(true))
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let total_price = products::table
            .select(diesel::dsl::sum(products::price))
            .get_result::<Option<f64>>(&mut conn)?
            .unwrap_or(0.0);
        let average_price = if total > 0 {
            total_price / total as f64
        } else {
            0.0
        };

        let low_stock = products::table
            .filter(products::is_active.eq(true))
            .filter(products::track_stock.eq(true))
            .filter(products::stock_quantity.lt(products::min_stock))
            .order(products::stock_quantity.asc())
            .limit(10)
            .load::<DbProduct>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Product>, _>>()?;

        let most_expensive = products::table
            .filter(products::is_active.eq(true))
            .order(products::price.desc())
            .limit(top as i64)
            .load::<DbProduct>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Product>, _>>()?;

        Ok(ProductStats {
            total,
            active,
            featured,
            digital,
            total_price,
            average_price,
            low_stock,
            most_expensive,
        })
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let db_product: DbNewProduct = product.clone().try_into()?;

        let created = diesel::insert_into(products::table)
            .values(db_product)
            .get_result::<DbProduct>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
        updated_by: UserId,
    ) -> RepositoryResult<Product> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let changes =
            ProductChanges::from_patch(patch.clone(), updated_by, Utc::now().naive_utc())?;

        let updated = diesel::update(products::table.filter(products::id.eq(id.get())))
            .set(changes)
            .get_result::<DbProduct>(&mut conn)?;

        Ok(updated.try_into()?)
    }

    fn delete_product(&self, id: ProductId) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let affected =
            diesel::delete(products::table.filter(products::id.eq(id.get()))).execute(&mut conn)?;

        Ok(affected)
    }

    fn set_product_sort_order(
        &self,
        id: ProductId,
        position: i32,
        updated_by: UserId,
    ) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let affected = diesel::update(products::table.filter(products::id.eq(id.get())))
            .set((
                products::sort_order.eq(position),
                products::updated_by.eq(updated_by.get()),
                products::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }
}
