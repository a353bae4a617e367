use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;

use crate::domain::category::{Category, CategoryPatch, NewCategory};
use crate::domain::types::{CategoryId, UserId};
use crate::models::category::{
    Category as DbCategory, CategoryChanges, NewCategory as DbNewCategory,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    CategoryDependents, CategoryListQuery, CategoryReader, CategoryStats, CategoryWriter,
    DieselRepository, lower,
};

impl CategoryReader for DieselRepository {
    fn list_categories(
        &self,
        query: CategoryListQuery,
    ) -> RepositoryResult<(usize, Vec<Category>)> {
        use crate::schema::categories;

        let mut conn = self.conn()?;
        let pattern = query
            .search
            .as_ref()
            .map(|s| format!("%{}%", s.to_lowercase()));

        let query_builder = || {
            let mut q = categories::table.into_boxed::<diesel::sqlite::Sqlite>();
            if let Some(is_active) = query.is_active {
                q = q.filter(categories::is_active.eq(is_active));
            }
            if let Some(pattern) = &pattern {
                q = q.filter(
                    lower(categories::name)
                        .like(pattern.clone())
                        .or(lower(categories::description).like(pattern.clone())),
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
            .order((categories::sort_order.asc(), categories::name.asc()))
            .load::<DbCategory>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Category>, _>>()?;

        Ok((total, items))
    }

    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let category = categories::table
            .filter(categories::id.eq(id.get()))
            .first::<DbCategory>(&mut conn)
            .optional()?;

        Ok(category.map(TryInto::try_into).transpose()?)
    }

    fn find_category_by_name(
        &self,
        name: &str,
        exclude: Option<CategoryId>,
    ) -> RepositoryResult<Option<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let mut q = categories::table
            .filter(lower(categories::name).eq(name.to_lowercase()))
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(exclude) = exclude {
            q = q.filter(categories::id.ne(exclude.get()));
        }

        let category = q.first::<DbCategory>(&mut conn).optional()?;
        Ok(category.map(TryInto::try_into).transpose()?)
    }

    fn find_category_by_slug(
        &self,
        slug: &str,
        exclude: Option<CategoryId>,
    ) -> RepositoryResult<Option<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let mut q = categories::table
            .filter(lower(categories::slug).eq(slug.to_lowercase()))
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(exclude) = exclude {
            q = q.filter(categories::id.ne(exclude.get()));
        }

        let category = q.first::<DbCategory>(&mut conn).optional()?;
        Ok(category.map(TryInto::try_into).transpose()?)
    }

    fn count_category_dependents(&self, id: CategoryId) -> RepositoryResult<CategoryDependents> {
        use crate::schema::{products, subcategories};

        let mut conn = self.conn()?;

        let subcategory_count = subcategories::table
            .filter(subcategories::category_id.eq(id.get()))
            .count()
            .get_result::<i64>(&mut conn)? as usize;
        let product_count = products::table
            .filter(products::category_id.eq(id.get()))
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        Ok(CategoryDependents {
            subcategories: subcategory_count,
            products: product_count,
        })
    }

    fn category_stats(&self, top: usize) -> RepositoryResult<CategoryStats> {
        use crate::schema::{categories, subcategories};

        let mut conn = self.conn()?;

        let total = categories::table.count().get_result::<i64>(&mut conn)? as usize;
        let active = categories::table
            .filter(categories::is_active.eq(true))
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let mut counts = subcategories::table
            .group_by(subcategories::category_id)
            .select((subcategories::category_id, diesel::dsl::count_star()))
            .load::<(i32, i64)>(&mut conn)?;
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(top);

        let ids: Vec<i32> = counts.iter().map(|(id, _)| *id).collect();
        let by_id: HashMap<i32, DbCategory> = categories::table
            .filter(categories::id.eq_any(&ids))
            .load::<DbCategory>(&mut conn)?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut top_by_subcategories = Vec::with_capacity(counts.len());
        for (id, count) in counts {
            if let Some(category) = by_id.get(&id) {
                top_by_subcategories.push((category.clone().try_into()?, count as usize));
            }
        }

        Ok(CategoryStats {
            total,
            active,
            top_by_subcategories,
        })
    }
}

impl CategoryWriter for DieselRepository {
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category> {
        use crate::schema::categories;

        let mut conn = self.conn()?;
        let db_category: DbNewCategory = category.clone().into();

        let created = diesel::insert_into(categories::table)
            .values(db_category)
            .get_result::<DbCategory>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn update_category(
        &self,
        id: CategoryId,
        patch: &CategoryPatch,
        updated_by: UserId,
    ) -> RepositoryResult<Category> {
        use crate::schema::categories;

        let mut conn = self.conn()?;
        let changes = CategoryChanges::from_patch(patch.clone(), updated_by, Utc::now().naive_utc());

        let updated = diesel::update(categories::table.filter(categories::id.eq(id.get())))
            .set(changes)
            .get_result::<DbCategory>(&mut conn)?;

        Ok(updated.try_into()?)
    }

    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let affected = diesel::delete(categories::table.filter(categories::id.eq(id.get())))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn set_category_sort_order(
        &self,
        id: CategoryId,
        position: i32,
        updated_by: UserId,
    ) -> RepositoryResult<usize> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let affected = diesel::update(categories::table.filter(categories::id.eq(id.get())))
            .set((
                categories::sort_order.eq(position),
                categories::updated_by.eq(updated_by.get()),
                categories::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn deactivate_category_children(
        &self,
        id: CategoryId,
        updated_by: UserId,
    ) -> RepositoryResult<usize> {
        use crate::schema::{products, subcategories};

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let affected = conn.transaction(|conn| {
            let subcategories_affected = diesel::update(
                subcategories::table
                    .filter(subcategories::category_id.eq(id.get()))
                    .filter(subcategories::is_active.eq(true)),
            )
            .set((
                subcategories::is_active.eq(false),
                subcategories::updated_by.eq(updated_by.get()),
                subcategories::updated_at.eq(now),
            ))
            .execute(conn)?;

            let products_affected = diesel::update(
                products::table
                    .filter(products::category_id.eq(id.get()))
                    .filter(products::is_active.eq(true)),
            )
            .set((
                products::is_active.eq(false),
                products::updated_by.eq(updated_by.get()),
                products::updated_at.eq(now),
            ))
            .execute(conn)?;

            diesel::QueryResult::Ok(subcategories_affected + products_affected)
        })?;

        Ok(affected)
    }
}
