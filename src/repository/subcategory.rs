use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;

use crate::domain::subcategory::{NewSubcategory, Subcategory, SubcategoryPatch};
use crate::domain::types::{CategoryId, SubcategoryId, UserId};
use crate::models::subcategory::{
    NewSubcategory as DbNewSubcategory, Subcategory as DbSubcategory, SubcategoryChanges,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    DieselRepository, SubcategoryListQuery, SubcategoryReader, SubcategoryStats,
    SubcategoryWriter, lower,
};

impl SubcategoryReader for DieselRepository {
    fn list_subcategories(
        &self,
        query: SubcategoryListQuery,
    ) -> RepositoryResult<(usize, Vec<Subcategory>)> {
        use crate::schema::subcategories;

        let mut conn = self.conn()?;
        let pattern = query
            .search
            .as_ref()
            .map(|s| format!("%{}%", s.to_lowercase()));

        let query_builder = || {
            let mut q = subcategories::table.into_boxed::<diesel::sqlite::Sqlite>();
            if let Some(category_id) = query.category_id {
                q = q.filter(subcategories::category_id.eq(category_id.get()));
            }
            if let Some(is_active) = query.is_active {
                q = q.filter(subcategories::is_active.eq(is_active));
            }
            if let Some(pattern) = &pattern {
                // SQLite LIKE is already case-insensitive for ASCII, so the
                // nullable description column is matched directly.
                q = q.filter(
                    lower(subcategories::name)
                        .like(pattern.clone())
                        .nullable()
                        .or(subcategories::description.like(pattern.clone())),
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
            .order((subcategories::sort_order.asc(), subcategories::name.asc()))
            .load::<DbSubcategory>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Subcategory>, _>>()?;

        Ok((total, items))
    }

    fn get_subcategory_by_id(&self, id: SubcategoryId) -> RepositoryResult<Option<Subcategory>> {
        use crate::schema::subcategories;

        let mut conn = self.conn()?;

        let subcategory = subcategories::table
            .filter(subcategories::id.eq(id.get()))
            .first::<DbSubcategory>(&mut conn)
            .optional()?;

        Ok(subcategory.map(TryInto::try_into).transpose()?)
    }

    fn find_subcategory_by_name(
        &self,
        category_id: CategoryId,
        name: &str,
        exclude: Option<SubcategoryId>,
    ) -> RepositoryResult<Option<Subcategory>> {
        use crate::schema::subcategories;

        let mut conn = self.conn()?;

        let mut q = subcategories::table
            .filter(subcategories::category_id.eq(category_id.get()))
            .filter(lower(subcategories::name).eq(name.to_lowercase()))
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(exclude) = exclude {
            q = q.filter(subcategories::id.ne(exclude.get()));
        }

        let subcategory = q.first::<DbSubcategory>(&mut conn).optional()?;
        Ok(subcategory.map(TryInto::try_into).transpose()?)
    }

    fn find_subcategory_by_slug(
        &self,
        slug: &str,
        exclude: Option<SubcategoryId>,
    ) -> RepositoryResult<Option<Subcategory>> {
        use crate::schema::subcategories;

        let mut conn = self.conn()?;

        let mut q = subcategories::table
            .filter(lower(subcategories::slug).eq(slug.to_lowercase()))
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(exclude) = exclude {
            q = q.filter(subcategories::id.ne(exclude.get()));
        }

        let subcategory = q.first::<DbSubcategory>(&mut conn).optional()?;
        Ok(subcategory.map(TryInto::try_into).transpose()?)
    }

    fn count_subcategory_products(&self, id: SubcategoryId) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let count = products::table
            .filter(products::subcategory_id.eq(id.get()))
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        Ok(count)
    }

    fn subcategory_stats(&self, top: usize) -> RepositoryResult<SubcategoryStats> {
        use crate::schema::{products, subcategories};

        let mut conn = self.conn()?;

        let total = subcategories::table.count().get_result::<i64>(&mut conn)? as usize;
        let active = subcategories::table
            .filter(subcategories::is_active.eq(true))
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let mut counts = products::table
            .group_by(products::subcategory_id)
            .select((products::subcategory_id, diesel::dsl::count_star()))
            .load::<(i32, i64)>(&mut conn)?;
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(top);

        let ids: Vec<i32> = counts.iter().map(|(id, _)| *id).collect();
        let by_id: HashMap<i32, DbSubcategory> = subcategories::table
            .filter(subcategories::id.eq_any(&ids))
            .load::<DbSubcategory>(&mut conn)?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let mut top_by_products = Vec::with_capacity(counts.len());
        for (id, count) in counts {
            if let Some(subcategory) = by_id.get(&id) {
                top_by_products.push((subcategory.clone().try_into()?, count as usize));
            }
        }

        Ok(SubcategoryStats {
            total,
            active,
            top_by_products,
        })
    }
}

impl SubcategoryWriter for DieselRepository {
    fn create_subcategory(&self, subcategory: &NewSubcategory) -> RepositoryResult<Subcategory> {
        use crate::schema::subcategories;

        let mut conn = self.conn()?;
        let db_subcategory: DbNewSubcategory = subcategory.clone().into();

        let created = diesel::insert_into(subcategories::table)
            .values(db_subcategory)
            .get_result::<DbSubcategory>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn update_subcategory(
        &self,
        id: SubcategoryId,
        patch: &SubcategoryPatch,
        updated_by: UserId,
    ) -> RepositoryResult<Subcategory> {
        use crate::schema::subcategories;

        let mut conn = self.conn()?;
        let changes =
            SubcategoryChanges::from_patch(patch.clone(), updated_by, Utc::now().naive_utc());

        let updated = diesel::update(subcategories::table.filter(subcategories::id.eq(id.get())))
            .set(changes)
            .get_result::<DbSubcategory>(&mut conn)?;

        Ok(updated.try_into()?)
    }

    fn delete_subcategory(&self, id: SubcategoryId) -> RepositoryResult<usize> {
        use crate::schema::subcategories;

        let mut conn = self.conn()?;

        let affected =
            diesel::delete(subcategories::table.filter(subcategories::id.eq(id.get())))
                .execute(&mut conn)?;

        Ok(affected)
    }

    fn set_subcategory_sort_order(
        &self,
        id: SubcategoryId,
        position: i32,
        updated_by: UserId,
    ) -> RepositoryResult<usize> {
        use crate::schema::subcategories;

        let mut conn = self.conn()?;

        let affected = diesel::update(subcategories::table.filter(subcategories::id.eq(id.get())))
            .set((
                subcategories::sort_order.eq(position),
                subcategories::updated_by.eq(updated_by.get()),
                subcategories::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn deactivate_subcategory_products(
        &self,
        id: SubcategoryId,
        updated_by: UserId,
    ) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let affected = diesel::update(
            products::table
                .filter(products::subcategory_id.eq(id.get()))
                .filter(products::is_active.eq(true)),
        )
        .set((
            products::is_active.eq(false),
            products::updated_by.eq(updated_by.get()),
            products::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

        Ok(affected)
    }
}
