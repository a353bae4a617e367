use chrono::Utc;
use diesel::prelude::*;

use crate::domain::types::{Role, UserId};
use crate::domain::user::{NewUser, User, UserPatch};
use crate::models::user::{NewUser as DbNewUser, User as DbUser, UserChanges};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, UserListQuery, UserReader, UserStats, UserWriter, lower};

impl UserReader for DieselRepository {
    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let pattern = query
            .search
            .as_ref()
            .map(|s| format!("%{}%", s.to_lowercase()));

        let query_builder = || {
            let mut q = users::table.into_boxed::<diesel::sqlite::Sqlite>();
            if let Some(role) = query.role {
                q = q.filter(users::role.eq(role.as_str()));
            }
            if let Some(is_active) = query.is_active {
                q = q.filter(users::is_active.eq(is_active));
            }
            if let Some(pattern) = &pattern {
                q = q.filter(
                    lower(users::username)
                        .like(pattern.clone())
                        .or(lower(users::email).like(pattern.clone()))
                        .or(lower(users::first_name).like(pattern.clone()))
                        .or(lower(users::last_name).like(pattern.clone())),
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
            .order(users::username.asc())
            .load::<DbUser>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<User>, _>>()?;

        Ok((total, items))
    }

    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let user = users::table
            .filter(users::id.eq(id.get()))
            .first::<DbUser>(&mut conn)
            .optional()?;

        Ok(user.map(TryInto::try_into).transpose()?)
    }

    fn get_user_by_identity(&self, identity: &str) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let identity = identity.to_lowercase();

        let user = users::table
            .filter(
                lower(users::username)
                    .eq(identity.clone())
                    .or(lower(users::email).eq(identity)),
            )
            .first::<DbUser>(&mut conn)
            .optional()?;

        Ok(user.map(TryInto::try_into).transpose()?)
    }

    fn find_user_by_username(
        &self,
        username: &str,
        exclude: Option<UserId>,
    ) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let mut q = users::table
            .filter(lower(users::username).eq(username.to_lowercase()))
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(exclude) = exclude {
            q = q.filter(users::id.ne(exclude.get()));
        }

        let user = q.first::<DbUser>(&mut conn).optional()?;
        Ok(user.map(TryInto::try_into).transpose()?)
    }

    fn find_user_by_email(
        &self,
        email: &str,
        exclude: Option<UserId>,
    ) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let mut q = users::table
            .filter(lower(users::email).eq(email.to_lowercase()))
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(exclude) = exclude {
            q = q.filter(users::id.ne(exclude.get()));
        }

        let user = q.first::<DbUser>(&mut conn).optional()?;
        Ok(user.map(TryInto::try_into).transpose()?)
    }

    fn user_stats(&self, recent: usize) -> RepositoryResult<UserStats> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let total = users::table.count().get_result::<i64>(&mut conn)? as usize;
        let active = users::table
            .filter(users::is_active.eq(true))
            .count()
            .get_result::<i64>(&mut conn)? as usize;
        let admins = users::table
            .filter(users::role.eq(Role::Admin.as_str()))
            .count()
            .get_result::<i64>(&mut conn)? as usize;
        let coordinators = users::table
            .filter(users::role.eq(Role::Coordinador.as_str()))
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let recent = users::table
            .order(users::created_at.desc())
            .limit(recent as i64)
            .load::<DbUser>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<User>, _>>()?;

        Ok(UserStats {
            total,
            active,
            admins,
            coordinators,
            recent,
        })
    }
}

impl UserWriter for DieselRepository {
    fn create_user(&self, user: &NewUser) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user: DbNewUser = user.clone().into();

        let created = diesel::insert_into(users::table)
            .values(db_user)
            .get_result::<DbUser>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn update_user(&self, id: UserId, patch: &UserPatch) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let changes = UserChanges::from_patch(patch.clone(), Utc::now().naive_utc());

        let updated = diesel::update(users::table.filter(users::id.eq(id.get())))
            .set(changes)
            .get_result::<DbUser>(&mut conn)?;

        Ok(updated.try_into()?)
    }

    fn delete_user(&self, id: UserId) -> RepositoryResult<usize> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let affected =
            diesel::delete(users::table.filter(users::id.eq(id.get()))).execute(&mut conn)?;

        Ok(affected)
    }
}
