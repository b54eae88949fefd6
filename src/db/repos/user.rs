use async_trait::async_trait;
use diesel::{
    insert_into, update, BoolExpressionMethods, ExpressionMethods, OptionalExtension,
    PgTextExpressionMethods, QueryDsl, RunQueryDsl, SelectableHelper,
};

use super::PgStore;
use crate::db::{
    models::{NewUser, User, UserChangeSet},
    schema::users,
    StoreResult, UserRepo,
};

#[async_trait]
impl UserRepo for PgStore {
    async fn find_user(&self, id: i32) -> StoreResult<Option<User>> {
        self.run(move |conn| {
            Ok(users::table
                .find(id)
                .select(User::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = email.to_owned();
        self.run(move |conn| {
            Ok(users::table
                .filter(users::email.eq(email))
                .select(User::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    async fn search_users(&self, needle: Option<String>) -> StoreResult<Vec<User>> {
        self.run(move |conn| {
            let mut query = users::table
                .select(User::as_select())
                .order(users::id)
                .into_boxed();
            if let Some(needle) = needle {
                let pattern = format!("%{needle}%");
                query = query.filter(
                    users::name
                        .ilike(pattern.clone())
                        .or(users::email.ilike(pattern)),
                );
            }
            Ok(query.load(conn)?)
        })
        .await
    }

    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        self.run(move |conn| {
            Ok(insert_into(users::table)
                .values(new_user)
                .returning(User::as_returning())
                .get_result(conn)?)
        })
        .await
    }

    async fn update_user(&self, id: i32, changes: UserChangeSet) -> StoreResult<Option<User>> {
        self.run(move |conn| {
            if changes.is_empty() {
                return Ok(users::table
                    .find(id)
                    .select(User::as_select())
                    .first(conn)
                    .optional()?);
            }
            Ok(update(users::table.find(id))
                .set(changes)
                .returning(User::as_returning())
                .get_result(conn)
                .optional()?)
        })
        .await
    }
}
