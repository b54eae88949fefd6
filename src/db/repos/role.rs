use async_trait::async_trait;
use diesel::{
    insert_into, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper,
};

use super::PgStore;
use crate::db::{
    models::{NewRole, Role, RoleName},
    schema::roles,
    RoleRepo, StoreResult,
};

#[async_trait]
impl RoleRepo for PgStore {
    async fn find_role(&self, name: RoleName) -> StoreResult<Option<Role>> {
        self.run(move |conn| {
            Ok(roles::table
                .filter(roles::name.eq(name.as_str()))
                .select(Role::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        self.run(|conn| {
            Ok(roles::table
                .select(Role::as_select())
                .order(roles::id)
                .load(conn)?)
        })
        .await
    }

    async fn insert_role(&self, name: RoleName) -> StoreResult<Role> {
        self.run(move |conn| {
            Ok(insert_into(roles::table)
                .values(NewRole { name: name.as_str().to_owned() })
                .returning(Role::as_returning())
                .get_result(conn)?)
        })
        .await
    }
}
