use async_trait::async_trait;
use diesel::{
    insert_into, update, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl,
    SelectableHelper,
};

use super::PgStore;
use crate::db::{
    models::{NewStatus, Status, StatusChangeSet},
    schema::statuses,
    StatusRepo, StoreResult,
};

#[async_trait]
impl StatusRepo for PgStore {
    async fn find_status(&self, id: i32) -> StoreResult<Option<Status>> {
        self.run(move |conn| {
            Ok(statuses::table
                .find(id)
                .select(Status::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    async fn find_status_by_name(&self, name: &str) -> StoreResult<Option<Status>> {
        let name = name.to_owned();
        self.run(move |conn| {
            Ok(statuses::table
                .filter(statuses::name.eq(name))
                .order(statuses::id)
                .select(Status::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    async fn list_statuses(&self) -> StoreResult<Vec<Status>> {
        self.run(|conn| {
            Ok(statuses::table
                .select(Status::as_select())
                .order(statuses::id)
                .load(conn)?)
        })
        .await
    }

    async fn insert_status(&self, new_status: NewStatus) -> StoreResult<Status> {
        self.run(move |conn| {
            Ok(insert_into(statuses::table)
                .values(new_status)
                .returning(Status::as_returning())
                .get_result(conn)?)
        })
        .await
    }

    async fn update_status(
        &self,
        id: i32,
        changes: StatusChangeSet,
    ) -> StoreResult<Option<Status>> {
        self.run(move |conn| {
            if changes.is_empty() {
                return Ok(statuses::table
                    .find(id)
                    .select(Status::as_select())
                    .first(conn)
                    .optional()?);
            }
            Ok(update(statuses::table.find(id))
                .set(changes)
                .returning(Status::as_returning())
                .get_result(conn)
                .optional()?)
        })
        .await
    }
}
