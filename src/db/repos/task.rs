use async_trait::async_trait;
use diesel::{
    delete, insert_into, update, Connection, ExpressionMethods, OptionalExtension, QueryDsl,
    RunQueryDsl, SelectableHelper,
};

use super::PgStore;
use crate::db::{
    models::{NewTask, Task, TaskChangeSet},
    schema::{columns, comments, tasks},
    StoreError, StoreResult, TaskRepo,
};

#[async_trait]
impl TaskRepo for PgStore {
    async fn find_task(&self, id: i32) -> StoreResult<Option<Task>> {
        self.run(move |conn| {
            Ok(tasks::table
                .find(id)
                .select(Task::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    async fn list_tasks(&self, column_id: i32) -> StoreResult<Vec<Task>> {
        self.run(move |conn| {
            Ok(tasks::table
                .filter(tasks::column_id.eq(column_id))
                .order(tasks::id)
                .select(Task::as_select())
                .load(conn)?)
        })
        .await
    }

    async fn tasks_for_board(&self, board_id: i32) -> StoreResult<Vec<Task>> {
        self.run(move |conn| {
            let board_columns = columns::table
                .filter(columns::board_id.eq(board_id))
                .select(columns::id);
            Ok(tasks::table
                .filter(tasks::column_id.eq_any(board_columns))
                .order(tasks::id)
                .select(Task::as_select())
                .load(conn)?)
        })
        .await
    }

    async fn insert_task(&self, new_task: NewTask) -> StoreResult<Task> {
        self.run(move |conn| {
            Ok(insert_into(tasks::table)
                .values(new_task)
                .returning(Task::as_returning())
                .get_result(conn)?)
        })
        .await
    }

    async fn update_task(&self, id: i32, changes: TaskChangeSet) -> StoreResult<Option<Task>> {
        self.run(move |conn| {
            if changes.is_empty() {
                return Ok(tasks::table
                    .find(id)
                    .select(Task::as_select())
                    .first(conn)
                    .optional()?);
            }
            Ok(update(tasks::table.find(id))
                .set(changes)
                .returning(Task::as_returning())
                .get_result(conn)
                .optional()?)
        })
        .await
    }

    async fn delete_task(&self, id: i32) -> StoreResult<Option<Task>> {
        self.run(move |conn| {
            conn.transaction::<_, StoreError, _>(|conn| {
                delete(comments::table.filter(comments::task_id.eq(id))).execute(conn)?;
                Ok(delete(tasks::table.find(id))
                    .returning(Task::as_returning())
                    .get_result(conn)
                    .optional()?)
            })
        })
        .await
    }
}
