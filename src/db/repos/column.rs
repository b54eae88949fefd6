use async_trait::async_trait;
use diesel::{
    delete, insert_into, update, Connection, ExpressionMethods, OptionalExtension, PgConnection,
    QueryDsl, RunQueryDsl, SelectableHelper,
};

use super::PgStore;
use crate::db::{
    models::{Column, NewColumn},
    schema::{boards, columns, comments, tasks},
    ColumnRepo, StoreError, StoreResult,
};
use crate::ordering::{self, ColumnChange, ColumnStep};

/// Takes the board row `FOR UPDATE` and loads its columns. Every column
/// writer goes through here first, so writers on one board run one at a time.
fn lock_board(conn: &mut PgConnection, board_id: i32) -> StoreResult<Vec<Column>> {
    boards::table
        .find(board_id)
        .select(boards::id)
        .for_update()
        .get_result::<i32>(conn)
        .optional()?
        .ok_or(StoreError::MissingRow { table: "boards", id: board_id })?;
    Ok(columns::table
        .filter(columns::board_id.eq(board_id))
        .order(columns::column_number)
        .select(Column::as_select())
        .load(conn)?)
}

/// One write of a plan. A step that touches no row of the board fails the
/// whole transaction.
fn apply_step(conn: &mut PgConnection, board_id: i32, step: ColumnStep) -> StoreResult<()> {
    let column_id = step.column_id();
    let target = columns::table
        .filter(columns::board_id.eq(board_id))
        .filter(columns::id.eq(column_id));
    let touched = match step {
        ColumnStep::Rename { name, .. } => update(target)
            .set(columns::name.eq(name))
            .execute(conn)?,
        ColumnStep::Renumber { number, .. } => update(target)
            .set(columns::column_number.eq(number))
            .execute(conn)?,
        ColumnStep::Remove { .. } => {
            let column_tasks = tasks::table
                .filter(tasks::column_id.eq(column_id))
                .select(tasks::id);
            delete(comments::table.filter(comments::task_id.eq_any(column_tasks)))
                .execute(conn)?;
            delete(tasks::table.filter(tasks::column_id.eq(column_id))).execute(conn)?;
            delete(target).execute(conn)?
        }
    };
    if touched == 0 {
        return Err(StoreError::MissingRow { table: "columns", id: column_id });
    }
    Ok(())
}

#[async_trait]
impl ColumnRepo for PgStore {
    async fn find_column(&self, id: i32) -> StoreResult<Option<Column>> {
        self.run(move |conn| {
            Ok(columns::table
                .find(id)
                .select(Column::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    async fn list_columns(&self, board_id: i32) -> StoreResult<Vec<Column>> {
        self.run(move |conn| {
            Ok(columns::table
                .filter(columns::board_id.eq(board_id))
                .order(columns::column_number)
                .select(Column::as_select())
                .load(conn)?)
        })
        .await
    }

    async fn append_column(&self, board_id: i32, name: String) -> StoreResult<Column> {
        self.run(move |conn| {
            conn.transaction::<_, StoreError, _>(|conn| {
                let existing = lock_board(conn, board_id)?;
                let new_column = NewColumn {
                    name,
                    column_number: ordering::next_number(&existing),
                    board_id,
                };
                Ok(insert_into(columns::table)
                    .values(new_column)
                    .returning(Column::as_returning())
                    .get_result(conn)?)
            })
        })
        .await
    }

    async fn change_columns(&self, board_id: i32, change: ColumnChange) -> StoreResult<()> {
        self.run(move |conn| {
            conn.transaction::<_, StoreError, _>(|conn| {
                let existing = lock_board(conn, board_id)?;
                let plan = change.plan(board_id, &existing)?;
                for step in plan.steps {
                    apply_step(conn, plan.board_id, step)?;
                }
                Ok(())
            })
        })
        .await
    }
}
