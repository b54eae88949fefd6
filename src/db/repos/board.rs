use async_trait::async_trait;
use diesel::{
    delete, insert_into, update, Connection, ExpressionMethods, OptionalExtension, QueryDsl,
    RunQueryDsl, SelectableHelper,
};

use super::PgStore;
use crate::db::{
    models::{Board, BoardChanges, BoardMember, BoardUserRole, NewBoard, RoleName},
    schema::{board_user_roles, boards, columns, comments, roles, tasks, users},
    BoardRepo, StoreError, StoreResult,
};

#[async_trait]
impl BoardRepo for PgStore {
    async fn find_board(&self, id: i32) -> StoreResult<Option<Board>> {
        self.run(move |conn| {
            Ok(boards::table
                .find(id)
                .select(Board::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    async fn boards_for_user(&self, user_id: i32) -> StoreResult<Vec<Board>> {
        self.run(move |conn| {
            let member_of = board_user_roles::table
                .filter(board_user_roles::user_id.eq(user_id))
                .select(board_user_roles::board_id);
            Ok(boards::table
                .filter(boards::id.eq_any(member_of))
                .select(Board::as_select())
                .order(boards::id)
                .load(conn)?)
        })
        .await
    }

    async fn board_members(&self, board_id: i32) -> StoreResult<Vec<BoardMember>> {
        self.run(move |conn| {
            let rows: Vec<(i32, String, String, Option<String>, String)> = board_user_roles::table
                .inner_join(users::table)
                .inner_join(roles::table)
                .filter(board_user_roles::board_id.eq(board_id))
                .select((users::id, users::email, users::name, users::photo, roles::name))
                .order(users::id)
                .load(conn)?;
            Ok(rows
                .into_iter()
                .map(|(id, email, name, photo, role)| BoardMember {
                    id,
                    email,
                    name,
                    photo,
                    role,
                })
                .collect())
        })
        .await
    }

    async fn find_membership(
        &self,
        board_id: i32,
        user_id: i32,
        role_id: i32,
    ) -> StoreResult<Option<BoardUserRole>> {
        self.run(move |conn| {
            Ok(board_user_roles::table
                .find((board_id, user_id, role_id))
                .select(BoardUserRole::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    async fn create_board_with_admin(
        &self,
        new_board: NewBoard,
        user_id: i32,
    ) -> StoreResult<Board> {
        self.run(move |conn| {
            conn.transaction::<_, StoreError, _>(|conn| {
                let board: Board = insert_into(boards::table)
                    .values(new_board)
                    .returning(Board::as_returning())
                    .get_result(conn)?;
                let admin_id: i32 = roles::table
                    .filter(roles::name.eq(RoleName::Admin.as_str()))
                    .select(roles::id)
                    .first(conn)
                    .optional()?
                    .ok_or(StoreError::MissingRole(RoleName::Admin))?;
                insert_into(board_user_roles::table)
                    .values(BoardUserRole { board_id: board.id, user_id, role_id: admin_id })
                    .execute(conn)?;
                Ok(board)
            })
        })
        .await
    }

    async fn update_board(&self, board_id: i32, changes: BoardChanges) -> StoreResult<Board> {
        self.run(move |conn| {
            conn.transaction::<_, StoreError, _>(|conn| {
                if !changes.removed_users.is_empty() {
                    delete(
                        board_user_roles::table
                            .filter(board_user_roles::board_id.eq(board_id))
                            .filter(board_user_roles::role_id.eq(changes.member_role_id))
                            .filter(board_user_roles::user_id.eq_any(&changes.removed_users)),
                    )
                    .execute(conn)?;
                }
                if !changes.added_users.is_empty() {
                    let on_board: Vec<i32> = board_user_roles::table
                        .filter(board_user_roles::board_id.eq(board_id))
                        .select(board_user_roles::user_id)
                        .load(conn)?;
                    let added: Vec<BoardUserRole> = changes
                        .added_users
                        .iter()
                        .filter(|user_id| !on_board.contains(user_id))
                        .map(|user_id| BoardUserRole {
                            board_id,
                            user_id: *user_id,
                            role_id: changes.member_role_id,
                        })
                        .collect();
                    if !added.is_empty() {
                        insert_into(board_user_roles::table)
                            .values(&added)
                            .on_conflict_do_nothing()
                            .execute(conn)?;
                    }
                }
                let board = match changes.name {
                    Some(name) => update(boards::table.find(board_id))
                        .set(boards::name.eq(name))
                        .returning(Board::as_returning())
                        .get_result(conn)
                        .optional()?,
                    None => boards::table
                        .find(board_id)
                        .select(Board::as_select())
                        .first(conn)
                        .optional()?,
                };
                board.ok_or(StoreError::MissingRow { table: "boards", id: board_id })
            })
        })
        .await
    }

    async fn add_membership(&self, membership: BoardUserRole) -> StoreResult<BoardUserRole> {
        self.run(move |conn| {
            Ok(insert_into(board_user_roles::table)
                .values(membership)
                .returning(BoardUserRole::as_returning())
                .get_result(conn)?)
        })
        .await
    }

    async fn remove_membership(
        &self,
        board_id: i32,
        user_id: i32,
        role_id: i32,
    ) -> StoreResult<Option<BoardUserRole>> {
        self.run(move |conn| {
            Ok(delete(board_user_roles::table.find((board_id, user_id, role_id)))
                .returning(BoardUserRole::as_returning())
                .get_result(conn)
                .optional()?)
        })
        .await
    }

    async fn delete_board(&self, board_id: i32) -> StoreResult<()> {
        self.run(move |conn| {
            conn.transaction::<_, StoreError, _>(|conn| {
                let board_columns = columns::table
                    .filter(columns::board_id.eq(board_id))
                    .select(columns::id);
                let board_tasks = tasks::table
                    .filter(tasks::column_id.eq_any(board_columns.clone()))
                    .select(tasks::id);
                delete(comments::table.filter(comments::task_id.eq_any(board_tasks)))
                    .execute(conn)?;
                delete(tasks::table.filter(tasks::column_id.eq_any(board_columns)))
                    .execute(conn)?;
                delete(columns::table.filter(columns::board_id.eq(board_id))).execute(conn)?;
                delete(board_user_roles::table.filter(board_user_roles::board_id.eq(board_id)))
                    .execute(conn)?;
                let removed = delete(boards::table.find(board_id)).execute(conn)?;
                if removed == 0 {
                    return Err(StoreError::MissingRow { table: "boards", id: board_id });
                }
                Ok(())
            })
        })
        .await
    }
}
