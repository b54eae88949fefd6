use async_trait::async_trait;
use diesel::{
    delete, insert_into, update, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl,
    SelectableHelper,
};

use super::PgStore;
use crate::db::{
    models::{Comment, NewComment},
    schema::comments,
    CommentRepo, StoreResult,
};

#[async_trait]
impl CommentRepo for PgStore {
    async fn find_comment(&self, id: i32) -> StoreResult<Option<Comment>> {
        self.run(move |conn| {
            Ok(comments::table
                .find(id)
                .select(Comment::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    async fn list_comments(&self, task_id: i32) -> StoreResult<Vec<Comment>> {
        self.run(move |conn| {
            Ok(comments::table
                .filter(comments::task_id.eq(task_id))
                .order(comments::id)
                .select(Comment::as_select())
                .load(conn)?)
        })
        .await
    }

    async fn insert_comment(&self, new_comment: NewComment) -> StoreResult<Comment> {
        self.run(move |conn| {
            Ok(insert_into(comments::table)
                .values(new_comment)
                .returning(Comment::as_returning())
                .get_result(conn)?)
        })
        .await
    }

    async fn update_comment(&self, id: i32, content: String) -> StoreResult<Option<Comment>> {
        self.run(move |conn| {
            Ok(update(comments::table.find(id))
                .set(comments::content.eq(content))
                .returning(Comment::as_returning())
                .get_result(conn)
                .optional()?)
        })
        .await
    }

    // replies go with their parent through the answer_id cascade
    async fn delete_comment(&self, id: i32) -> StoreResult<()> {
        self.run(move |conn| {
            delete(comments::table.find(id)).execute(conn)?;
            Ok(())
        })
        .await
    }
}
