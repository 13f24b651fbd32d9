use crate::db::{Entity, RepoResult, Repository};
use crate::users::repo_types::User;

impl Repository<User> {
    /// Find a user by (already normalized) email.
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE email = ? ORDER BY id LIMIT 1",
            User::COLUMNS,
            User::TABLE
        );
        let db = self.db();
        let mut conn = db.acquire().await?;
        let res = db
            .bounded(sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(&mut *conn))
            .await;
        db.release(conn);
        res
    }
}
