use super::{RepoResult, Repository};
use crate::models::{
    Category, Comment, CommentChanges, Favorite, Like, NewPost, Post, PostChanges, PostFilter,
    User,
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder};
use uuid::Uuid;

// Column list shared by every post query; `p` is posts, `usr` is users.
const POST_COLUMNS: &str =
    "p.id, p.title, p.body, p.owner_id, usr.username AS owner, p.category_id, p.created_at";

const COMMENT_COLUMNS: &str =
    "c.id, c.post_id, c.owner_id, usr.username AS owner, c.body, c.created_at";

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL. Queries are checked at
/// runtime so the crate builds without a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapes LIKE wildcards so the search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// push_post_filter
///
/// Appends the search/owner/category predicates. The builder must already end
/// with a `WHERE TRUE` clause.
fn push_post_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &PostFilter) {
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        builder.push(" AND p.title ILIKE ");
        builder.push_bind(format!("%{}%", escape_like(search)));
    }

    if let Some(owner) = filter.owner {
        builder.push(" AND p.owner_id = ");
        builder.push_bind(owner);
    }

    if let Some(category) = filter.category {
        builder.push(" AND p.category_id = ");
        builder.push_bind(category);
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- USERS ---

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, username FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    // --- CATEGORIES ---

    async fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    async fn find_category(&self, id: i64) -> RepoResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn create_category(&self, name: String) -> RepoResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    // --- POSTS ---

    /// list_posts
    ///
    /// Builds the filtered listing with QueryBuilder so every user-supplied value
    /// is bound, never interpolated.
    async fn list_posts(&self, filter: &PostFilter, limit: i64, offset: i64) -> RepoResult<Vec<Post>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {POST_COLUMNS} FROM posts p JOIN users usr ON usr.id = p.owner_id WHERE TRUE"
        ));
        push_post_filter(&mut builder, filter);
        builder.push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let posts = builder
            .build_query_as::<Post>()
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }

    async fn count_posts(&self, filter: &PostFilter) -> RepoResult<i64> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM posts p WHERE TRUE");
        push_post_filter(&mut builder, filter);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn find_post(&self, id: i64) -> RepoResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts p JOIN users usr ON usr.id = p.owner_id WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    /// create_post
    ///
    /// Inserts and joins the owner's username in one round trip (CTE).
    async fn create_post(&self, post: NewPost) -> RepoResult<Post> {
        let created = sqlx::query_as::<_, Post>(&format!(
            r#"
            WITH p AS (
                INSERT INTO posts (title, body, owner_id, category_id)
                VALUES ($1, $2, $3, $4)
                RETURNING id, title, body, owner_id, category_id, created_at
            )
            SELECT {POST_COLUMNS} FROM p JOIN users usr ON usr.id = p.owner_id
            "#
        ))
        .bind(post.title)
        .bind(post.body)
        .bind(post.owner_id)
        .bind(post.category_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// update_post
    ///
    /// COALESCE keeps columns whose change is `None`. The category uses an
    /// explicit flag because `NULL` is a legitimate new value.
    async fn update_post(&self, id: i64, changes: PostChanges) -> RepoResult<Option<Post>> {
        let (set_category, category) = match changes.category {
            Some(category) => (true, category),
            None => (false, None),
        };

        let updated = sqlx::query_as::<_, Post>(&format!(
            r#"
            WITH p AS (
                UPDATE posts
                SET title = COALESCE($2, title),
                    body = COALESCE($3, body),
                    category_id = CASE WHEN $4 THEN $5 ELSE category_id END
                WHERE id = $1
                RETURNING id, title, body, owner_id, category_id, created_at
            )
            SELECT {POST_COLUMNS} FROM p JOIN users usr ON usr.id = p.owner_id
            "#
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.body)
        .bind(set_category)
        .bind(category)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_post(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- COMMENTS ---

    async fn list_comments(&self, post_id: Option<i64>) -> RepoResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c JOIN users usr ON usr.id = c.owner_id
            WHERE ($1::BIGINT IS NULL OR c.post_id = $1)
            ORDER BY c.created_at ASC, c.id ASC
            "#
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    async fn find_comment(&self, id: i64) -> RepoResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments c JOIN users usr ON usr.id = c.owner_id WHERE c.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn create_comment(&self, post_id: i64, owner_id: Uuid, body: String) -> RepoResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            WITH c AS (
                INSERT INTO comments (post_id, owner_id, body)
                VALUES ($1, $2, $3)
                RETURNING id, post_id, owner_id, body, created_at
            )
            SELECT {COMMENT_COLUMNS} FROM c JOIN users usr ON usr.id = c.owner_id
            "#
        ))
        .bind(post_id)
        .bind(owner_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn update_comment(&self, id: i64, changes: CommentChanges) -> RepoResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            WITH c AS (
                UPDATE comments
                SET post_id = COALESCE($2, post_id),
                    body = COALESCE($3, body)
                WHERE id = $1
                RETURNING id, post_id, owner_id, body, created_at
            )
            SELECT {COMMENT_COLUMNS} FROM c JOIN users usr ON usr.id = c.owner_id
            "#
        ))
        .bind(id)
        .bind(changes.post_id)
        .bind(changes.body)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn delete_comment(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- LIKES ---

    async fn find_like(&self, owner_id: Uuid, post_id: i64) -> RepoResult<Option<Like>> {
        let like = sqlx::query_as::<_, Like>(
            r#"
            SELECT l.id, l.owner_id, usr.username AS owner, l.post_id
            FROM likes l JOIN users usr ON usr.id = l.owner_id
            WHERE l.owner_id = $1 AND l.post_id = $2
            "#,
        )
        .bind(owner_id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(like)
    }

    async fn list_likes(&self, post_id: i64) -> RepoResult<Vec<Like>> {
        let likes = sqlx::query_as::<_, Like>(
            r#"
            SELECT l.id, l.owner_id, usr.username AS owner, l.post_id
            FROM likes l JOIN users usr ON usr.id = l.owner_id
            WHERE l.post_id = $1
            ORDER BY l.id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(likes)
    }

    async fn count_likes(&self, post_id: i64) -> RepoResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// create_like
    ///
    /// Relies on `likes_owner_post_key`: a concurrent duplicate surfaces as
    /// `RepoError::UniqueViolation` instead of a second row.
    async fn create_like(&self, owner_id: Uuid, post_id: i64) -> RepoResult<Like> {
        let like = sqlx::query_as::<_, Like>(
            r#"
            WITH l AS (
                INSERT INTO likes (owner_id, post_id) VALUES ($1, $2)
                RETURNING id, owner_id, post_id
            )
            SELECT l.id, l.owner_id, usr.username AS owner, l.post_id
            FROM l JOIN users usr ON usr.id = l.owner_id
            "#,
        )
        .bind(owner_id)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(like)
    }

    async fn delete_like(&self, owner_id: Uuid, post_id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE owner_id = $1 AND post_id = $2")
            .bind(owner_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- FAVORITES ---

    async fn create_favorite(&self, owner_id: Uuid, post_id: i64) -> RepoResult<Favorite> {
        let favorite = sqlx::query_as::<_, Favorite>(
            "INSERT INTO favorites (owner_id, post_id) VALUES ($1, $2) RETURNING id, owner_id, post_id",
        )
        .bind(owner_id)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(favorite)
    }

    async fn delete_favorite(&self, owner_id: Uuid, post_id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE owner_id = $1 AND post_id = $2")
            .bind(owner_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
