use super::{RepoResult, Repository};
use crate::error::RepoError;
use crate::models::{
    Category, Comment, CommentChanges, Favorite, Like, NewPost, Post, PostChanges, PostFilter,
    User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

struct PostRecord {
    id: i64,
    title: String,
    body: String,
    owner_id: Uuid,
    category_id: Option<i64>,
    created_at: DateTime<Utc>,
}

struct CommentRecord {
    id: i64,
    post_id: i64,
    owner_id: Uuid,
    body: String,
    created_at: DateTime<Utc>,
}

struct LikeRecord {
    id: i64,
    owner_id: Uuid,
    post_id: i64,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    categories: Vec<Category>,
    posts: Vec<PostRecord>,
    comments: Vec<CommentRecord>,
    likes: Vec<LikeRecord>,
    favorites: Vec<Favorite>,
    // One sequence per table, like BIGSERIAL.
    sequences: [i64; 5],
}

#[derive(Clone, Copy)]
enum Table {
    Categories,
    Posts,
    Comments,
    Likes,
    Favorites,
}

impl Tables {
    fn next_id(&mut self, table: Table) -> i64 {
        let seq = &mut self.sequences[table as usize];
        *seq += 1;
        *seq
    }

    fn username(&self, id: Uuid) -> String {
        self.users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }

    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn post_exists(&self, id: i64) -> bool {
        self.posts.iter().any(|p| p.id == id)
    }

    fn category_exists(&self, id: Option<i64>) -> bool {
        id.is_none_or(|id| self.categories.iter().any(|c| c.id == id))
    }

    fn post(&self, record: &PostRecord) -> Post {
        Post {
            id: record.id,
            title: record.title.clone(),
            body: record.body.clone(),
            owner_id: record.owner_id,
            owner: self.username(record.owner_id),
            category_id: record.category_id,
            created_at: record.created_at,
        }
    }

    fn comment(&self, record: &CommentRecord) -> Comment {
        Comment {
            id: record.id,
            post_id: record.post_id,
            owner_id: record.owner_id,
            owner: self.username(record.owner_id),
            body: record.body.clone(),
            created_at: record.created_at,
        }
    }

    fn like(&self, record: &LikeRecord) -> Like {
        Like {
            id: record.id,
            owner_id: record.owner_id,
            owner: self.username(record.owner_id),
            post_id: record.post_id,
        }
    }

    // Newest first, ties broken by id.
    fn filtered_posts(&self, filter: &PostFilter) -> Vec<&PostRecord> {
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let mut posts: Vec<&PostRecord> = self
            .posts
            .iter()
            .filter(|p| {
                needle
                    .as_deref()
                    .is_none_or(|n| p.title.to_lowercase().contains(n))
            })
            .filter(|p| filter.owner.is_none_or(|o| p.owner_id == o))
            .filter(|p| filter.category.is_none_or(|c| p.category_id == Some(c)))
            .collect();
        posts.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        posts
    }
}

/// InMemoryRepository
///
/// A `Repository` held entirely in process memory with the same constraint
/// semantics as the Postgres schema: unique (owner, post) for likes and
/// favorites, unique category names, foreign keys, and cascading post deletes.
/// Used by the test suites in place of a live database.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: Mutex<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an identity-provider user so it can own rows and authenticate.
    pub fn with_user(self, id: Uuid, username: &str) -> Self {
        self.lock().users.push(User {
            id,
            username: username.to_string(),
        });
        self
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_categories(&self) -> RepoResult<Vec<Category>> {
        Ok(self.lock().categories.clone())
    }

    async fn find_category(&self, id: i64) -> RepoResult<Option<Category>> {
        Ok(self.lock().categories.iter().find(|c| c.id == id).cloned())
    }

    async fn create_category(&self, name: String) -> RepoResult<Category> {
        let mut tables = self.lock();
        if tables.categories.iter().any(|c| c.name == name) {
            return Err(RepoError::UniqueViolation);
        }
        let category = Category {
            id: tables.next_id(Table::Categories),
            name,
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn list_posts(&self, filter: &PostFilter, limit: i64, offset: i64) -> RepoResult<Vec<Post>> {
        let tables = self.lock();
        let posts = tables
            .filtered_posts(filter)
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .map(|p| tables.post(p))
            .collect();
        Ok(posts)
    }

    async fn count_posts(&self, filter: &PostFilter) -> RepoResult<i64> {
        let count = self.lock().filtered_posts(filter).len();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn find_post(&self, id: i64) -> RepoResult<Option<Post>> {
        let tables = self.lock();
        Ok(tables.posts.iter().find(|p| p.id == id).map(|p| tables.post(p)))
    }

    async fn create_post(&self, post: NewPost) -> RepoResult<Post> {
        let mut tables = self.lock();
        if !tables.user_exists(post.owner_id) || !tables.category_exists(post.category_id) {
            return Err(RepoError::ForeignKeyViolation);
        }
        let record = PostRecord {
            id: tables.next_id(Table::Posts),
            title: post.title,
            body: post.body,
            owner_id: post.owner_id,
            category_id: post.category_id,
            created_at: Utc::now(),
        };
        let created = tables.post(&record);
        tables.posts.push(record);
        Ok(created)
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> RepoResult<Option<Post>> {
        let mut tables = self.lock();
        if let Some(category) = changes.category {
            if !tables.category_exists(category) {
                return Err(RepoError::ForeignKeyViolation);
            }
        }
        let Some(index) = tables.posts.iter().position(|p| p.id == id) else {
            return Ok(None);
        };
        let record = &mut tables.posts[index];
        if let Some(title) = changes.title {
            record.title = title;
        }
        if let Some(body) = changes.body {
            record.body = body;
        }
        if let Some(category) = changes.category {
            record.category_id = category;
        }
        Ok(Some(tables.post(&tables.posts[index])))
    }

    async fn delete_post(&self, id: i64) -> RepoResult<bool> {
        let mut tables = self.lock();
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        if tables.posts.len() == before {
            return Ok(false);
        }
        tables.comments.retain(|c| c.post_id != id);
        tables.likes.retain(|l| l.post_id != id);
        tables.favorites.retain(|f| f.post_id != id);
        Ok(true)
    }

    async fn list_comments(&self, post_id: Option<i64>) -> RepoResult<Vec<Comment>> {
        let tables = self.lock();
        let mut comments: Vec<&CommentRecord> = tables
            .comments
            .iter()
            .filter(|c| post_id.is_none_or(|id| c.post_id == id))
            .collect();
        comments.sort_by_key(|c| (c.created_at, c.id));
        Ok(comments.into_iter().map(|c| tables.comment(c)).collect())
    }

    async fn find_comment(&self, id: i64) -> RepoResult<Option<Comment>> {
        let tables = self.lock();
        Ok(tables
            .comments
            .iter()
            .find(|c| c.id == id)
            .map(|c| tables.comment(c)))
    }

    async fn create_comment(&self, post_id: i64, owner_id: Uuid, body: String) -> RepoResult<Comment> {
        let mut tables = self.lock();
        if !tables.post_exists(post_id) || !tables.user_exists(owner_id) {
            return Err(RepoError::ForeignKeyViolation);
        }
        let record = CommentRecord {
            id: tables.next_id(Table::Comments),
            post_id,
            owner_id,
            body,
            created_at: Utc::now(),
        };
        let created = tables.comment(&record);
        tables.comments.push(record);
        Ok(created)
    }

    async fn update_comment(&self, id: i64, changes: CommentChanges) -> RepoResult<Option<Comment>> {
        let mut tables = self.lock();
        if let Some(post_id) = changes.post_id {
            if !tables.post_exists(post_id) {
                return Err(RepoError::ForeignKeyViolation);
            }
        }
        let Some(index) = tables.comments.iter().position(|c| c.id == id) else {
            return Ok(None);
        };
        let record = &mut tables.comments[index];
        if let Some(post_id) = changes.post_id {
            record.post_id = post_id;
        }
        if let Some(body) = changes.body {
            record.body = body;
        }
        Ok(Some(tables.comment(&tables.comments[index])))
    }

    async fn delete_comment(&self, id: i64) -> RepoResult<bool> {
        let mut tables = self.lock();
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        Ok(tables.comments.len() < before)
    }

    async fn find_like(&self, owner_id: Uuid, post_id: i64) -> RepoResult<Option<Like>> {
        let tables = self.lock();
        Ok(tables
            .likes
            .iter()
            .find(|l| l.owner_id == owner_id && l.post_id == post_id)
            .map(|l| tables.like(l)))
    }

    async fn list_likes(&self, post_id: i64) -> RepoResult<Vec<Like>> {
        let tables = self.lock();
        Ok(tables
            .likes
            .iter()
            .filter(|l| l.post_id == post_id)
            .map(|l| tables.like(l))
            .collect())
    }

    async fn count_likes(&self, post_id: i64) -> RepoResult<i64> {
        let count = self.lock().likes.iter().filter(|l| l.post_id == post_id).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn create_like(&self, owner_id: Uuid, post_id: i64) -> RepoResult<Like> {
        let mut tables = self.lock();
        if !tables.post_exists(post_id) || !tables.user_exists(owner_id) {
            return Err(RepoError::ForeignKeyViolation);
        }
        if tables
            .likes
            .iter()
            .any(|l| l.owner_id == owner_id && l.post_id == post_id)
        {
            return Err(RepoError::UniqueViolation);
        }
        let record = LikeRecord {
            id: tables.next_id(Table::Likes),
            owner_id,
            post_id,
        };
        let created = tables.like(&record);
        tables.likes.push(record);
        Ok(created)
    }

    async fn delete_like(&self, owner_id: Uuid, post_id: i64) -> RepoResult<bool> {
        let mut tables = self.lock();
        let before = tables.likes.len();
        tables
            .likes
            .retain(|l| !(l.owner_id == owner_id && l.post_id == post_id));
        Ok(tables.likes.len() < before)
    }

    async fn create_favorite(&self, owner_id: Uuid, post_id: i64) -> RepoResult<Favorite> {
        let mut tables = self.lock();
        if !tables.post_exists(post_id) || !tables.user_exists(owner_id) {
            return Err(RepoError::ForeignKeyViolation);
        }
        if tables
            .favorites
            .iter()
            .any(|f| f.owner_id == owner_id && f.post_id == post_id)
        {
            return Err(RepoError::UniqueViolation);
        }
        let favorite = Favorite {
            id: tables.next_id(Table::Favorites),
            owner_id,
            post_id,
        };
        tables.favorites.push(favorite.clone());
        Ok(favorite)
    }

    async fn delete_favorite(&self, owner_id: Uuid, post_id: i64) -> RepoResult<bool> {
        let mut tables = self.lock();
        let before = tables.favorites.len();
        tables
            .favorites
            .retain(|f| !(f.owner_id == owner_id && f.post_id == post_id));
        Ok(tables.favorites.len() < before)
    }
}
