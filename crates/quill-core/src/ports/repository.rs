use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Category, Like, LikeDetails, NewCategory, NewLike, NewPost, Post, PostDetails, PostFilter,
    User,
};
use crate::error::RepoError;

/// Generic repository trait shared by every record set.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID. Returns `RepoError::NotFound` if nothing was deleted.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository - the identity store's account table.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by username, ignoring case.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Store a new user. Fails with `RepoError::Constraint` if the username is taken.
    async fn insert(&self, user: User) -> Result<User, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i32> {
    /// Posts matching the filter, newest first, with author, category and like count.
    async fn list(&self, filter: &PostFilter) -> Result<Vec<PostDetails>, RepoError>;

    /// A single post with author, category and like count.
    async fn find_details(&self, id: i32) -> Result<Option<PostDetails>, RepoError>;

    async fn insert(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Write `post` if the stored version still equals `post.version`.
    ///
    /// Returns the stored post with its version bumped. Fails with `RepoError::Stale`
    /// when the versions differ and `RepoError::NotFound` when the row is gone.
    async fn update(&self, post: Post) -> Result<Post, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, i32> {
    /// All categories ordered by name.
    async fn list(&self) -> Result<Vec<Category>, RepoError>;

    /// Find a category by name, ignoring case.
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError>;

    async fn insert(&self, category: NewCategory) -> Result<Category, RepoError>;

    /// Optimistic update, same contract as [`PostRepository::update`].
    async fn update(&self, category: Category) -> Result<Category, RepoError>;
}

/// Like repository.
#[async_trait]
pub trait LikeRepository: BaseRepository<Like, i32> {
    /// Likes on a post with the liking user expanded, oldest first.
    async fn list_for_post(&self, post_id: i32) -> Result<Vec<LikeDetails>, RepoError>;

    /// The like `user_id` left on `post_id`, if any.
    async fn find(&self, post_id: i32, user_id: Uuid) -> Result<Option<Like>, RepoError>;

    /// Store a new like. Fails with `RepoError::Constraint` on a duplicate pair.
    async fn insert(&self, like: NewLike) -> Result<Like, RepoError>;
}

/// Rows removed by one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrphanReport {
    pub posts_removed: u64,
    pub likes_removed: u64,
}

impl OrphanReport {
    pub fn is_empty(&self) -> bool {
        self.posts_removed == 0 && self.likes_removed == 0
    }
}

/// Integrity maintenance over the blog tables.
#[async_trait]
pub trait MaintenanceRepository: Send + Sync {
    /// Remove posts whose author no longer exists, then likes whose post or user
    /// no longer exists.
    async fn purge_orphans(&self) -> Result<OrphanReport, RepoError>;
}
