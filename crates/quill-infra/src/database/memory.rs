//! In-memory store - used when no database is configured, and in tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{
    Category, Like, LikeDetails, NewCategory, NewLike, NewPost, Post, PostDetails, PostFilter,
    User,
};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CategoryRepository, LikeRepository, MaintenanceRepository, OrphanReport,
    PostRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<Uuid, User>,
    posts: BTreeMap<i32, Post>,
    categories: BTreeMap<i32, Category>,
    likes: BTreeMap<i32, Like>,
    next_post_id: i32,
    next_category_id: i32,
    next_like_id: i32,
}

impl Tables {
    fn next_id(counter: &mut i32) -> i32 {
        *counter += 1;
        *counter
    }

    /// Mirrors the unique index on `categories.normalized_name`.
    fn ensure_category_name_free(&self, name: &str, except: Option<i32>) -> Result<(), RepoError> {
        let taken = self
            .categories
            .values()
            .any(|c| Some(c.id) != except && c.has_name(name));
        if taken {
            return Err(RepoError::Constraint(format!(
                "category name '{}' already exists",
                name
            )));
        }
        Ok(())
    }

    fn details(&self, post: &Post) -> PostDetails {
        PostDetails {
            post: post.clone(),
            author: post
                .author_id
                .and_then(|id| self.users.get(&id))
                .map(User::summary),
            category: post
                .category_id
                .and_then(|id| self.categories.get(&id))
                .cloned(),
            likes_count: self.likes.values().filter(|l| l.post_id == post.id).count() as u64,
        }
    }
}

/// All four record sets behind a single async `RwLock`.
///
/// One lock keeps cascades and expansions consistent across tables. Foreign-key
/// behaviour mirrors the SQL schema: deleting a post deletes its likes, deleting a
/// category detaches its posts, and users are not referenced by constraints.
/// Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    /// Removes the account only; rows referencing it become orphans.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.tables
            .write()
            .await
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let key = User::normalize_username(username);
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| User::normalize_username(&u.username) == key)
            .cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        let key = User::normalize_username(&user.username);

        if tables
            .users
            .values()
            .any(|u| u.id == user.id || User::normalize_username(&u.username) == key)
        {
            return Err(RepoError::Constraint("users.normalized_username".to_string()));
        }

        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl BaseRepository<Post, i32> for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.posts.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        tables.likes.retain(|_, like| like.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn list(&self, filter: &PostFilter) -> Result<Vec<PostDetails>, RepoError> {
        let tables = self.tables.read().await;

        let mut posts: Vec<&Post> = tables.posts.values().filter(|p| filter.matches(p)).collect();
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(posts.into_iter().map(|p| tables.details(p)).collect())
    }

    async fn find_details(&self, id: i32) -> Result<Option<PostDetails>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).map(|p| tables.details(p)))
    }

    async fn insert(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;

        if let Some(category_id) = post.category_id {
            if !tables.categories.contains_key(&category_id) {
                return Err(RepoError::Constraint("posts.category_id".to_string()));
            }
        }

        let id = Tables::next_id(&mut tables.next_post_id);
        let post = Post {
            id,
            title: post.title,
            content: post.content,
            created_at: post.created_at,
            updated_at: None,
            author_id: post.author_id,
            category_id: post.category_id,
            version: 1,
        };
        tables.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;

        if let Some(category_id) = post.category_id {
            if !tables.categories.contains_key(&category_id) {
                return Err(RepoError::Constraint("posts.category_id".to_string()));
            }
        }

        let stored = tables.posts.get_mut(&post.id).ok_or(RepoError::NotFound)?;
        if stored.version != post.version {
            return Err(RepoError::Stale(format!(
                "post {} is no longer at version {}",
                post.id, post.version
            )));
        }

        stored.title = post.title;
        stored.content = post.content;
        stored.category_id = post.category_id;
        stored.updated_at = Some(post.updated_at.unwrap_or_else(chrono::Utc::now));
        stored.version += 1;
        Ok(stored.clone())
    }
}

#[async_trait]
impl BaseRepository<Category, i32> for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Category>, RepoError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.categories.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        for post in tables.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.values().find(|c| c.has_name(name)).cloned())
    }

    async fn insert(&self, category: NewCategory) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        tables.ensure_category_name_free(&category.name, None)?;
        let id = Tables::next_id(&mut tables.next_category_id);
        let category = Category {
            id,
            name: category.name,
            description: category.description,
            created_at: category.created_at,
            version: 1,
        };
        tables.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn update(&self, category: Category) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        tables.ensure_category_name_free(&category.name, Some(category.id))?;
        let stored = tables
            .categories
            .get_mut(&category.id)
            .ok_or(RepoError::NotFound)?;

        if stored.version != category.version {
            return Err(RepoError::Stale(format!(
                "category {} is no longer at version {}",
                category.id, category.version
            )));
        }

        stored.name = category.name;
        stored.description = category.description;
        stored.version += 1;
        Ok(stored.clone())
    }
}

#[async_trait]
impl BaseRepository<Like, i32> for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Like>, RepoError> {
        Ok(self.tables.read().await.likes.get(&id).cloned())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        self.tables
            .write()
            .await
            .likes
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl LikeRepository for InMemoryStore {
    async fn list_for_post(&self, post_id: i32) -> Result<Vec<LikeDetails>, RepoError> {
        let tables = self.tables.read().await;
        let mut likes: Vec<LikeDetails> = tables
            .likes
            .values()
            .filter(|l| l.post_id == post_id)
            .map(|l| LikeDetails {
                like: l.clone(),
                user: tables.users.get(&l.user_id).map(User::summary),
            })
            .collect();
        likes.sort_by(|a, b| {
            a.like
                .created_at
                .cmp(&b.like.created_at)
                .then_with(|| a.like.id.cmp(&b.like.id))
        });
        Ok(likes)
    }

    async fn find(&self, post_id: i32, user_id: Uuid) -> Result<Option<Like>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .likes
            .values()
            .find(|l| l.post_id == post_id && l.user_id == user_id)
            .cloned())
    }

    async fn insert(&self, like: NewLike) -> Result<Like, RepoError> {
        let mut tables = self.tables.write().await;

        if !tables.posts.contains_key(&like.post_id) {
            return Err(RepoError::Constraint("likes.post_id".to_string()));
        }
        if tables
            .likes
            .values()
            .any(|l| l.post_id == like.post_id && l.user_id == like.user_id)
        {
            return Err(RepoError::Constraint("likes.post_id_user_id".to_string()));
        }

        let id = Tables::next_id(&mut tables.next_like_id);
        let like = Like {
            id,
            post_id: like.post_id,
            user_id: like.user_id,
            created_at: like.created_at,
        };
        tables.likes.insert(id, like.clone());
        Ok(like)
    }
}

#[async_trait]
impl MaintenanceRepository for InMemoryStore {
    async fn purge_orphans(&self) -> Result<OrphanReport, RepoError> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;

        let posts_before = tables.posts.len();
        let users = &tables.users;
        tables
            .posts
            .retain(|_, p| p.author_id.is_none_or(|id| users.contains_key(&id)));
        let posts_removed = (posts_before - tables.posts.len()) as u64;

        let likes_before = tables.likes.len();
        let posts = &tables.posts;
        tables
            .likes
            .retain(|_, l| posts.contains_key(&l.post_id) && users.contains_key(&l.user_id));
        let likes_removed = (likes_before - tables.likes.len()) as u64;

        Ok(OrphanReport {
            posts_removed,
            likes_removed,
        })
    }
}
