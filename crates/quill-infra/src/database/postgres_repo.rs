//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, QueryTrait, TransactionTrait,
};
use uuid::Uuid;

use quill_core::domain::{
    Category, Like, LikeDetails, NewCategory, NewLike, NewPost, Post, PostDetails, PostFilter,
    User, UserSummary,
};
use quill_core::error::RepoError;
use quill_core::ports::{
    CategoryRepository, LikeRepository, MaintenanceRepository, OrphanReport, PostRepository,
    UserRepository,
};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::like::{self, Entity as LikeEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL like repository.
pub type PostgresLikeRepository = PostgresBaseRepository<LikeEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username = %username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::NormalizedUsername.eq(User::normalize_username(username)))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let model = user::ActiveModel::from(user)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.into())
    }
}

#[derive(Debug, FromQueryResult)]
struct LikeCount {
    post_id: i32,
    likes: i64,
}

/// Attach authors, categories and like counts to a page of posts, in three queries.
async fn expand_posts(
    db: &DbConn,
    posts: Vec<post::Model>,
) -> Result<Vec<PostDetails>, RepoError> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<i32> = posts.iter().map(|p| p.id).collect();
    let author_ids: Vec<Uuid> = posts.iter().filter_map(|p| p.author_id).collect();
    let category_ids: Vec<i32> = posts.iter().filter_map(|p| p.category_id).collect();

    let authors: HashMap<Uuid, UserSummary> = if author_ids.is_empty() {
        HashMap::new()
    } else {
        UserEntity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|m| (m.id, UserSummary::from(m)))
            .collect()
    };

    let categories: HashMap<i32, Category> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        CategoryEntity::find()
            .filter(category::Column::Id.is_in(category_ids))
            .all(db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|m| (m.id, Category::from(m)))
            .collect()
    };

    let likes: HashMap<i32, u64> = LikeEntity::find()
        .select_only()
        .column(like::Column::PostId)
        .column_as(Expr::col(like::Column::Id).count(), "likes")
        .filter(like::Column::PostId.is_in(post_ids))
        .group_by(like::Column::PostId)
        .into_model::<LikeCount>()
        .all(db)
        .await
        .map_err(map_db_err)?
        .into_iter()
        .map(|c| (c.post_id, c.likes.max(0) as u64))
        .collect();

    Ok(posts
        .into_iter()
        .map(|model| {
            let author = model.author_id.and_then(|id| authors.get(&id).cloned());
            let category = model.category_id.and_then(|id| categories.get(&id).cloned());
            let likes_count = likes.get(&model.id).copied().unwrap_or(0);
            PostDetails {
                post: model.into(),
                author,
                category,
                likes_count,
            }
        })
        .collect())
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(&self, filter: &PostFilter) -> Result<Vec<PostDetails>, RepoError> {
        let mut query = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id);

        if let Some(term) = filter.search_term() {
            query = query.filter(
                Condition::any()
                    .add(post::Column::Title.contains(term))
                    .add(post::Column::Content.contains(term)),
            );
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(post::Column::CategoryId.eq(category_id));
        }

        let posts = query.all(&self.db).await.map_err(map_db_err)?;
        expand_posts(&self.db, posts).await
    }

    async fn find_details(&self, id: i32) -> Result<Option<PostDetails>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        Ok(expand_posts(&self.db, vec![model]).await?.into_iter().next())
    }

    async fn insert(&self, post: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(post)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let updated_at = DateTimeWithTimeZone::from(post.updated_at.unwrap_or_else(Utc::now));

        let result = PostEntity::update_many()
            .col_expr(post::Column::Title, Expr::value(post.title))
            .col_expr(post::Column::Content, Expr::value(post.content))
            .col_expr(post::Column::CategoryId, Expr::value(post.category_id))
            .col_expr(post::Column::UpdatedAt, Expr::value(updated_at))
            .col_expr(post::Column::Version, Expr::col(post::Column::Version).add(1))
            .filter(post::Column::Id.eq(post.id))
            .filter(post::Column::Version.eq(post.version))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        let current = PostEntity::find_by_id(post.id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        match (result.rows_affected, current) {
            (0, Some(_)) => Err(RepoError::Stale(format!(
                "post {} is no longer at version {}",
                post.id, post.version
            ))),
            (_, Some(model)) => Ok(model.into()),
            (_, None) => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::NormalizedName.eq(Category::normalize_name(name)))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn insert(&self, category: NewCategory) -> Result<Category, RepoError> {
        let model = category::ActiveModel::from(category)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn update(&self, category: Category) -> Result<Category, RepoError> {
        let result = CategoryEntity::update_many()
            .col_expr(
                category::Column::NormalizedName,
                Expr::value(Category::normalize_name(&category.name)),
            )
            .col_expr(category::Column::Name, Expr::value(category.name))
            .col_expr(category::Column::Description, Expr::value(category.description))
            .col_expr(
                category::Column::Version,
                Expr::col(category::Column::Version).add(1),
            )
            .filter(category::Column::Id.eq(category.id))
            .filter(category::Column::Version.eq(category.version))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        let current = CategoryEntity::find_by_id(category.id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        match (result.rows_affected, current) {
            (0, Some(_)) => Err(RepoError::Stale(format!(
                "category {} is no longer at version {}",
                category.id, category.version
            ))),
            (_, Some(model)) => Ok(model.into()),
            (_, None) => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl LikeRepository for PostgresLikeRepository {
    async fn list_for_post(&self, post_id: i32) -> Result<Vec<LikeDetails>, RepoError> {
        let likes = LikeEntity::find()
            .filter(like::Column::PostId.eq(post_id))
            .order_by_asc(like::Column::CreatedAt)
            .order_by_asc(like::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        if likes.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<Uuid> = likes.iter().map(|l| l.user_id).collect();
        let users: HashMap<Uuid, UserSummary> = UserEntity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|m| (m.id, UserSummary::from(m)))
            .collect();

        Ok(likes
            .into_iter()
            .map(|model| LikeDetails {
                user: users.get(&model.user_id).cloned(),
                like: model.into(),
            })
            .collect())
    }

    async fn find(&self, post_id: i32, user_id: Uuid) -> Result<Option<Like>, RepoError> {
        let result = LikeEntity::find()
            .filter(like::Column::PostId.eq(post_id))
            .filter(like::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn insert(&self, like: NewLike) -> Result<Like, RepoError> {
        let model = like::ActiveModel::from(like)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.into())
    }
}

/// Orphan reconciliation over the PostgreSQL tables.
pub struct PostgresMaintenanceRepository {
    db: DbConn,
}

impl PostgresMaintenanceRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MaintenanceRepository for PostgresMaintenanceRepository {
    async fn purge_orphans(&self) -> Result<OrphanReport, RepoError> {
        let user_ids = || {
            UserEntity::find()
                .select_only()
                .column(user::Column::Id)
                .into_query()
        };

        let txn = self.db.begin().await.map_err(map_db_err)?;

        let posts = PostEntity::delete_many()
            .filter(post::Column::AuthorId.is_not_null())
            .filter(post::Column::AuthorId.not_in_subquery(user_ids()))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        let likes_without_post = LikeEntity::delete_many()
            .filter(
                like::Column::PostId.not_in_subquery(
                    PostEntity::find()
                        .select_only()
                        .column(post::Column::Id)
                        .into_query(),
                ),
            )
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        let likes_without_user = LikeEntity::delete_many()
            .filter(like::Column::UserId.not_in_subquery(user_ids()))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;

        Ok(OrphanReport {
            posts_removed: posts.rows_affected,
            likes_removed: likes_without_post.rows_affected + likes_without_user.rows_affected,
        })
    }
}
