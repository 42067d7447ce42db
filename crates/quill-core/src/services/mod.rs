//! Use-case services - the blog's operations, expressed against the ports only.
//!
//! Handlers translate HTTP into calls on these services; the services own every
//! business rule (validation, ownership of likes, uniqueness, concurrency checks).

mod auth;
mod categories;
mod likes;
mod posts;
mod reconciliation;

pub use auth::{AuthService, Session};
pub use categories::{CategoryService, CategoryUpdate};
pub use likes::LikeService;
pub use posts::{PostService, PostUpdate};
pub use reconciliation::ReconciliationService;

use crate::error::{DomainError, RepoError};

/// Map a repository `NotFound` onto a domain error naming the missing entity.
pub(crate) fn not_found_as(
    entity_type: &'static str,
    id: impl ToString,
) -> impl FnOnce(RepoError) -> DomainError {
    move |err| match err {
        RepoError::NotFound => DomainError::not_found(entity_type, id),
        other => other.into(),
    }
}
