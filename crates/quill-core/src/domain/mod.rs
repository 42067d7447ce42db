//! Domain entities - the core business objects.

mod category;
mod like;
mod post;
mod user;

pub use category::{Category, NewCategory};
pub use like::{Like, LikeDetails, NewLike};
pub use post::{NewPost, Post, PostDetails, PostFilter};
pub use user::{User, UserSummary};
