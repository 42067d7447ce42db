//! SeaORM entities for the blog tables.

pub mod category;
pub mod like;
pub mod post;
pub mod user;
