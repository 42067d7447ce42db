//! Category entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};

use quill_core::domain::{Category, NewCategory};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// Lower-cased name; unique, used for lookups.
    #[sea_orm(unique)]
    pub normalized_name: String,
    pub description: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Category {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            created_at: model.created_at.into(),
            version: model.version,
        }
    }
}

impl From<NewCategory> for ActiveModel {
    fn from(category: NewCategory) -> Self {
        Self {
            id: NotSet,
            normalized_name: Set(Category::normalize_name(&category.name)),
            name: Set(category.name),
            description: Set(category.description),
            created_at: Set(category.created_at.into()),
            version: Set(1),
        }
    }
}
