//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use blogify_core::domain::{Post, PostStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum StatusColumn {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "draft")]
    Draft,
}

impl From<PostStatus> for StatusColumn {
    fn from(status: PostStatus) -> Self {
        match status {
            PostStatus::Active => StatusColumn::Active,
            PostStatus::Draft => StatusColumn::Draft,
        }
    }
}

impl From<StatusColumn> for PostStatus {
    fn from(status: StatusColumn) -> Self {
        match status {
            StatusColumn::Active => PostStatus::Active,
            StatusColumn::Draft => PostStatus::Draft,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub cover_image_url: String,
    pub status: StatusColumn,
    pub views: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub trending_score: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::OwnerId",
        to = "super::account::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Owner,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
    #[sea_orm(has_many = "super::post_like::Entity")]
    Like,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl Related<super::post_like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Like.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            title: model.title,
            body: model.body,
            slug: model.slug,
            cover_image_url: model.cover_image_url,
            status: model.status.into(),
            views: model.views,
            like_count: model.like_count,
            comment_count: model.comment_count,
            trending_score: model.trending_score,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        Self {
            id: Set(post.id),
            owner_id: Set(post.owner_id),
            title: Set(post.title),
            body: Set(post.body),
            slug: Set(post.slug),
            cover_image_url: Set(post.cover_image_url),
            status: Set(post.status.into()),
            views: Set(post.views),
            like_count: Set(post.like_count),
            comment_count: Set(post.comment_count),
            trending_score: Set(post.trending_score),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
