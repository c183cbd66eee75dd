//! Post comment entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use toolreview_core::domain::Comment;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "post_comments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub post_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub author: String,
    pub author_email: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Comment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            text: model.text,
            author: model.author,
            author_email: model.author_email,
            date: model.created_at.into(),
        }
    }
}

impl ActiveModel {
    pub fn from_comment(post_id: Uuid, comment: Comment) -> Self {
        Self {
            id: Set(comment.id),
            post_id: Set(post_id),
            text: Set(comment.text),
            author: Set(comment.author),
            author_email: Set(comment.author_email),
            created_at: Set(comment.date.into()),
        }
    }
}
