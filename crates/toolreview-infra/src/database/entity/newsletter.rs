//! Newsletter signup entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use toolreview_core::domain::NewsletterSignup;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "newsletter_signups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub confirmed: bool,
    pub confirm_token: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for NewsletterSignup {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            confirmed: model.confirmed,
            confirm_token: model.confirm_token,
            date: model.created_at.into(),
        }
    }
}

impl From<NewsletterSignup> for ActiveModel {
    fn from(signup: NewsletterSignup) -> Self {
        Self {
            id: Set(signup.id),
            email: Set(signup.email),
            confirmed: Set(signup.confirmed),
            confirm_token: Set(signup.confirm_token),
            created_at: Set(signup.date.into()),
        }
    }
}
