use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Set once at creation from the creating principal; never reassigned.
    #[sea_orm(column_name = "owner_id")]
    pub owner_id: i64,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub phone: String,
    pub email: String,
    pub web: Option<String>,
    #[sea_orm(column_name = "image_url")]
    pub image_url: Option<String>,
    #[sea_orm(column_name = "image_alt")]
    pub image_alt: Option<String>,
    pub street: String,
    #[sea_orm(column_name = "house_number")]
    pub house_number: String,
    pub city: String,
    pub country: String,
    pub zip: Option<String>,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
    #[sea_orm(column_name = "updated_at")]
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::card_likes::Entity")]
    CardLikes,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::card_likes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CardLikes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
