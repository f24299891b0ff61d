//! User repository functions, generic over `ConnectionTrait`.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use time::OffsetDateTime;

use crate::entities::users;
use crate::error::AppError;

pub async fn find_user_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<Option<users::Model>, AppError> {
    let user = users::Entity::find_by_id(user_id).one(conn).await?;
    Ok(user)
}

pub async fn find_user_by_email<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    email: &str,
) -> Result<Option<users::Model>, AppError> {
    let user = users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(conn)
        .await?;
    Ok(user)
}

pub async fn create_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    first_name: &str,
    last_name: &str,
    email: &str,
    password_hash: &str,
    is_business: bool,
) -> Result<users::Model, AppError> {
    let user = users::ActiveModel {
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash.to_string()),
        is_admin: Set(false),
        is_business: Set(is_business),
        created_at: Set(OffsetDateTime::now_utc()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(user)
}

/// Flip the business tier on the live record. Outstanding tokens keep their
/// old embedded flags, but the resolver reads this row, so the change takes
/// effect on the user's next request.
pub async fn set_business_tier<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user: users::Model,
    is_business: bool,
) -> Result<users::Model, AppError> {
    let mut active: users::ActiveModel = user.into();
    active.is_business = Set(is_business);
    let updated = active.update(conn).await?;
    Ok(updated)
}

pub async fn delete_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user: users::Model,
) -> Result<(), AppError> {
    user.delete(conn).await?;
    Ok(())
}

pub async fn list_users<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<users::Model>, AppError> {
    let users = users::Entity::find()
        .order_by_asc(users::Column::Id)
        .all(conn)
        .await?;
    Ok(users)
}
