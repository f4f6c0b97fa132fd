//! Movement store: the only place that touches the `movements` table.
//!
//! Every list query orders by `date DESC, id DESC`. Functions are generic over
//! the connection so they run both on the pool and inside a transaction.

use sea_orm::{
    ConnectionTrait, DbErr, PaginatorTrait, QueryOrder, QuerySelect, SelectTwo, prelude::*,
};
use uuid::Uuid;

use crate::{EngineError, Movement, ResultEngine, movements, users};

fn ordered() -> SelectTwo<movements::Entity, users::Entity> {
    movements::Entity::find()
        .find_also_related(users::Entity)
        .order_by_desc(movements::Column::Date)
        .order_by_desc(movements::Column::Id)
}

fn into_movements(
    rows: Vec<(movements::Model, Option<users::Model>)>,
) -> ResultEngine<Vec<Movement>> {
    rows.into_iter().map(Movement::try_from).collect()
}

pub(super) async fn find_all<C: ConnectionTrait>(db: &C) -> ResultEngine<Vec<Movement>> {
    into_movements(ordered().all(db).await?)
}

pub(super) async fn find_page<C: ConnectionTrait>(
    db: &C,
    offset: u64,
    limit: u64,
) -> ResultEngine<Vec<Movement>> {
    into_movements(ordered().offset(offset).limit(limit).all(db).await?)
}

pub(super) async fn count<C: ConnectionTrait>(db: &C) -> ResultEngine<u64> {
    Ok(movements::Entity::find().count(db).await?)
}

pub(super) async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> ResultEngine<Option<Movement>> {
    movements::Entity::find_by_id(id.to_string())
        .find_also_related(users::Entity)
        .one(db)
        .await?
        .map(Movement::try_from)
        .transpose()
}

pub(super) async fn insert<C: ConnectionTrait>(
    db: &C,
    model: movements::ActiveModel,
) -> ResultEngine<Uuid> {
    let inserted = model.insert(db).await?;
    crate::util::parse_uuid(&inserted.id, "movement")
}

/// Writes the set fields of `model`. A row that vanished in the meantime is
/// reported as not found.
pub(super) async fn update<C: ConnectionTrait>(
    db: &C,
    model: movements::ActiveModel,
) -> ResultEngine<()> {
    match model.update(db).await {
        Ok(_) => Ok(()),
        Err(DbErr::RecordNotUpdated) => {
            Err(EngineError::KeyNotFound("movement not exists".to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

/// Returns `false` if no row was deleted.
pub(super) async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> ResultEngine<bool> {
    let result = movements::Entity::delete_by_id(id.to_string())
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

pub(super) async fn delete_owned_by<C: ConnectionTrait>(db: &C, user_id: &str) -> ResultEngine<u64> {
    let result = movements::Entity::delete_many()
        .filter(movements::Column::UserId.eq(user_id.to_string()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

pub(super) async fn delete_all<C: ConnectionTrait>(db: &C) -> ResultEngine<u64> {
    let result = movements::Entity::delete_many().exec(db).await?;
    Ok(result.rows_affected)
}
