use sea_orm::DatabaseTransaction;
use uuid::Uuid;

use crate::{EngineError, Identity, Movement, ResultEngine, access::can_mutate};

use super::{Engine, store};

impl Engine {
    /// Load the stored movement `id`, failing with `KeyNotFound` if it is
    /// missing.
    pub(super) async fn require_movement(
        &self,
        db: &DatabaseTransaction,
        id: Uuid,
    ) -> ResultEngine<Movement> {
        store::find_by_id(db, id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("movement not exists".to_string()))
    }

    /// Load the stored movement `id` and check that `identity` may change it.
    ///
    /// Existence is checked first, so a missing row is always `KeyNotFound`
    /// and never `Forbidden`.
    pub(super) async fn require_movement_write(
        &self,
        db: &DatabaseTransaction,
        id: Uuid,
        identity: &Identity,
    ) -> ResultEngine<Movement> {
        let movement = self.require_movement(db, id).await?;
        if !can_mutate(&movement, identity) {
            return Err(EngineError::Forbidden(
                "only the owner or an administrator can modify this movement".to_string(),
            ));
        }
        Ok(movement)
    }
}
