use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{
    EngineError, Identity, Movement, MovementNew, MovementPage, MovementPatch, ResultEngine,
    util::page_offset,
};

use super::{Engine, store, with_tx};

impl Engine {
    /// Lists every movement, most recent first.
    ///
    /// Reads are not scoped by owner.
    pub async fn list_movements(&self) -> ResultEngine<Vec<Movement>> {
        store::find_all(&self.database).await
    }

    /// Lists one page of movements, most recent first.
    ///
    /// `page` starts at 1 and `page_size` must be in `1..=100`. `total` is the
    /// size of the whole collection; it is read in the same transaction as the
    /// page so both agree. Pages past the end are empty.
    pub async fn list_movements_page(&self, page: u64, page_size: u64) -> ResultEngine<MovementPage> {
        let offset = page_offset(page, page_size)?;
        with_tx!(self, |db_tx| {
            let total = store::count(&db_tx).await?;
            let items = match offset {
                Some(offset) => store::find_page(&db_tx, offset, page_size).await?,
                None => Vec::new(),
            };
            Ok(MovementPage { items, total })
        })
    }

    pub async fn movement(&self, id: Uuid) -> ResultEngine<Movement> {
        store::find_by_id(&self.database, id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("movement not exists".to_string()))
    }

    /// Records a new movement owned by `identity`.
    ///
    /// Who may create movements at all is decided by the caller.
    pub async fn create_movement(
        &self,
        movement: MovementNew,
        identity: &Identity,
    ) -> ResultEngine<Movement> {
        let model = movement.into_active_model(&identity.user_id)?;
        with_tx!(self, |db_tx| {
            let id = store::insert(&db_tx, model).await?;
            self.require_movement(&db_tx, id).await
        })
    }

    /// Applies `patch` to movement `id`.
    ///
    /// Fails with `KeyNotFound` if the movement does not exist and with
    /// `Forbidden` if `identity` is neither the owner nor an administrator.
    pub async fn update_movement(
        &self,
        id: Uuid,
        patch: MovementPatch,
        identity: &Identity,
    ) -> ResultEngine<Movement> {
        with_tx!(self, |db_tx| {
            let current = self.require_movement_write(&db_tx, id, identity).await?;
            if patch.is_empty() {
                Ok(current)
            } else {
                store::update(&db_tx, patch.into_active_model(id)?).await?;
                self.require_movement(&db_tx, id).await
            }
        })
    }

    /// Removes movement `id` for good.
    ///
    /// Same outcomes as [`Engine::update_movement`].
    pub async fn delete_movement(&self, id: Uuid, identity: &Identity) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_movement_write(&db_tx, id, identity).await?;
            if !store::delete(&db_tx, id).await? {
                return Err(EngineError::KeyNotFound("movement not exists".to_string()));
            }
            Ok(())
        })
    }

    /// Replaces every stored movement with `movements`, each owned by the
    /// paired identity, in one transaction. Returns how many rows were
    /// removed.
    ///
    /// Nothing changes if any new movement is invalid.
    pub async fn replace_movements(
        &self,
        movements: Vec<(MovementNew, Identity)>,
    ) -> ResultEngine<u64> {
        let models = movements
            .into_iter()
            .map(|(movement, identity)| movement.into_active_model(&identity.user_id))
            .collect::<ResultEngine<Vec<_>>>()?;
        with_tx!(self, |db_tx| {
            let removed = store::delete_all(&db_tx).await?;
            for model in models {
                store::insert(&db_tx, model).await?;
            }
            Ok(removed)
        })
    }
}
