use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, Identity, ResultEngine, User, UserNew, UserPage, UserPatch, users,
    util::{normalize_optional_text, page_offset},
};

use super::{Engine, store, with_tx};

fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = value.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(EngineError::InvalidEmail(value.to_string()));
    }
    Ok(email)
}

fn not_found() -> EngineError {
    EngineError::KeyNotFound("user not exists".to_string())
}

impl Engine {
    async fn require_user(&self, db: &DatabaseTransaction, id: Uuid) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(id.to_string())
            .one(db)
            .await?
            .ok_or_else(not_found)
    }

    /// Checks `email` / `password` against the stored bcrypt hash.
    ///
    /// Unknown email and wrong password give the same error. Hashing runs on
    /// the blocking pool.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<Identity> {
        let invalid = || EngineError::Unauthorized("invalid credentials".to_string());
        let email = normalize_email(email).map_err(|_| invalid())?;
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .ok_or_else(invalid)?;
        let password = password.to_string();
        let hash = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
        if !verified {
            return Err(invalid());
        }
        Ok(user.identity())
    }

    pub async fn create_user(&self, user: UserNew) -> ResultEngine<User> {
        let email = normalize_email(&user.email)?;
        if user.password.is_empty() {
            return Err(EngineError::InvalidPassword(
                "password must not be empty".to_string(),
            ));
        }
        let cost = self.password_cost;
        let password = user.password.clone();
        let password_hash =
            tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;

        with_tx!(self, |db_tx| {
            let exists = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(email));
            }

            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                name: ActiveValue::Set(normalize_optional_text(user.name.as_deref())),
                email: ActiveValue::Set(email),
                role: ActiveValue::Set(Some(user.role.as_str().to_string())),
                phone: ActiveValue::Set(normalize_optional_text(user.phone.as_deref())),
                password_hash: ActiveValue::Set(password_hash),
                created_at: ActiveValue::Set(Utc::now()),
            };
            User::try_from(model.insert(&db_tx).await?)
        })
    }

    /// Lists users, newest first.
    pub async fn list_users(&self) -> ResultEngine<Vec<User>> {
        users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .order_by_desc(users::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    pub async fn list_users_page(&self, page: u64, page_size: u64) -> ResultEngine<UserPage> {
        let offset = page_offset(page, page_size)?;
        with_tx!(self, |db_tx| {
            let total = users::Entity::find().count(&db_tx).await?;
            let Some(offset) = offset else {
                return Ok(UserPage {
                    items: Vec::new(),
                    total,
                });
            };
            let items = users::Entity::find()
                .order_by_desc(users::Column::CreatedAt)
                .order_by_desc(users::Column::Id)
                .offset(offset)
                .limit(page_size)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(User::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            Ok(UserPage { items, total })
        })
    }

    pub async fn user(&self, id: Uuid) -> ResultEngine<User> {
        users::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(not_found)
            .and_then(User::try_from)
    }

    pub async fn user_by_email(&self, email: &str) -> ResultEngine<User> {
        let email = normalize_email(email).map_err(|_| not_found())?;
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .ok_or_else(not_found)
            .and_then(User::try_from)
    }

    /// Applies `patch` to user `id`. A blank phone clears the field; a blank
    /// name is rejected.
    pub async fn update_user(&self, id: Uuid, patch: UserPatch) -> ResultEngine<User> {
        if patch.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(EngineError::InvalidName(
                "name must not be blank".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let current = self.require_user(&db_tx, id).await?;
            let mut model: users::ActiveModel = current.into();
            if let Some(name) = patch.name {
                model.name = ActiveValue::Set(normalize_optional_text(Some(&name)));
            }
            if let Some(role) = patch.role {
                model.role = ActiveValue::Set(Some(role.as_str().to_string()));
            }
            if let Some(phone) = patch.phone {
                model.phone = ActiveValue::Set(normalize_optional_text(Some(&phone)));
            }
            let updated = if model.is_changed() {
                model.update(&db_tx).await?
            } else {
                self.require_user(&db_tx, id).await?
            };
            User::try_from(updated)
        })
    }

    /// Deletes user `id` together with the movements it owns.
    pub async fn delete_user(&self, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, id).await?;
            store::delete_owned_by(&db_tx, &id.to_string()).await?;
            let result = users::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(not_found());
            }
            Ok(())
        })
    }
}
