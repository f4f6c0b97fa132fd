//! Movement primitives.
//!
//! A `Movement` is a single dated income or expense owned by exactly one
//! user.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{normalize_concept, parse_uuid, validate_amount},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementKind {
    Income,
    Expense,
}

impl MovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }
}

impl TryFrom<&str> for MovementKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "INCOME" => Ok(Self::Income),
            "EXPENSE" => Ok(Self::Expense),
            other => Err(EngineError::InvalidKind(format!(
                "unknown movement kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: Uuid,
    pub concept: String,
    pub amount_minor: i64,
    pub kind: MovementKind,
    pub date: DateTime<Utc>,
    pub user_id: String,
    /// Display name of the owner, joined from `users` on reads.
    pub user_name: Option<String>,
}

/// Input for a new movement.
///
/// There is no owner field: the engine always stamps the requester.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovementNew {
    pub concept: String,
    pub amount_minor: i64,
    pub kind: MovementKind,
    pub date: DateTime<Utc>,
}

/// Partial update of a movement. `None` leaves the field untouched.
///
/// The owner is not patchable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MovementPatch {
    pub concept: Option<String>,
    pub amount_minor: Option<i64>,
    pub kind: Option<MovementKind>,
    pub date: Option<DateTime<Utc>>,
}

impl MovementPatch {
    pub fn is_empty(&self) -> bool {
        self.concept.is_none()
            && self.amount_minor.is_none()
            && self.kind.is_none()
            && self.date.is_none()
    }
}

/// A page of movements plus the total count of the whole collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovementPage {
    pub items: Vec<Movement>,
    pub total: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub concept: String,
    pub amount_minor: i64,
    pub kind: String,
    pub date: DateTimeUtc,
    pub user_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl MovementNew {
    /// Validates the input and builds the row owned by `user_id`.
    pub(crate) fn into_active_model(self, user_id: &str) -> ResultEngine<ActiveModel> {
        let concept = normalize_concept(&self.concept)?;
        validate_amount(self.amount_minor)?;
        Ok(ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            concept: ActiveValue::Set(concept),
            amount_minor: ActiveValue::Set(self.amount_minor),
            kind: ActiveValue::Set(self.kind.as_str().to_string()),
            date: ActiveValue::Set(self.date),
            user_id: ActiveValue::Set(user_id.to_string()),
        })
    }
}

impl MovementPatch {
    /// Validates the supplied fields and turns them into an update for `id`.
    ///
    /// Fields left as `None` stay `NotSet` and are not written.
    pub(crate) fn into_active_model(self, id: Uuid) -> ResultEngine<ActiveModel> {
        let mut model = ActiveModel {
            id: ActiveValue::Unchanged(id.to_string()),
            ..Default::default()
        };
        if let Some(concept) = self.concept {
            model.concept = ActiveValue::Set(normalize_concept(&concept)?);
        }
        if let Some(amount_minor) = self.amount_minor {
            validate_amount(amount_minor)?;
            model.amount_minor = ActiveValue::Set(amount_minor);
        }
        if let Some(kind) = self.kind {
            model.kind = ActiveValue::Set(kind.as_str().to_string());
        }
        if let Some(date) = self.date {
            model.date = ActiveValue::Set(date);
        }
        Ok(model)
    }
}

impl TryFrom<(Model, Option<super::users::Model>)> for Movement {
    type Error = EngineError;

    fn try_from((model, owner): (Model, Option<super::users::Model>)) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "movement")?,
            concept: model.concept,
            amount_minor: model.amount_minor,
            kind: MovementKind::try_from(model.kind.as_str())?,
            date: model.date,
            user_id: model.user_id,
            user_name: owner.and_then(|user| user.name),
        })
    }
}
