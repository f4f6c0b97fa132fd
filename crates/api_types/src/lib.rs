use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Role of a user as seen by API clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

/// Query string of list endpoints.
///
/// Values are kept as raw strings and parsed leniently by the server:
/// without `page` the whole collection is returned.
#[derive(Debug, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number starting at 1. Omit it to get every item.
    pub page: Option<String>,
    /// Items per page, clamped to `1..=100`. Defaults to 10.
    pub page_size: Option<String>,
}

/// A page of items plus the information needed to fetch the others.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

/// Response of list endpoints: a bare array when no page was requested, the
/// [`Page`] envelope otherwise.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Listing<T> {
    Page(Page<T>),
    All(Vec<T>),
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub mod movement {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum MovementKind {
        Income,
        Expense,
    }

    /// Request body for a new movement.
    ///
    /// The owner is always the authenticated caller; any owner field sent by
    /// the client is ignored.
    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct MovementNew {
        pub concept: String,
        /// Amount in minor units (cents), must be > 0.
        pub amount_minor: i64,
        pub kind: MovementKind,
        pub date: DateTime<FixedOffset>,
    }

    /// Request body for a partial update. Missing fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
    pub struct MovementUpdate {
        pub concept: Option<String>,
        pub amount_minor: Option<i64>,
        pub kind: Option<MovementKind>,
        pub date: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct MovementView {
        pub id: Uuid,
        pub concept: String,
        pub amount_minor: i64,
        pub kind: MovementKind,
        pub date: DateTime<Utc>,
        pub user_id: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        pub user_name: Option<String>,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct UserView {
        pub id: Uuid,
        pub name: Option<String>,
        pub email: String,
        pub role: Role,
        pub phone: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    /// Request body for updating a user. Missing fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
    pub struct UserUpdate {
        pub name: Option<String>,
        pub role: Option<Role>,
        pub phone: Option<String>,
    }
}

pub mod report {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct Balance {
        pub income_minor: i128,
        pub expense_minor: i128,
        pub balance_minor: i128,
    }

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct ChartPoint {
        /// `YYYY-MM`
        pub month: String,
        pub income_minor: i128,
        pub expense_minor: i128,
    }

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct Report {
        pub balance: Balance,
        pub chart_data: Vec<ChartPoint>,
    }
}
