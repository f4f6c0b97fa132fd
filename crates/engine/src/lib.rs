//! Core of the finance tracker: movements, users, the ownership rule that
//! guards mutations and the report aggregation.
//!
//! Everything goes through [`Engine`], which only holds a database
//! connection. The authorization rule ([`can_mutate`]) and the aggregation
//! functions ([`reports::balance`], [`reports::chart_data`]) are pure and can
//! be used without a database.

pub use access::can_mutate;
pub use error::EngineError;
pub use movements::{Movement, MovementKind, MovementNew, MovementPage, MovementPatch};
pub use ops::{Engine, EngineBuilder, Report};
pub use reports::{BalanceReport, ChartPoint};
pub use roles::{Identity, Role};
pub use users::{User, UserNew, UserPage, UserPatch};
pub use util::{MAX_CONCEPT_LEN, MAX_PAGE_SIZE};

mod access;
mod error;
pub mod movements;
mod ops;
pub mod reports;
mod roles;
pub mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
