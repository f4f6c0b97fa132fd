//! Authorization rule for movements.
//!
//! Reads are open to any authenticated identity. Mutations (update, delete)
//! are allowed to the owner of the movement and to administrators.

use crate::{Identity, Movement};

/// Returns `true` if `identity` may update or delete `movement`.
pub fn can_mutate(movement: &Movement, identity: &Identity) -> bool {
    identity.role.is_admin() || movement.user_id == identity.user_id
}
