//! Represents a tenant → storage prefix mapping.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the `tenant_prefixes` table.
///
/// The table is owned by an external administrative process; this service
/// only ever reads it.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq, Eq)]
pub struct TenantPrefix {
    /// First label of the host name (e.g. `acme` for `acme.example.com`).
    pub tenant: String,

    /// Storage key namespace for the tenant (e.g. `sites/acme`).
    pub prefix: String,
}
