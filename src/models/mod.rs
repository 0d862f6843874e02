//! Data shapes exchanged with the two external collaborators.
//!
//! `TenantPrefix` mirrors a row of the lookup table; `StoredObject` is what
//! an object store hands back for a key.

pub mod object;
pub mod tenant;
