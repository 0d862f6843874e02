//! Routing rules and the collaborators they run against.

pub mod asset_policy;
pub mod lookup;
#[cfg(test)]
pub mod memory;
pub mod object_store;
pub mod site_service;
