//! Wire types and the fixed category vocabulary shared by the EcoSort client apps.

pub mod domain;
pub mod error;
pub mod protocol;
