//! Decides whether a resource is exempt from reclamation.
mod filter;
pub use filter::{Protection, ProtectionFilter};

mod hash;
pub use hash::name_hash;
