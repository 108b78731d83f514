pub mod asset;
pub mod delegation;
pub mod identity;

pub use asset::{AssetKind, AssetRecord};
pub use delegation::{DelegationGrant, GrantStatus};
pub use identity::{Identity, IdentityResponse, Role};
