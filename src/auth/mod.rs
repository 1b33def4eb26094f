//! Caller identity and tenant membership enforcement.
//!
//! Authentication happens at the HTTP layer: the bearer ID token is resolved
//! through the identity service into an [`IdentityContext`], which is then
//! handed explicitly to every workflow. Workflows that target a tenant call
//! [`TenantMembershipGuard::authorize`] before issuing any external request.

mod context;
mod extractor;
mod guard;

pub use context::{IdentityContext, TenantMembership};
pub use extractor::{AuthError, AuthExtractor};
pub use guard::{GuardDenial, TenantMembershipGuard};
