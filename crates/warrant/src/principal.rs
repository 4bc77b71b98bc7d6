//! Current-principal lookup.
//!
//! When a request names no actor, the Authorizer asks its
//! [`PrincipalProvider`] who is acting. Checks with no principal are denied;
//! mutations with no principal fail with `MissingActor`.

use warrant_core::ObjectRef;

/// Supplies the actor of the current request context.
pub trait PrincipalProvider: Send + Sync {
    /// The acting principal, if any.
    fn current(&self) -> Option<ObjectRef>;
}

/// Always the same principal. Handy for jobs and tests.
#[derive(Debug, Clone)]
pub struct StaticPrincipal(pub ObjectRef);

impl PrincipalProvider for StaticPrincipal {
    fn current(&self) -> Option<ObjectRef> {
        Some(self.0.clone())
    }
}

impl<F> PrincipalProvider for F
where
    F: Fn() -> Option<ObjectRef> + Send + Sync,
{
    fn current(&self) -> Option<ObjectRef> {
        self()
    }
}
