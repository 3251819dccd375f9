//! Infrastructure layer: session persistence, remediation orchestration and
//! client-side request/mutation coordination.

pub mod optimistic;
pub mod remediation;
pub mod requests;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use optimistic::{Mutation, MutationError, MutationId, OptimisticTable};
pub use remediation::{RemediationError, remediate_out_of_stock};
pub use requests::{LoadState, LoadTicket, RequestCoordinator};
pub use store::{InMemorySessionStore, JsonDirSessionStore, SessionStore, StoreError};
