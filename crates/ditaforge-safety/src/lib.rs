//! # ditaforge-safety
//!
//! The authorization discipline for filesystem mutation.
//!
//! Two collaborators split the decision:
//! - [`Sandbox`] decides *where* a write may land (root containment)
//! - [`MutationPolicy`] decides *whether* an existing path may be
//!   overwritten
//!
//! Every write performed by the execution layer must pass through both.
//! There is no additional locking: concurrent runs against the same
//! sandbox root are a hard precondition violation, not an enforced
//! invariant.

pub mod error;
pub mod policy;
pub mod sandbox;

pub use error::{PolicyViolation, SandboxViolation};
pub use policy::MutationPolicy;
pub use sandbox::Sandbox;
