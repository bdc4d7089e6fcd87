//! # ditaforge-material
//!
//! Materialization: the preflight/finalize gate around execution.
//!
//! Materialization answers "where should every planned output live, and
//! is it safe to put it there?" before a single byte is written. It
//! provides:
//! - deterministic layout mapping from artifact-relative paths to their
//!   canonical location under a target root
//! - collision detection across all resolved target paths of a plan
//! - a collision-free manifest model
//! - the two-phase [`MaterializationOrchestrator`]: `preflight()` must
//!   succeed before execution may start; `finalize()` records the
//!   outcome afterwards
//!
//! Nothing in this crate mutates file *content*. The only filesystem
//! effect is preparing the target root directory itself (and optional
//! manifest emission), both inside preflight.

pub mod builder;
pub mod collision;
pub mod error;
pub mod layout;
pub mod manifest;
pub mod orchestrator;
pub mod validation;

pub use builder::{TargetBuilder, TargetRootBuilder};
pub use collision::{detect_collisions, TargetArtifact};
pub use error::{CollisionError, LayoutError, MaterializationError};
pub use layout::{DitaLayoutPolicy, LayoutPolicy, TargetLayout};
pub use manifest::{MaterializationManifest, MaterializedFile};
pub use orchestrator::{JsonManifestWriter, ManifestWriter, MaterializationOrchestrator, NoOpManifestWriter};
pub use validation::{NoOpValidator, PlanValidator, PreflightValidator};
