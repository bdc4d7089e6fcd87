//! # ditaforge-exec
//!
//! The execution layer: the only place with authority to mutate disk.
//!
//! A validated [`Plan`](ditaforge_core::Plan) flows through here as:
//! registry lookup → handler execution (under sandbox and policy) →
//! per-action results → one forensic
//! [`ExecutionReport`](ditaforge_core::ExecutionReport).
//!
//! Key pieces:
//! - [`HandlerRegistry`]: closed, explicit map from action type to
//!   [`ActionHandler`], injected into the executor (no global)
//! - [`ExecutionDispatcher`]: walks a plan strictly in order and halts
//!   on the first crash, still returning a valid report
//! - [`DryRunExecutor`] / [`FilesystemExecutor`]: interchangeable
//!   simulate-only vs. real-mutation strategies
//! - [`ReportWriter`]: byte-reproducible report serialization

pub mod dispatcher;
pub mod error;
pub mod executors;
pub mod handlers;
pub mod registry;
pub mod report_writer;

pub use dispatcher::{ActionExecutor, ExecutionDispatcher};
pub use error::{DispatchError, HandlerError, RegistryError, ReportWriteError};
pub use executors::{DryRunExecutor, FilesystemExecutor};
pub use handlers::default_registry;
pub use registry::{ActionHandler, HandlerContext, HandlerRegistry};
pub use report_writer::ReportWriter;
