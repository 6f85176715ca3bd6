//! Display formatting functions and result types.
//!
//! Domain models implement [`std::fmt::Display`] directly; collections and
//! operation results get newtype wrappers or their own implementations, so
//! the CLI and the MCP server print exactly the same markdown.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Wrappers &      │    │   Formatted     │
//! │ (Plan, Task)    │───▶│ Result Types    │───▶│    Output       │
//! │                 │    │                 │    │  (Terminal/MCP) │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`collections`]: Collection wrapper types (PlanSummaries, Components)
//! - [`results`]: Tool results (plan creation, step reports, checkpoints,
//!   rollbacks, resumption)
//! - [`status`]: Status and confirmation messages (OperationStatus)
//! - [`models`]: Display implementations for domain models, with times in
//!   the system timezone
//!
//! ## Usage Examples
//!
//! ```rust
//! use trellis_core::display::OperationStatus;
//!
//! let success = OperationStatus::success("Architecture saved".to_string());
//! assert_eq!(format!("{success}"), "Success: Architecture saved\n");
//! ```

pub mod collections;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{Components, PlanSummaries};
pub use results::UpdateResult;
pub use status::OperationStatus;
