//! setup-slv: install the slv CLI on a GitHub Actions runner and export
//! vault secrets into the job environment.
//!
//! The binary wires the real collaborators into an [`Orchestrator`]; tests
//! drive the same orchestrator with fakes.

pub mod cli;
pub mod orchestrator;
pub mod tracing;

pub use cli::{ActionInputs, Cli};
pub use orchestrator::{Orchestrator, SetupOutcome};
