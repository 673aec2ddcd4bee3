//! Generation engine
//!
//! The retry loop in [`generator`] drives the credential pool, submission
//! builder, response classifier, task poller and result assembler.

pub mod assembler;
pub mod classify;
pub mod generator;
pub mod poller;
pub mod submission;

pub use assembler::ResultAssembler;
pub use classify::{Classification, Fatal, Rejection};
pub use generator::VideoGenerator;
pub use poller::{PollResult, TaskPoller};
