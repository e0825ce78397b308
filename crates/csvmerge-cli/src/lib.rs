//! Library components of the `csvmerge` command.

pub mod dedupe;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod types;
