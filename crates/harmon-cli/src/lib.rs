//! Library components of the wave harmonizer CLI.

pub mod logging;
pub mod pipeline;
