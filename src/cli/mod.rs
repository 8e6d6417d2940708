//! Terminal front end

pub mod play;
pub mod view_state;

pub use play::{PlayOptions, run_play};
