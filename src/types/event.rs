//! External events that can be sent to the runtime

use serde::{Deserialize, Serialize};

/// Player or host input that resumes a suspended session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    /// Player picked the choice that jumps to `label`
    Choice { label: String },
    /// Player continued past a dialogue line
    Continue,
    /// Host requested shutdown
    Stop,
}
