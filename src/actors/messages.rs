//! Message types for actor communication
//!
//! 1. **Commands**: sent to a specific actor via mpsc
//! 2. **Request/Response**: oneshot channels for synchronous queries

use tokio::sync::oneshot;

use crate::controller::MonitorState;

/// Commands that can be sent to a controller actor
#[derive(Debug)]
pub enum ControllerCommand {
    /// Text of an incoming mention, address token included
    Mention { text: String },

    /// Start periodic monitoring (no-op unless idle)
    StartMonitoring,

    /// Get the current lifecycle state
    GetState {
        respond_to: oneshot::Sender<MonitorState>,
    },

    /// Cancel any running timer and stop the actor
    Shutdown,
}
