/// Lifecycle events emitted by the command bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    CommandExecuting { id: String },
    CommandExecuted { id: String },
}

impl GridEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GridEvent::CommandExecuting { .. } => "command-executing",
            GridEvent::CommandExecuted { .. } => "command-executed",
        }
    }

    pub fn command_id(&self) -> &str {
        match self {
            GridEvent::CommandExecuting { id } | GridEvent::CommandExecuted { id } => id,
        }
    }
}
