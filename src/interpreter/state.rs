use crate::error::RunError;
use crate::value::NodeId;
use crate::variables::Variables;

/// Where a run currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum State {
    Running(NodeId),
    AwaitingInput { at: NodeId, pending: PendingInput },
    Terminated(Termination),
}

/// What a suspended run will do with the reply it is waiting for.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingInput {
    /// Store the raw reply under this variable.
    Capture { variable: String },
    /// Pick one of the block's options.
    Choice { options: usize },
    /// Pick one of several outgoing links.
    Advance { targets: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Termination {
    Completed(Completion),
    Failed(RunError),
}

/// Ways a run can end normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The last block visited had no outgoing links.
    NoFurtherLinks,
    /// An end block was reached.
    EndBlock,
}

impl Termination {
    pub fn is_completed(&self) -> bool {
        matches!(self, Termination::Completed(_))
    }

    pub fn error(&self) -> Option<&RunError> {
        match self {
            Termination::Failed(error) => Some(error),
            Termination::Completed(_) => None,
        }
    }
}

/// Everything observable about a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Blocks in the order they were executed.
    pub visited: Vec<NodeId>,
    pub termination: Termination,
    pub variables: Variables,
}
