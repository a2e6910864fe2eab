pub mod browse;
pub mod detail;
pub mod wishlist;

use gutenshelf_api::{BookId, FetchError};

use crate::task::Task;
use crate::view::{Patch, Render};

/// A view controller: consumes messages, produces actions, renders itself.
pub trait Screen {
    type Message: Send + 'static;

    fn update(&mut self, message: Self::Message) -> Action<Self::Message>;

    /// Render the whole screen from current state.
    fn view(&self) -> Vec<Render>;
}

/// What a screen asks its driver to do after handling a message.
///
/// Screens never paint or await directly; the driver interprets these in
/// one place.
pub enum Action<M> {
    /// No side-effect.
    None,
    /// State changed; call `view()` and repaint.
    Redraw,
    /// Update individual elements without a full repaint.
    Patch(Vec<Patch>),
    /// Run async work that eventually produces more messages.
    Run(Task<M>),
    Batch(Vec<Action<M>>),
}

/// An [`Action`] flattened into its parts.
pub struct Effects<M> {
    pub redraw: bool,
    pub patches: Vec<Patch>,
    pub task: Task<M>,
}

impl<M: Send + 'static> Action<M> {
    /// Repaint now, then run `task`.
    pub fn load(task: Task<M>) -> Self {
        Self::Batch(vec![Self::Redraw, Self::Run(task)])
    }

    pub fn flatten(self) -> Effects<M> {
        let mut effects = Effects {
            redraw: false,
            patches: Vec::new(),
            task: Task::none(),
        };
        self.flatten_into(&mut effects);
        effects
    }

    fn flatten_into(self, effects: &mut Effects<M>) {
        match self {
            Self::None => {}
            Self::Redraw => effects.redraw = true,
            Self::Patch(patches) => effects.patches.extend(patches),
            Self::Run(task) => {
                let current = std::mem::replace(&mut effects.task, Task::none());
                effects.task = Task::batch([current, task]);
            }
            Self::Batch(actions) => {
                for action in actions {
                    action.flatten_into(effects);
                }
            }
        }
    }
}

impl<M> std::fmt::Debug for Action<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Redraw => write!(f, "Redraw"),
            Self::Patch(p) => f.debug_tuple("Patch").field(p).finish(),
            Self::Run(t) => f.debug_tuple("Run").field(t).finish(),
            Self::Batch(a) => f.debug_tuple("Batch").field(a).finish(),
        }
    }
}

/// Tag carried by an outgoing request and echoed by its completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Issues monotonically increasing tickets; only the latest is current.
///
/// In-flight requests are never cancelled. Their completions are compared
/// against the latest ticket and dropped when superseded.
#[derive(Debug, Default)]
pub struct RequestSeq {
    latest: u64,
}

impl RequestSeq {
    pub fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}

/// Request lifecycle shared by every screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(LoadError),
}

/// Why a screen failed to load. Shown to the user as a single banner.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to fetch wishlist book {id}: {source}")]
    PartialFanoutFailure { id: BookId, source: FetchError },
}
