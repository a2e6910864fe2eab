//! Runs a [`Screen`] against the tokio runtime.
//!
//! The driver is the only place that spawns screen work. Completions come
//! back as messages in the order they finish, which is exactly the
//! interleaving the staleness guard in each screen is built for.

use tokio::task::JoinSet;

use crate::screen::Screen;
use crate::view::{Patch, Render};

/// What a painter should draw after a message was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Replace everything with this render.
    Full(Vec<Render>),
    /// Apply these updates to what is already on screen.
    Patch(Vec<Patch>),
}

pub struct Driver<S: Screen> {
    screen: S,
    running: JoinSet<S::Message>,
}

impl<S: Screen> Driver<S> {
    pub fn new(screen: S) -> Self {
        Self {
            screen,
            running: JoinSet::new(),
        }
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn into_screen(self) -> S {
        self.screen
    }

    /// No spawned work is outstanding.
    pub fn is_idle(&self) -> bool {
        self.running.is_empty()
    }

    /// Handle `message`, spawn whatever work it asks for, and return what
    /// needs painting. Must be called inside a tokio runtime.
    pub fn dispatch(&mut self, message: S::Message) -> Vec<Frame> {
        let effects = self.screen.update(message).flatten();
        for future in effects.task.into_futures() {
            self.running.spawn(future);
        }

        if effects.redraw {
            vec![Frame::Full(self.screen.view())]
        } else if !effects.patches.is_empty() {
            vec![Frame::Patch(effects.patches)]
        } else {
            Vec::new()
        }
    }

    /// Wait for the next finished task. `None` once nothing is running.
    ///
    /// Cancel-safe, so it can sit in a `tokio::select!` next to user input.
    pub async fn next_message(&mut self) -> Option<S::Message> {
        loop {
            match self.running.join_next().await? {
                Ok(message) => return Some(message),
                Err(e) => tracing::error!("screen task failed: {e}"),
            }
        }
    }

    /// Feed completions back until no work is left.
    pub async fn settle(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Some(message) = self.next_message().await {
            frames.extend(self.dispatch(message));
        }
        frames
    }
}
