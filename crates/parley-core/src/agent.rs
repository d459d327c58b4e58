//! Agents: named units of sequential protocol logic.

use std::{fmt, future::Future, pin::Pin};

use crate::{error::AgentError, mailbox::Mailbox};

type TaskFuture<T> = Pin<Box<dyn Future<Output = Result<T, AgentError>> + Send + 'static>>;
type Task<T> = Box<dyn FnOnce(Mailbox) -> TaskFuture<T> + Send + 'static>;

/// A named task body.
///
/// The body receives the agent's [`Mailbox`] and runs to completion. Key
/// material and other inputs are moved into the closure when the agent is
/// built; the mailbox is the only thing shared with other agents.
///
/// `T` is what the agent reports when it finishes successfully.
pub struct Agent<T> {
    name: String,
    task: Task<T>,
}

impl<T: Send + 'static> Agent<T> {
    /// Create an agent from a name and a task body.
    ///
    /// ```ignore
    /// let bob = Agent::new("bob", |mut mailbox| async move {
    ///     let ping = mailbox.receive("alice").await?;
    ///     mailbox.send("alice", ping)?;
    ///     Ok(())
    /// });
    /// ```
    pub fn new<F, Fut>(name: impl Into<String>, task: F) -> Self
    where
        F: FnOnce(Mailbox) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, AgentError>> + Send + 'static,
    {
        Self { name: name.into(), task: Box::new(move |mailbox| Box::pin(task(mailbox))) }
    }

    /// Agent name, unique within an environment.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn into_parts(self) -> (String, Task<T>) {
        (self.name, self.task)
    }
}

impl<T> fmt::Debug for Agent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent").field("name", &self.name).finish_non_exhaustive()
    }
}
