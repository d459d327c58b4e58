//! Environment: owns agents and the connectivity graph, runs everything.
//!
//! # Lifecycle
//!
//! ```text
//! new ──add/connect──▶ (building) ──start──▶ (running) ──all tasks done──▶ Outcomes
//! ```
//!
//! `start` consumes the environment, so the topology cannot change once
//! agents run. Every agent is spawned as its own tokio task; the only
//! ordering between agents is what their `send`/`receive` dependencies
//! impose.
//!
//! # Failure
//!
//! A failing task is never cancelled from outside and never cancels others.
//! Its mailbox drops with it, so peers waiting on it see `Disconnected` and
//! wind down on their own. `start` returns once every task has finished and
//! reports the first root-cause failure; `Disconnected` failures are only
//! reported if nothing else went wrong.
//!
//! A cycle of live agents each waiting on another never finishes. Such a
//! deadlock stays confined to the agents involved: no other channel is
//! affected.

use std::collections::{BTreeMap, HashMap};

use tokio::task::JoinSet;
use tracing::Instrument;

use crate::{
    agent::Agent,
    channel::{Channel, Interceptor, LinkSettings},
    error::EnvironmentError,
    graph::ConnectivityGraph,
    mailbox::Mailbox,
};

/// Registry of agents and links.
pub struct Environment<T = ()> {
    agents: BTreeMap<String, Agent<T>>,
    graph: ConnectivityGraph,
}

impl<T> Default for Environment<T> {
    fn default() -> Self {
        Self { agents: BTreeMap::new(), graph: ConnectivityGraph::default() }
    }
}

impl<T: Send + 'static> Environment<T> {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent.
    ///
    /// # Errors
    ///
    /// - `DuplicateAgent`: an agent with the same name was already added
    pub fn add(&mut self, agent: Agent<T>) -> Result<(), EnvironmentError> {
        if self.agents.contains_key(agent.name()) {
            return Err(EnvironmentError::DuplicateAgent(agent.name().to_owned()));
        }

        tracing::debug!(agent = agent.name(), "agent added");
        self.agents.insert(agent.name().to_owned(), agent);
        Ok(())
    }

    /// Declare an unlimited link between `a` and `b`. Repeating a declared
    /// pair is a no-op.
    pub fn connect(&mut self, a: &str, b: &str) -> Result<(), EnvironmentError> {
        self.connect_with(a, b, LinkSettings::unlimited())
    }

    /// Declare a link between `a` and `b` with explicit settings. Repeating a
    /// declared pair keeps the original settings.
    pub fn connect_with(
        &mut self,
        a: &str,
        b: &str,
        settings: LinkSettings,
    ) -> Result<(), EnvironmentError> {
        self.graph.connect(a, b, settings).map(|_| ())
    }

    /// Rewrite every message sent from `from` to `to` before it is enqueued.
    ///
    /// # Errors
    ///
    /// - `NotConnected`: `{from, to}` has not been declared
    pub fn intercept<F>(&mut self, from: &str, to: &str, interceptor: F) -> Result<(), EnvironmentError>
    where
        F: Fn(bytes::Bytes) -> bytes::Bytes + Send + Sync + 'static,
    {
        let interceptor: Interceptor = std::sync::Arc::new(interceptor);
        self.graph.intercept(from, to, interceptor)
    }

    /// Returns true if `{a, b}` has been declared.
    pub fn is_connected(&self, a: &str, b: &str) -> bool {
        self.graph.is_connected(a, b)
    }

    /// Names of registered agents, in lexicographic order.
    pub fn agent_names(&self) -> impl Iterator<Item = &str> {
        self.agents.keys().map(String::as_str)
    }

    /// Run every agent concurrently and wait for all of them.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// - `UnknownAgent`: a link names an agent that was never added
    /// - `AgentFailed`/`AgentPanicked`: the first root-cause failure among
    ///   the agents, surfaced after every task has finished
    pub async fn start(self) -> Result<Outcomes<T>, EnvironmentError> {
        let Self { agents, graph } = self;
        graph.validate(|name| agents.contains_key(name))?;

        let mut mailboxes: HashMap<String, Mailbox> =
            agents.keys().map(|name| (name.clone(), Mailbox::new(name.clone()))).collect();

        for (key, link) in graph.into_links() {
            let (a, b) = key.endpoints();
            let (at_a, at_b) = Channel::open(
                a,
                b,
                link.settings,
                link.interceptor_from(a),
                link.interceptor_from(b),
            );
            for (owner, endpoint) in [(a, at_a), (b, at_b)] {
                if let Some(mailbox) = mailboxes.get_mut(owner) {
                    mailbox.attach(endpoint);
                }
            }
        }

        tracing::info!(agents = agents.len(), "environment starting");

        let mut tasks = JoinSet::new();
        let mut task_names = HashMap::new();

        for (name, agent) in agents {
            let (_, task) = agent.into_parts();
            let mailbox = mailboxes.remove(&name).unwrap_or_else(|| Mailbox::new(name.clone()));
            let span = tracing::info_span!("agent", name = %name);

            let task_name = name.clone();
            let handle = tasks.spawn(
                async move {
                    let result = task(mailbox).await;
                    (task_name, result)
                }
                .instrument(span),
            );
            task_names.insert(handle.id(), name);
        }

        let mut outcomes = BTreeMap::new();
        let mut failure: Option<EnvironmentError> = None;

        while let Some(joined) = tasks.join_next().await {
            let error = match joined {
                Ok((agent, Ok(value))) => {
                    tracing::debug!(%agent, "agent finished");
                    outcomes.insert(agent, value);
                    continue;
                },
                Ok((agent, Err(source))) => {
                    tracing::warn!(%agent, error = %source, "agent failed");
                    EnvironmentError::AgentFailed { agent, source }
                },
                Err(join_error) => {
                    let agent = task_names.get(&join_error.id()).cloned().unwrap_or_default();
                    tracing::error!(%agent, "agent panicked");
                    EnvironmentError::AgentPanicked { agent }
                },
            };

            let replace = match &failure {
                None => true,
                Some(current) => !current.is_root_cause() && error.is_root_cause(),
            };
            if replace {
                failure = Some(error);
            }
        }

        match failure {
            Some(error) => Err(error),
            None => {
                tracing::info!(agents = outcomes.len(), "environment finished");
                Ok(Outcomes { values: outcomes })
            },
        }
    }
}

/// Values reported by every agent of a successful run, keyed by agent name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcomes<T> {
    values: BTreeMap<String, T>,
}

impl<T> Outcomes<T> {
    /// Value reported by `agent`.
    pub fn get(&self, agent: &str) -> Option<&T> {
        self.values.get(agent)
    }

    /// Remove and return the value reported by `agent`.
    pub fn take(&mut self, agent: &str) -> Option<T> {
        self.values.remove(agent)
    }

    /// Number of agents that reported.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no agent reported (empty environment).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(agent, value)` pairs in agent-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Consume into the underlying map.
    pub fn into_inner(self) -> BTreeMap<String, T> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AgentError, ChannelError};

    #[test]
    fn duplicate_agent_is_rejected() {
        let mut env = Environment::<()>::new();
        env.add(Agent::new("alice", |_| async { Ok(()) })).unwrap();

        assert_eq!(
            env.add(Agent::new("alice", |_| async { Ok(()) })),
            Err(EnvironmentError::DuplicateAgent("alice".into()))
        );
        assert_eq!(env.agent_names().collect::<Vec<_>>(), vec!["alice"]);
    }

    #[tokio::test]
    async fn empty_environment_finishes_immediately() {
        let outcomes = Environment::<()>::new().start().await.unwrap();
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn link_to_unknown_agent_fails_before_running() {
        let mut env = Environment::<()>::new();
        env.add(Agent::new("alice", |_| async { Err(AgentError::Protocol("ran".into())) }))
            .unwrap();
        env.connect("alice", "bob").unwrap();

        assert_eq!(
            env.start().await.unwrap_err(),
            EnvironmentError::UnknownAgent { agent: "bob".into(), a: "alice".into(), b: "bob".into() }
        );
    }

    #[tokio::test]
    async fn outcomes_are_keyed_by_agent() {
        let mut env = Environment::new();
        env.add(Agent::new("alice", |mailbox| async move { Ok(mailbox.name().len()) })).unwrap();
        env.add(Agent::new("public-space", |mailbox| async move { Ok(mailbox.name().len()) }))
            .unwrap();

        let mut outcomes = env.start().await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes.get("alice"), Some(&5));
        assert_eq!(outcomes.take("public-space"), Some(12));
        assert_eq!(outcomes.iter().collect::<Vec<_>>(), vec![("alice", &5)]);
    }

    #[tokio::test]
    async fn root_cause_beats_consequent_disconnect() {
        let mut env = Environment::<()>::new();
        env.add(Agent::new("alice", |_| async {
            Err(AgentError::Protocol("refusing to talk".into()))
        }))
        .unwrap();
        env.add(Agent::new("bob", |mut mailbox| async move {
            mailbox.receive("alice").await?;
            Ok(())
        }))
        .unwrap();
        env.connect("alice", "bob").unwrap();

        assert_eq!(
            env.start().await.unwrap_err(),
            EnvironmentError::AgentFailed {
                agent: "alice".into(),
                source: AgentError::Protocol("refusing to talk".into()),
            }
        );
    }

    #[tokio::test]
    async fn lone_disconnect_is_still_reported() {
        let mut env = Environment::<()>::new();
        env.add(Agent::new("alice", |_| async { Ok(()) })).unwrap();
        env.add(Agent::new("bob", |mut mailbox| async move {
            mailbox.receive("alice").await?;
            Ok(())
        }))
        .unwrap();
        env.connect("alice", "bob").unwrap();

        assert_eq!(
            env.start().await.unwrap_err(),
            EnvironmentError::AgentFailed {
                agent: "bob".into(),
                source: ChannelError::Disconnected { agent: "bob".into(), peer: "alice".into() }
                    .into(),
            }
        );
    }
}
