//! Connectivity graph: which unordered pairs of agents may talk.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use crate::{
    channel::{Interceptor, LinkSettings},
    error::EnvironmentError,
};

/// Unordered pair of agent names, stored in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkKey {
    low: String,
    high: String,
}

impl LinkKey {
    /// Key for the pair `{a, b}`; argument order does not matter.
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self { low: a.to_owned(), high: b.to_owned() }
        } else {
            Self { low: b.to_owned(), high: a.to_owned() }
        }
    }

    /// Both endpoints, lexicographically ordered.
    pub fn endpoints(&self) -> (&str, &str) {
        (&self.low, &self.high)
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.low, self.high)
    }
}

/// A declared link and its per-direction interceptors.
pub(crate) struct Link {
    pub(crate) settings: LinkSettings,
    /// Keyed by sending agent
    interceptors: HashMap<String, Interceptor>,
}

impl Link {
    pub(crate) fn interceptor_from(&self, sender: &str) -> Option<Interceptor> {
        self.interceptors.get(sender).cloned()
    }
}

/// Declared links between agents. Fixed once the environment starts.
#[derive(Default)]
pub struct ConnectivityGraph {
    links: BTreeMap<LinkKey, Link>,
}

impl ConnectivityGraph {
    /// Declare a link. Returns `false` if the pair was already declared, in
    /// which case the existing settings are kept.
    pub fn connect(
        &mut self,
        a: &str,
        b: &str,
        settings: LinkSettings,
    ) -> Result<bool, EnvironmentError> {
        if a == b {
            return Err(EnvironmentError::SelfLink(a.to_owned()));
        }

        let key = LinkKey::new(a, b);
        if self.links.contains_key(&key) {
            tracing::debug!(link = %key, "link already declared");
            return Ok(false);
        }

        tracing::debug!(link = %key, ?settings, "link declared");
        self.links.insert(key, Link { settings, interceptors: HashMap::new() });
        Ok(true)
    }

    /// Install an interceptor on the directed leg `from -> to`, replacing any
    /// previous one.
    pub fn intercept(
        &mut self,
        from: &str,
        to: &str,
        interceptor: Interceptor,
    ) -> Result<(), EnvironmentError> {
        let link = self.links.get_mut(&LinkKey::new(from, to)).ok_or_else(|| {
            EnvironmentError::NotConnected { from: from.to_owned(), to: to.to_owned() }
        })?;

        link.interceptors.insert(from.to_owned(), interceptor);
        Ok(())
    }

    /// Returns true if `{a, b}` was declared.
    pub fn is_connected(&self, a: &str, b: &str) -> bool {
        self.links.contains_key(&LinkKey::new(a, b))
    }

    /// Number of declared links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns true if no link was declared.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Settings of a declared link.
    pub fn settings(&self, a: &str, b: &str) -> Option<LinkSettings> {
        self.links.get(&LinkKey::new(a, b)).map(|link| link.settings)
    }

    /// Check every link endpoint against the set of known agents.
    pub(crate) fn validate(&self, is_known: impl Fn(&str) -> bool) -> Result<(), EnvironmentError> {
        for key in self.links.keys() {
            let (a, b) = key.endpoints();
            for agent in [a, b] {
                if !is_known(agent) {
                    return Err(EnvironmentError::UnknownAgent {
                        agent: agent.to_owned(),
                        a: a.to_owned(),
                        b: b.to_owned(),
                    });
                }
            }
        }
        Ok(())
    }

    pub(crate) fn into_links(self) -> impl Iterator<Item = (LinkKey, Link)> {
        self.links.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;

    use super::*;

    #[test]
    fn link_key_is_unordered() {
        assert_eq!(LinkKey::new("alice", "bob"), LinkKey::new("bob", "alice"));
        assert_eq!(LinkKey::new("bob", "alice").endpoints(), ("alice", "bob"));
    }

    #[test]
    fn connect_is_idempotent() {
        let mut graph = ConnectivityGraph::default();

        assert!(graph.connect("alice", "bob", LinkSettings::limited(16)).unwrap());
        assert!(!graph.connect("bob", "alice", LinkSettings::unlimited()).unwrap());

        assert_eq!(graph.len(), 1);
        assert_eq!(graph.settings("alice", "bob"), Some(LinkSettings::limited(16)));
    }

    #[test]
    fn self_link_is_rejected() {
        let mut graph = ConnectivityGraph::default();

        assert_eq!(
            graph.connect("alice", "alice", LinkSettings::default()),
            Err(EnvironmentError::SelfLink("alice".into()))
        );
        assert!(graph.is_empty());
    }

    #[test]
    fn intercept_requires_declared_link() {
        let mut graph = ConnectivityGraph::default();
        let identity: Interceptor = Arc::new(|message: Bytes| message);

        assert_eq!(
            graph.intercept("alice", "bob", identity.clone()),
            Err(EnvironmentError::NotConnected { from: "alice".into(), to: "bob".into() })
        );

        graph.connect("alice", "bob", LinkSettings::default()).unwrap();
        assert!(graph.intercept("alice", "bob", identity).is_ok());
    }

    #[test]
    fn validate_reports_unknown_endpoint() {
        let mut graph = ConnectivityGraph::default();
        graph.connect("alice", "mallory", LinkSettings::default()).unwrap();

        assert_eq!(
            graph.validate(|name| name == "alice"),
            Err(EnvironmentError::UnknownAgent {
                agent: "mallory".into(),
                a: "alice".into(),
                b: "mallory".into(),
            })
        );
    }
}
