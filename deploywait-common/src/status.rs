//! Status document model and agent state aggregation
//!
//! The orchestration client reports machines and units as a YAML document.
//! Only the `agent-state` of each entry matters here; everything else in the
//! document is ignored.

use crate::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Group name for agents whose entry carries no `agent-state`
pub const NO_AGENT: &str = "no-agent";

/// State every agent must reach before an environment counts as up
pub const STARTED: &str = "started";

/// Parsed `juju status` output
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Status {
    #[serde(default, deserialize_with = "string_keyed")]
    pub machines: BTreeMap<String, AgentEntry>,
    #[serde(default, alias = "applications", deserialize_with = "string_keyed")]
    pub services: BTreeMap<String, Service>,
}

/// A deployed service and its units
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Service {
    #[serde(default, deserialize_with = "string_keyed")]
    pub units: BTreeMap<String, AgentEntry>,
}

/// A machine or unit entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentEntry {
    #[serde(rename = "agent-state")]
    pub agent_state: Option<String>,
}

impl AgentEntry {
    pub fn state(&self) -> &str {
        self.agent_state.as_deref().unwrap_or(NO_AGENT)
    }
}

impl Status {
    pub fn from_yaml(text: &str) -> Result<Self> {
        // An empty document means nothing is deployed yet
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Machines first, then the units of each service, all in name order
    pub fn agent_items(&self) -> impl Iterator<Item = (&str, &AgentEntry)> + '_ {
        let machines = self
            .machines
            .iter()
            .map(|(name, machine)| (name.as_str(), machine));
        let units = self.services.values().flat_map(|service| {
            service
                .units
                .iter()
                .map(|(name, unit)| (name.as_str(), unit))
        });
        machines.chain(units)
    }

    /// Map agent states to the machines and units in those states
    pub fn agent_states(&self) -> AgentStates {
        let mut states = AgentStates::default();
        for (name, entry) in self.agent_items() {
            states.insert(entry.state(), name);
        }
        states
    }
}

/// Agents grouped by state, in state name order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AgentStates(BTreeMap<String, Vec<String>>);

impl AgentStates {
    pub fn insert(&mut self, state: &str, agent: &str) {
        self.0
            .entry(state.to_string())
            .or_default()
            .push(agent.to_string());
    }

    pub fn get(&self, state: &str) -> Option<&[String]> {
        self.0.get(state).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.0
            .iter()
            .map(|(state, agents)| (state.as_str(), agents.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of agents across every state
    pub fn agent_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// True only when `state` is the single state present.
    /// An empty status is never considered settled.
    pub fn all_in(&self, state: &str) -> bool {
        self.0.len() == 1 && self.0.contains_key(state)
    }

    /// First errored state and the first agent stuck in it
    pub fn first_errored(&self) -> Option<(&str, &str)> {
        self.iter()
            .filter(|(state, _)| state.contains("error"))
            .find_map(|(state, agents)| agents.first().map(|agent| (state, agent.as_str())))
    }
}

/// Render every state except `expected` as `state: a, b`, joined by ` | `
pub fn format_listing(states: &AgentStates, expected: &str) -> String {
    states
        .iter()
        .filter(|(state, _)| *state != expected)
        .map(|(state, agents)| format!("{}: {}", state, agents.join(", ")))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Deserialize a possibly-null map whose keys may be YAML scalars of any type
fn string_keyed<'de, D, T>(deserializer: D) -> std::result::Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let raw: Option<HashMap<serde_yaml::Value, T>> = Option::deserialize(deserializer)?;
    let mut map = BTreeMap::new();
    for (key, value) in raw.unwrap_or_default() {
        let key = match key {
            serde_yaml::Value::String(s) => s,
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "unsupported status key: {:?}",
                    other
                )))
            }
        };
        map.insert(key, value);
    }
    Ok(map)
}
