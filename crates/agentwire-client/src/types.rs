//! Request and response types for the agent service.
//!
//! These types mirror the service's wire contract.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// Event tag used when an event group carries no `event` field.
pub const DEFAULT_EVENT_TAG: &str = "message";

/// One complete event decoded from the run stream.
///
/// The shape of `data` depends on `event` and is left to the consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEvent {
    /// Event tag, e.g. `checkpoint`, `message_chunk`, `interrupt`.
    pub event: String,
    /// JSON payload.
    pub data: serde_json::Value,
}

impl AgentEvent {
    /// Create an event.
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Deserialize the payload into a caller-defined type.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&self.data)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// History
// ─────────────────────────────────────────────────────────────────────────────

/// A persisted snapshot of agent state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "S: Deserialize<'de>, I: Deserialize<'de>"))]
pub struct Checkpoint<S = serde_json::Value, I = serde_json::Value> {
    /// Thread the checkpoint belongs to.
    #[serde(alias = "threadId")]
    pub thread_id: String,
    /// Checkpoint reference usable for fork and replay.
    #[serde(default, alias = "checkpointId", skip_serializing_if = "Option::is_none")]
    pub checkpoint_id: Option<String>,
    /// Agent state at this checkpoint.
    pub state: S,
    /// Value the graph was interrupted with, if it paused for input.
    #[serde(default, alias = "interruptValue", skip_serializing_if = "Option::is_none")]
    pub interrupt_value: Option<I>,
    /// Error recorded at this checkpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<S, I> Checkpoint<S, I> {
    /// Whether the run paused at this checkpoint waiting for a resume value.
    pub fn is_interrupted(&self) -> bool {
        self.interrupt_value.is_some()
    }
}

/// Request to stop a running thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopRequest {
    /// Thread to stop.
    pub thread_id: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Run input
// ─────────────────────────────────────────────────────────────────────────────

/// How a run is started or continued.
///
/// Serialized with an internal `type` tag, which the dispatch route uses to
/// pick the execution mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunInput<S = serde_json::Value, R = serde_json::Value> {
    /// Start a fresh run from an initial state.
    Run {
        thread_id: String,
        state: S,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agent: Option<String>,
    },
    /// Continue an interrupted run with a resume value.
    Resume {
        thread_id: String,
        resume: R,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agent: Option<String>,
    },
    /// Branch from an earlier checkpoint with a replacement state.
    Fork {
        thread_id: String,
        checkpoint_id: String,
        state: S,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agent: Option<String>,
    },
    /// Re-execute from an earlier checkpoint as-is.
    Replay {
        thread_id: String,
        checkpoint_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agent: Option<String>,
    },
}

/// Tag of a [`RunInput`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunKind {
    Run,
    Resume,
    Fork,
    Replay,
}

impl RunKind {
    /// Wire name of the tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunKind::Run => "run",
            RunKind::Resume => "resume",
            RunKind::Fork => "fork",
            RunKind::Replay => "replay",
        }
    }
}

impl std::fmt::Display for RunKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<S, R> RunInput<S, R> {
    /// Start a fresh run.
    pub fn run(thread_id: impl Into<String>, state: S) -> Self {
        RunInput::Run {
            thread_id: thread_id.into(),
            state,
            agent: None,
        }
    }

    /// Resume an interrupted run.
    pub fn resume(thread_id: impl Into<String>, resume: R) -> Self {
        RunInput::Resume {
            thread_id: thread_id.into(),
            resume,
            agent: None,
        }
    }

    /// Fork from a checkpoint.
    pub fn fork(thread_id: impl Into<String>, checkpoint_id: impl Into<String>, state: S) -> Self {
        RunInput::Fork {
            thread_id: thread_id.into(),
            checkpoint_id: checkpoint_id.into(),
            state,
            agent: None,
        }
    }

    /// Replay from a checkpoint.
    pub fn replay(thread_id: impl Into<String>, checkpoint_id: impl Into<String>) -> Self {
        RunInput::Replay {
            thread_id: thread_id.into(),
            checkpoint_id: checkpoint_id.into(),
            agent: None,
        }
    }

    /// Select the agent graph that handles this run.
    pub fn with_agent(mut self, name: impl Into<String>) -> Self {
        let slot = match &mut self {
            RunInput::Run { agent, .. }
            | RunInput::Resume { agent, .. }
            | RunInput::Fork { agent, .. }
            | RunInput::Replay { agent, .. } => agent,
        };
        *slot = Some(name.into());
        self
    }

    /// Thread this input targets.
    pub fn thread_id(&self) -> &str {
        match self {
            RunInput::Run { thread_id, .. }
            | RunInput::Resume { thread_id, .. }
            | RunInput::Fork { thread_id, .. }
            | RunInput::Replay { thread_id, .. } => thread_id,
        }
    }

    /// Agent graph name, if one was selected.
    pub fn agent(&self) -> Option<&str> {
        match self {
            RunInput::Run { agent, .. }
            | RunInput::Resume { agent, .. }
            | RunInput::Fork { agent, .. }
            | RunInput::Replay { agent, .. } => agent.as_deref(),
        }
    }

    /// Variant tag.
    pub fn kind(&self) -> RunKind {
        match self {
            RunInput::Run { .. } => RunKind::Run,
            RunInput::Resume { .. } => RunKind::Resume,
            RunInput::Fork { .. } => RunKind::Fork,
            RunInput::Replay { .. } => RunKind::Replay,
        }
    }
}
