//! Runs API.

use serde::Serialize;

use crate::client::AgentClient;
use crate::error::Result;
use crate::stream::{EventStream, event_stream};
use crate::types::RunInput;

/// Runs API client.
pub struct RunsApi {
    client: AgentClient,
}

impl RunsApi {
    pub(crate) fn new(client: AgentClient) -> Self {
        Self { client }
    }

    /// Post a run input to the dispatch route and stream the events.
    ///
    /// Fails with [`Error::Request`](crate::Error::Request) if the route
    /// answers with a non-success status. Errors after that point arrive
    /// through the returned stream.
    pub async fn stream<S, R>(&self, input: &RunInput<S, R>) -> Result<EventStream>
    where
        S: Serialize,
        R: Serialize,
    {
        tracing::debug!(
            kind = %input.kind(),
            thread_id = input.thread_id(),
            agent = ?input.agent(),
            url = %self.client.dispatch_url(),
            "dispatching run"
        );

        let response = self.client.post_stream(input).await?;
        Ok(event_stream(response.bytes_stream()))
    }

    /// Start a fresh run.
    pub async fn run<S: Serialize>(&self, thread_id: &str, state: S) -> Result<EventStream> {
        self.stream(&RunInput::<S, ()>::run(thread_id, state)).await
    }

    /// Resume an interrupted run with a value.
    pub async fn resume<R: Serialize>(&self, thread_id: &str, value: R) -> Result<EventStream> {
        self.stream(&RunInput::<(), R>::resume(thread_id, value))
            .await
    }

    /// Fork a thread from a checkpoint with a replacement state.
    pub async fn fork<S: Serialize>(
        &self,
        thread_id: &str,
        checkpoint_id: &str,
        state: S,
    ) -> Result<EventStream> {
        self.stream(&RunInput::<S, ()>::fork(thread_id, checkpoint_id, state))
            .await
    }

    /// Replay a thread from a checkpoint.
    pub async fn replay(&self, thread_id: &str, checkpoint_id: &str) -> Result<EventStream> {
        self.stream(&RunInput::<(), ()>::replay(thread_id, checkpoint_id))
            .await
    }
}
