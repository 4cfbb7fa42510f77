//! Control API: history retrieval and run cancellation.

use serde::de::DeserializeOwned;

use crate::client::AgentClient;
use crate::error::{Error, Result};
use crate::types::{Checkpoint, StopRequest};

/// Control API client.
pub struct ControlApi {
    client: AgentClient,
}

impl ControlApi {
    pub(crate) fn new(client: AgentClient) -> Self {
        Self { client }
    }

    /// Fetch every checkpoint of a thread, in the order the service returns them.
    pub async fn history<S, I>(&self, thread_id: &str) -> Result<Vec<Checkpoint<S, I>>>
    where
        S: DeserializeOwned,
        I: DeserializeOwned,
    {
        let checkpoints: Vec<Checkpoint<S, I>> = self
            .client
            .get_with_query(
                "history",
                &[("thread_id", thread_id)],
                |status, detail| Error::HistoryFetch { status, detail },
                "Failed to fetch agent history",
            )
            .await?;

        tracing::debug!(thread_id, count = checkpoints.len(), "fetched history");
        Ok(checkpoints)
    }

    /// Signal the service to stop the run on a thread.
    pub async fn stop(&self, thread_id: &str) -> Result<()> {
        let request = StopRequest {
            thread_id: thread_id.to_string(),
        };
        self.client
            .post_no_content(
                "agent/stop",
                &request,
                |status, detail| Error::Stop { status, detail },
                "Failed to stop agent",
            )
            .await?;

        tracing::debug!(thread_id, "stop requested");
        Ok(())
    }
}
