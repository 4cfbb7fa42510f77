//! Streaming HTTP client for LangGraph-style agent services.
//!
//! A run is started (or resumed, forked, replayed) by posting a [`RunInput`]
//! to the service's dispatch route. The response body is an SSE-style stream
//! of `event:`/`data:` lines, which this crate decodes into [`AgentEvent`]s
//! as the bytes arrive.
//!
//! # Example
//!
//! ```no_run
//! use agentwire_client::{AgentClient, Result, RunInput};
//! use serde_json::json;
//!
//! # async fn example() -> Result<()> {
//! let client = AgentClient::builder()
//!     .base_url("http://localhost:8000")
//!     .build()?;
//!
//! let input: RunInput = RunInput::run("thread-1", json!({"messages": []}));
//! let mut stream = client.stream_run(&input).await?;
//! while let Some(event) = stream.next_event().await {
//!     let event = event?;
//!     println!("{}: {}", event.event, event.data);
//! }
//!
//! // Walk the thread's checkpoints
//! let history = client.get_history::<serde_json::Value, serde_json::Value>("thread-1").await?;
//! println!("{} checkpoints", history.len());
//! # Ok(())
//! # }
//! ```
//!
//! Dropping an [`EventStream`] closes the connection. Nothing is retried.

pub mod api;
pub mod client;
pub mod decode;
pub mod error;
pub mod stream;
pub mod types;

pub use client::{AgentClient, ClientBuilder};
pub use decode::{EventAssembler, EventParser, Frame, FrameDecoder, FrameField};
pub use error::{Error, Result};
pub use stream::{EventStream, event_stream};
pub use types::*;
