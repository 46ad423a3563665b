//! Background tasks and scheduled jobs.
//!
//! Each submodule provides an async function or job type intended to be
//! spawned via `tokio::spawn` (or onto the state's task tracker).
//! Long-running loops accept a [`CancellationToken`](tokio_util::sync::CancellationToken)
//! for graceful shutdown.

pub mod image_processing;
pub mod token_cleanup;
