//! # Tasksmith - Typed Action Authoring and Task Reconciliation
//!
//! **Tasksmith** keeps the data model behind an agent-evaluation task editor:
//! the operations an environment exposes, the actions a user assembles from
//! them, and the canonical task document those actions reduce to. Free-text
//! input is coerced into typed arguments against each operation's schema, and
//! task documents survive export and re-import byte for byte, including whole
//! numbers that must keep their trailing `.0`.
//!
//! ## Core Workflow
//!
//! 1.  **Select an environment**: A [`Transport`](dispatch::Transport) fetches the operation schemas for an environment and interface; they replace the [`SchemaRegistry`](schema::SchemaRegistry) wholesale.
//! 2.  **Author actions**: Add actions to the [`SessionState`](session::SessionState), pick an operation for each and type raw parameter text.
//! 3.  **Execute**: The [`Dispatcher`](dispatch::Dispatcher) validates locally, sends each action to the backend and records the output. Batch runs are sequential and tolerate failures.
//! 4.  **Export, import, diff**: Rebuild the canonical [`TaskDocument`](task::TaskDocument), write it as float-aware JSON, load it back, or compare it line by line with the imported original.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tasksmith::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     let config = ClientConfig::builder("http://localhost:5000")
//!         .with_batch_delay(Duration::from_secs(1))
//!         .build();
//!     let dispatcher = Dispatcher::from_config(config)?;
//!     let mut session = SessionState::new();
//!
//!     dispatcher.select_environment(&mut session, "retail", "1").await?;
//!
//!     let action = session.add_action()?;
//!     session.select_operation(action, "update_record")?;
//!     session.set_raw_input(action, "record_id", "0042")?;
//!     session.set_raw_input(action, "amount", "100")?;
//!
//!     let outcome = dispatcher.execute(&mut session, action).await?;
//!     println!("Succeeded: {}", outcome.is_success());
//!
//!     // `amount` is exported as 100.0, `record_id` stays the string "0042".
//!     println!("{}", session.export()?);
//!     Ok(())
//! }
//! ```

pub mod action;
pub mod coercion;
pub mod dispatch;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod schema;
pub mod session;
pub mod task;
