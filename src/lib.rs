//! gather: background RSS/Atom feed synchronization.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌─────────────┐ refresh ┌─────────────┐ queries ┌─────────────┐
//! │ sync::      │ ──────► │ repo::      │ ──────► │ store::     │
//! │ SyncEngine  │         │ FeedRepo…   │         │ Store       │
//! └─────────────┘         └─────────────┘         └─────────────┘
//!       │ publish                ▲ metadata
//!       ▼                        │
//! ┌─────────────┐  drain  ┌─────────────┐
//! │ sync::      │ ◄────── │ consumer::  │
//! │ StagingArea │         │ run         │
//! └─────────────┘         └─────────────┘
//! ```
//!
//! * **`store`**: generic parameterized data access. Text-bound statements
//!   in, ordered column-name→value rows out.
//! * **`repo`**: feed definitions and headline records over the store;
//!   freshness, change detection, retention pruning.
//! * **`fetch`**: HTTP retrieval and feed parsing; one attempt per call,
//!   uniform transport status.
//! * **`sync`**: the polling engine, its backoff pacing, and the staging
//!   area that hands results to the consumer.
//! * **`consumer`**: drains the staging area and reflects state externally.

pub mod config;
pub mod consumer;
pub mod fetch;
pub mod repo;
pub mod store;
pub mod sync;
pub mod util;
