//! Feed synchronization engine: the background polling loop, its backoff
//! state, and the staging area that hands results to the consumer.

mod engine;
mod pacing;
mod staging;

pub use engine::{Control, EngineHandle, SyncEngine};
pub use pacing::{Hold, Pacing};
pub use staging::{StagedUpdate, StagingArea};
