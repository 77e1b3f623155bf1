//! Flashcard catalog core: a REST category client, a durable local store
//! used as write-through cache and offline fallback, and the orchestrator
//! that keeps the two converged.

pub mod auth;
pub mod config;
pub mod remote;
pub mod search;
pub mod seed;
pub mod speech;
pub mod storage;
pub mod sync;
pub mod ui;
pub mod util;
pub mod viewer;
