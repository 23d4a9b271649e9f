//! src/dataloader/common/mod.rs
//!
//! Utilities shared by the main-thread and worker-thread iteration paths.

pub mod thread;
