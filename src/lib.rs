//! Mangaflow: Panel Generation Orchestrator
//!
//! Plans illustrated comic projects from a premise and drives a remote asynchronous
//! image service to draw each panel, keeping every project in a single persisted store.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod project;
pub mod remote;
pub mod sequencer;
pub mod store;
pub mod storyline;
pub mod studio;
pub mod types;
