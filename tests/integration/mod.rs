//! Integration tests for the mangaflow panel generation orchestrator

mod bulk_generation;
mod config_integration;
mod studio_flow;
mod test_utils;
