//! Integration tests for Sounder
//!
//! Drive the full probing pipeline end to end against loopback mock
//! trackers: dispatcher, worker pool, and aggregation working together.

#[path = "integration/probe_workflow.rs"]
mod probe_workflow;
