//! Integration test suite for guild.
//!
//! These tests exercise the orchestration core end to end: quest graphs
//! feeding the dispatch queue, the coordination loop assigning work to
//! the roster, and completion rolling back up through the graph.
//!
//! # Test Categories
//!
//! - `quest_graph`: dependency graph invariants and readiness cascades
//! - `coordination`: loop dispatch, enhancer fallback, status reports
//! - `races`: concurrent direct assignment vs. loop ticks
//!
//! # CI Compatibility
//!
//! Enhancers are simulated in-process; no network calls are made.

mod fixtures;

mod coordination;
mod races;
