//! tronmock - a mock Tron explorer / wallet-RPC responder
//!
//! Answers requests shaped like calls to a public block explorer and a node
//! wallet RPC from a locally held table of fabricated transactions, instead
//! of forwarding to the real network.
//!
//! # Architecture
//!
//! ## Record Store
//! - [`store`] - Swappable in-memory transaction table, loaded from JSON
//!
//! ## Aggregation
//! - [`aggregate`] - Balance, transfer-listing and windowed-volume views
//!
//! ## Response Synthesis
//! - [`responses`] - Explorer-family and node-RPC-family reply shapes
//!
//! ## Routing
//! - [`api`] - Endpoint routes, family catch-alls, server loop
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Record Store & Aggregation
// ============================================================================
pub mod aggregate;
pub mod store;

// ============================================================================
// HTTP Surface
// ============================================================================
pub mod api;
pub mod responses;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
