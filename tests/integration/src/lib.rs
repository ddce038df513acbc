//! Integration test utilities for the chat server
//!
//! This crate provides helpers for running end-to-end tests against a real
//! listener: TCP chat clients and an HTTP client for the admin surface.

pub mod client;
pub mod helpers;

pub use client::*;
pub use helpers::*;
