//! Shared test utilities for the git-commit-mcp workspace.
//!
//! This crate provides standardised git fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.

pub mod git;
