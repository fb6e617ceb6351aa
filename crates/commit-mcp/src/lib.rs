//! MCP server for git operations
//!
//! This crate exposes a small set of git operations (status, diff, add,
//! commit, push, pull, log) via the Model Context Protocol, letting agentic
//! clients (Claude Desktop, Windsurf, Cursor) drive a local repository
//! through structured tool calls instead of shell invocation.
//!
//! # Architecture
//!
//! ```text
//! [ MCP Client (Claude/IDE) ]
//!        | (JSON-RPC over stdio)
//!        v
//! [ commit-mcp (registry + dispatcher) ]
//!        | (Rust API)
//!        v
//! [ commit-git (git2 client) ]
//!        |
//!        +--> [ local git repository ]
//! ```
//!
//! # Tools
//!
//! The server exposes seven tools: `git_status`, `git_diff`, `git_add`,
//! `git_commit` (conventional-commit prefixes, optional auto-push),
//! `git_push`, `git_pull`, and `git_log`. Each invocation resolves its own
//! repository path (explicit `repoPath` argument or the server's fallback
//! root) and opens its own client; no state is shared across calls.

pub mod error;
pub mod handlers;
pub mod protocol;
pub mod server;
pub mod tools;

pub use error::{Error, Result};
pub use handlers::{CommitType, handle_tool_call};
pub use server::CommitMcpServer;
pub use tools::{ToolContent, ToolDefinition, ToolResult, get_tool_definitions};
