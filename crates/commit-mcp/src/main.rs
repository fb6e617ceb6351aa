//! git-commit MCP Server
//!
//! A Model Context Protocol server that exposes git operations (status,
//! diff, add, commit, push, pull, log) to agentic IDEs like Claude Desktop,
//! Windsurf, and Cursor.
//!
//! # Usage
//!
//! ```bash
//! commit-mcp [--root <path>]
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Control log verbosity (default: `commit_mcp=info`)
//!
//! # Protocol
//!
//! The server communicates via JSON-RPC 2.0 over stdio:
//! - Requests/responses go through stdout
//! - Logs go to stderr (to avoid interfering with the protocol)

use std::path::PathBuf;

use clap::Parser;
use commit_mcp::CommitMcpServer;

/// MCP server for git operations
#[derive(Parser)]
#[command(name = "commit-mcp")]
#[command(about = "MCP server for git operations")]
#[command(version)]
struct Args {
    /// Fallback repository path for calls without an explicit repoPath
    #[arg(short, long, default_value = ".")]
    root: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging to stderr (stdout is reserved for MCP protocol)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("commit_mcp=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!(root = ?args.root, "Starting commit-mcp server");

    let mut server = CommitMcpServer::new(args.root);
    server.run().await?;

    Ok(())
}
