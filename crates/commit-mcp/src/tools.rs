//! MCP Tool definitions
//!
//! The fixed tool catalog and the result envelope returned to clients.
//!
//! # Tools
//!
//! - `git_status` - Show working tree status
//! - `git_diff` - Show working tree or staged changes
//! - `git_add` - Stage files
//! - `git_commit` - Commit with a conventional-commit prefix, optional auto-push
//! - `git_push` - Push to a remote
//! - `git_pull` - Pull from a remote (fast-forward only)
//! - `git_log` - Show recent commit history

use serde::{Deserialize, Serialize};

/// Tool definition for MCP protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// Result from a tool invocation
///
/// Serializes the error flag as `isError`, the field name MCP clients read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// Content types for tool results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolResult {
    /// Create a successful text result
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: content.into(),
            }],
            is_error: None,
        }
    }

    /// Create an error result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: Some(true),
        }
    }
}

/// Get all available tool definitions
///
/// The catalog is fixed at compile time and returned in a stable order.
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "git_status".to_string(),
            description: "Show working tree status (git status)".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "repoPath": {
                        "type": "string",
                        "description": "Local repository path (optional, defaults to the server root)"
                    }
                }
            }),
        },
        ToolDefinition {
            name: "git_diff".to_string(),
            description: "Show changes in the working tree or staging area (git diff)".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "repoPath": {
                        "type": "string",
                        "description": "Local repository path (optional)"
                    },
                    "staged": {
                        "type": "boolean",
                        "description": "Show staged changes instead of working tree changes (git diff --staged)"
                    }
                }
            }),
        },
        ToolDefinition {
            name: "git_add".to_string(),
            description: "Stage files for the next commit (git add)".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "repoPath": {
                        "type": "string",
                        "description": "Local repository path (optional)"
                    },
                    "files": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "File paths to stage; use [\".\"] to stage all changes"
                    }
                },
                "required": ["files"]
            }),
        },
        ToolDefinition {
            name: "git_commit".to_string(),
            description: "Record a commit with a conventional-commit prefix (git commit)"
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "repoPath": {
                        "type": "string",
                        "description": "Local repository path (optional)"
                    },
                    "type": {
                        "type": "string",
                        "enum": ["feat", "fix", "style", "refactor", "docs", "chore", "test"],
                        "description": "Commit type (feat = feature, fix = bugfix, style = formatting, ...)"
                    },
                    "scope": {
                        "type": "string",
                        "description": "Affected scope (optional, e.g. ui, api, db)"
                    },
                    "message": {
                        "type": "string",
                        "description": "Commit message body"
                    },
                    "push": {
                        "type": "boolean",
                        "description": "Push to the default remote after a successful commit (optional)"
                    }
                },
                "required": ["type", "message"]
            }),
        },
        ToolDefinition {
            name: "git_push".to_string(),
            description: "Push commits to a remote repository (git push)".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "repoPath": {
                        "type": "string",
                        "description": "Local repository path (optional)"
                    },
                    "remote": {
                        "type": "string",
                        "description": "Remote name (defaults to origin)"
                    },
                    "branch": {
                        "type": "string",
                        "description": "Branch to push (defaults to current)"
                    }
                }
            }),
        },
        ToolDefinition {
            name: "git_pull".to_string(),
            description: "Pull updates from a remote repository (git pull)".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "repoPath": {
                        "type": "string",
                        "description": "Local repository path (optional)"
                    },
                    "remote": {
                        "type": "string",
                        "description": "Remote name (defaults to origin)"
                    },
                    "branch": {
                        "type": "string",
                        "description": "Branch to pull (defaults to current)"
                    }
                }
            }),
        },
        ToolDefinition {
            name: "git_log".to_string(),
            description: "Show recent commit history (git log)".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "repoPath": {
                        "type": "string",
                        "description": "Local repository path (optional)"
                    },
                    "count": {
                        "type": "number",
                        "description": "Number of commits to show",
                        "default": 5
                    }
                }
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_tool_definitions() {
        let tools = get_tool_definitions();

        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert!(names.contains(&"git_status"));
        assert!(names.contains(&"git_diff"));
        assert!(names.contains(&"git_add"));
        assert!(names.contains(&"git_commit"));
        assert!(names.contains(&"git_push"));
        assert!(names.contains(&"git_pull"));
        assert!(names.contains(&"git_log"));
    }

    #[test]
    fn test_tool_definitions_count() {
        let tools = get_tool_definitions();
        assert_eq!(tools.len(), 7);
    }

    #[test]
    fn test_tool_definitions_are_idempotent() {
        let first = serde_json::to_string(&get_tool_definitions()).unwrap();
        let second = serde_json::to_string(&get_tool_definitions()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_tool_result_text() {
        let result = ToolResult::text("Success");
        assert!(result.is_error.is_none());
        assert_eq!(result.content.len(), 1);

        match &result.content[0] {
            ToolContent::Text { text } => assert_eq!(text, "Success"),
        }
    }

    #[test]
    fn test_tool_result_error() {
        let result = ToolResult::error("Failed");
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.content.len(), 1);

        match &result.content[0] {
            ToolContent::Text { text } => assert_eq!(text, "Failed"),
        }
    }

    #[test]
    fn test_tool_result_serialize() {
        let result = ToolResult::text("Hello, world!");
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("Hello, world!"));
        assert!(json.contains("text"));
        // The flag is skipped when None
        assert!(!json.contains("isError"));

        let error_result = ToolResult::error("Something went wrong");
        let error_json = serde_json::to_string(&error_result).unwrap();
        // The wire name is camelCase, not the Rust field name
        assert!(error_json.contains("\"isError\":true"));
        assert!(!error_json.contains("is_error"));
    }

    #[test]
    fn test_each_tool_has_valid_schema() {
        let tools = get_tool_definitions();
        for tool in &tools {
            assert!(
                tool.input_schema.is_object(),
                "Tool {} should have object schema",
                tool.name
            );
            let schema = tool.input_schema.as_object().unwrap();
            assert_eq!(
                schema.get("type").and_then(|v| v.as_str()),
                Some("object"),
                "Tool {} schema type should be 'object'",
                tool.name
            );
        }
    }

    #[test]
    fn test_tools_with_required_fields() {
        let tools = get_tool_definitions();

        // git_add requires "files"
        let git_add = tools.iter().find(|t| t.name == "git_add").unwrap();
        let required = git_add
            .input_schema
            .get("required")
            .unwrap()
            .as_array()
            .unwrap();
        assert!(required.iter().any(|v| v.as_str() == Some("files")));

        // git_commit requires "type" and "message"
        let git_commit = tools.iter().find(|t| t.name == "git_commit").unwrap();
        let required = git_commit
            .input_schema
            .get("required")
            .unwrap()
            .as_array()
            .unwrap();
        assert!(required.iter().any(|v| v.as_str() == Some("type")));
        assert!(required.iter().any(|v| v.as_str() == Some("message")));

        // The read-only tools have no required fields
        let git_status = tools.iter().find(|t| t.name == "git_status").unwrap();
        assert!(git_status.input_schema.get("required").is_none());
    }

    #[test]
    fn test_commit_type_enum_values() {
        let tools = get_tool_definitions();
        let git_commit = tools.iter().find(|t| t.name == "git_commit").unwrap();
        let variants = git_commit.input_schema["properties"]["type"]["enum"]
            .as_array()
            .unwrap();
        let variants: Vec<&str> = variants.iter().filter_map(|v| v.as_str()).collect();
        assert_eq!(
            variants,
            vec!["feat", "fix", "style", "refactor", "docs", "chore", "test"]
        );
    }
}
