use chrono::NaiveDateTime;

use super::super::models::IterationRecord;
use crate::application::tooling::ToolRegistry;

const LOADING_TOOLS: &str = "Loading tools from MCP server...";
const LOADING_NAMES: &str = "loading...";

/// Renders the system prompt for the current registry contents.
pub fn system_prompt(registry: &ToolRegistry, now: NaiveDateTime) -> String {
    let functions = if registry.is_empty() {
        LOADING_TOOLS.to_string()
    } else {
        registry
            .descriptors()
            .iter()
            .map(|tool| format!("- {}: {}", tool.name, tool.description))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let names = if registry.is_empty() {
        LOADING_NAMES.to_string()
    } else {
        registry.names().collect::<Vec<_>>().join(", ")
    };
    let today = now.format("%Y-%m-%d %H:%M (%A)");

    format!(
        r#"## Task

You are managing a google calendar for a user. Act as per their latest request.

## Context

Current date and time: {today}

Available calendar functions:
{functions}

## Workflow

1. Analyze the user request and current context
2. Decide which functions to call
3. After execution, you'll receive results
4. Based on results, decide if more actions are needed
5. If more actions are needed, repeat the process
6. If no more actions are needed, return the final result

## Output Format

Output shall be a JSON file with below fields:
{{
  "function_calls": [
    {{
      "name": "...",
      "arguments": {{...}}
    }},
    ...
  ],
  "reasoning": "..."
}}

The "function_calls" field should contain a list of function calls to execute. Each function call should have:
- "name": The name of the function (one of: {names})
- "arguments": A dictionary of arguments to pass to the function. Be vigilant using proper types for arguments.

The "reasoning" field should contain a brief explanation of why you selected these functions and arguments."#
    )
}

/// The prompt for every iteration after the first: the original request
/// plus each earlier iteration's actions and results.
pub fn follow_up_prompt(request: &str, history: &[IterationRecord]) -> String {
    let summary = history
        .iter()
        .map(|record| {
            format!(
                "Iteration {}:\nActions taken: {}\nResults: {}",
                record.iteration,
                pretty(&record.actions),
                pretty(&record.results)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Original user request: {request}\n\n\
         Previous actions and results:\n{summary}\n\n\
         Based on these results, what should be done next to complete the user's request?\n\
         If the task is complete, return empty function_calls: []"
    )
}

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "[]".to_string())
}
