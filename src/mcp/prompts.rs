//! Static prompts offered through `prompts/list` and `prompts/get`

use serde_json::{json, Value};

const BTQL_QUERY_TEMPLATE: &str = include_str!("templates/btql_query.md");
const LOG_ANALYSIS_TEMPLATE: &str = include_str!("templates/log_analysis.md");

#[derive(Debug, Clone, Copy)]
pub struct PromptDef {
    pub name: &'static str,
    pub description: &'static str,
    template: &'static str,
}

impl PromptDef {
    /// Prompt text with the project id filled in
    pub fn render(&self, project_id: &str) -> String {
        self.template.replace("{project_id}", project_id)
    }

    pub fn listing(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "arguments": [],
        })
    }
}

pub const PROMPTS: &[PromptDef] = &[
    PromptDef {
        name: "btql_query_prompt",
        description: "BTQL syntax, common fields and example queries for the project",
        template: BTQL_QUERY_TEMPLATE,
    },
    PromptDef {
        name: "log_analysis_prompt",
        description: "Workflow for analyzing chat logs for assistant-like behavior",
        template: LOG_ANALYSIS_TEMPLATE,
    },
];

pub fn find_prompt(name: &str) -> Option<&'static PromptDef> {
    PROMPTS.iter().find(|p| p.name == name)
}
