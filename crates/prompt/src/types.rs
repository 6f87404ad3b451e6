//! Prompt types for SiteQA.

use serde::{Deserialize, Serialize};

/// A prompt template, either built in or loaded from a workspace override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    pub id: String,
    pub title: String,

    /// Schema version of the YAML file, `x.y`
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Handlebars template
    pub template: String,
}

impl PromptDefinition {
    /// Whether the template interpolates `{{variable}}`, allowing inner
    /// whitespace such as `{{ variable }}`.
    pub fn references(&self, variable: &str) -> bool {
        let mut rest = self.template.as_str();
        while let Some(open) = rest.find("{{") {
            let after = &rest[open + 2..];
            let Some(close) = after.find("}}") else {
                return false;
            };
            if after[..close].trim().trim_start_matches('{') == variable {
                return true;
            }
            rest = &after[close + 2..];
        }
        false
    }
}

/// A rendered prompt ready for the completion capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPrompt {
    /// Rendered prompt text
    pub user: String,

    /// Id of the definition it was rendered from
    pub prompt_id: String,
}
