//! Icon instruction templating with simple `{{placeholder}}` substitution.
//!
//! The user only types what the icon is for; the generation client wraps that
//! text in an instruction template. Any `{{ key }}` in the template is replaced
//! with `inputs[key]`.
use serde_json::{json, Value};
use crate::error::{AppResult, AppError};

pub const DEFAULT_ICON_TEMPLATE: &str = "Create a clean, modern app icon derived from the provided image. \
The icon should clearly communicate its purpose: {{purpose}}. \
Use a square canvas, simple shapes and bold colors, with no text. Return a single PNG image.";

#[derive(Debug, Clone)]
pub struct PromptConstructor {
    template: String,
}

impl Default for PromptConstructor {
    fn default() -> Self {
        PromptConstructor { template: DEFAULT_ICON_TEMPLATE.to_string() }
    }
}

impl PromptConstructor {
    pub fn new(template: impl Into<String>) -> AppResult<Self> {
        let template = template.into();
        Self::validate_template(&template)?;
        Ok(PromptConstructor { template })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Instruction text for a given icon purpose.
    pub fn icon_instruction(&self, purpose: &str) -> AppResult<String> {
        self.construct_prompt(&json!({ "purpose": purpose }))
    }

    /// Substitute every placeholder in the template with values from `inputs`.
    pub fn construct_prompt(&self, inputs: &Value) -> AppResult<String> {
        let inputs = inputs
            .as_object()
            .ok_or_else(|| AppError::PromptConstruction("Inputs must be a JSON object".to_string()))?;

        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after
                .find("}}")
                .ok_or_else(|| AppError::PromptConstruction("Unclosed placeholder".to_string()))?;
            let key = after[..end].trim();
            match inputs.get(key) {
                Some(Value::String(s)) => out.push_str(s),
                Some(other) => out.push_str(&other.to_string()),
                None => {
                    return Err(AppError::PromptConstruction(format!("Missing input for placeholder: {}", key)));
                }
            }
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Placeholders must be closed and non-empty.
    fn validate_template(template: &str) -> AppResult<()> {
        let mut rest = template;
        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                return Err(AppError::PromptConstruction("Unclosed placeholder".to_string()));
            };
            if after[..end].trim().is_empty() {
                return Err(AppError::PromptConstruction("Empty placeholder".to_string()));
            }
            rest = &after[end + 2..];
        }
        Ok(())
    }
}
