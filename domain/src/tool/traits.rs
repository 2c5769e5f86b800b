//! Tool domain traits
//!
//! Contains pure domain logic traits for tool validation.
//! The async ToolExecutorPort is defined in the application layer (ports).

use std::collections::HashMap;

use super::entities::ToolDefinition;

/// Structural validator for tool arguments
///
/// This is a pure domain trait that validates argument names
/// against a tool definition without any I/O operations. Type-level
/// validation happens afterwards, when the arguments are decoded into
/// the tool's typed input.
pub trait ToolValidator {
    /// Validate raw call arguments against a definition
    fn validate(
        &self,
        arguments: &HashMap<String, serde_json::Value>,
        definition: &ToolDefinition,
    ) -> Result<(), String>;
}

/// Default implementation of ToolValidator
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl ToolValidator for DefaultToolValidator {
    fn validate(
        &self,
        arguments: &HashMap<String, serde_json::Value>,
        definition: &ToolDefinition,
    ) -> Result<(), String> {
        // Check that all required parameters are present
        for param in &definition.parameters {
            if param.required && !arguments.contains_key(&param.name) {
                return Err(format!(
                    "Missing required parameter '{}' for tool '{}'",
                    param.name, definition.name
                ));
            }
        }

        // Check that all provided arguments are valid parameters
        let valid_params: std::collections::HashSet<&str> =
            definition.parameters.iter().map(|p| p.name.as_str()).collect();

        let mut names: Vec<&String> = arguments.keys().collect();
        names.sort();
        for arg_name in names {
            if !valid_params.contains(arg_name.as_str()) {
                return Err(format!(
                    "Unknown parameter '{}' for tool '{}'",
                    arg_name, definition.name
                ));
            }
        }

        Ok(())
    }
}
