use jsonschema::{Draft, JSONSchema, ValidationError};
use serde_json::Value;

use crate::{
    error::{PlannerError, Result},
    schemas::SchemaHandle,
};

const REPORTED_VIOLATIONS: usize = 3;

impl SchemaHandle {
    /// Check a parsed reply against the schema.
    ///
    /// Violations become `MalformedResponse`; a schema that does not compile
    /// is a `Config` error.
    pub fn validate(&self, payload: &Value) -> Result<()> {
        let validator = self.validator()?;

        let violations: Vec<String> = match validator.validate(payload) {
            Ok(()) => return Ok(()),
            Err(errors) => errors.map(describe_violation).collect(),
        };

        let mut message = violations
            .iter()
            .take(REPORTED_VIOLATIONS)
            .cloned()
            .collect::<Vec<_>>()
            .join("; ");
        if violations.len() > REPORTED_VIOLATIONS {
            message.push_str(&format!(
                " (+{} more)",
                violations.len() - REPORTED_VIOLATIONS
            ));
        }

        Err(PlannerError::MalformedResponse(format!(
            "reply does not match `{}`: {}",
            self.name(),
            message
        )))
    }

    fn validator(&self) -> Result<&JSONSchema> {
        self.compiled
            .get_or_init(|| {
                JSONSchema::options()
                    .with_draft(Draft::Draft7)
                    .compile(self.schema_json())
                    .map_err(|err| err.to_string())
            })
            .as_ref()
            .map_err(|err| {
                PlannerError::Config(format!("`{}` schema does not compile: {}", self.name(), err))
            })
    }
}

fn describe_violation(error: ValidationError<'_>) -> String {
    let path = error.instance_path.to_string();
    let location = if path.is_empty() { "<root>" } else { path.as_str() };
    format!("{location}: {error}")
}
