use jsonschema::JSONSchema;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{fmt, sync::OnceLock};

/// JSON schema a model reply must satisfy, with its validator compiled on first use.
pub struct SchemaHandle {
    name: &'static str,
    schema: Value,
    pub(super) compiled: OnceLock<Result<JSONSchema, String>>,
}

impl SchemaHandle {
    /// Schema generated from `T`'s `JsonSchema` impl.
    pub fn of<T: JsonSchema>(name: &'static str) -> Self {
        Self {
            name,
            schema: serde_json::to_value(schemars::schema_for!(T)).unwrap_or_default(),
            compiled: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn schema_json(&self) -> &Value {
        &self.schema
    }
}

impl fmt::Debug for SchemaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaHandle")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// A reply type decoded from raw model text.
///
/// Implement it with `#[derive(ReplySchema)]` next to `JsonSchema`.
pub trait ReplySchema: DeserializeOwned + Send + Sync + 'static {
    fn schema() -> &'static SchemaHandle;
}
