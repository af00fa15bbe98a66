//! Operation registry.
//!
//! Every operation is a zero-sized type implementing [`Operation`]: it names itself,
//! owns a typed argument struct (whose JSON schema is derived with `schemars`) and
//! turns validated arguments into a [`Plan`]. [`OperationSpec::of`] erases the type
//! so a profile's operations can live side by side in one [`Registry`].

use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use super::model::ExternalRequest;
use super::render::TemplateKind;

/// Everything the dispatcher needs to run and render one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub request: ExternalRequest,
    /// Max records (or output lines) handed to the renderer.
    pub limit: Option<usize>,
    pub template: TemplateKind,
    /// Echoed by the renderer in headings and "no results" text.
    pub query: String,
}

/// Semantic rejection of otherwise well-typed arguments.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ArgumentError(pub String);

pub trait Operation {
    type Args: DeserializeOwned + JsonSchema;

    const NAME: &'static str;
    const DESCRIPTION: &'static str;
    /// Prefix of every external failure reported by this operation.
    const ERROR_LABEL: &'static str;

    fn plan(args: Self::Args) -> Result<Plan, ArgumentError>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("operation already registered: {0}")]
    Duplicate(String),
    #[error("malformed input schema for {name}: {reason}")]
    MalformedSchema { name: String, reason: String },
}

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("{0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Rejected(#[from] ArgumentError),
}

type Planner = fn(JsonObject) -> Result<Plan, PrepareError>;

/// Type-erased, immutable description of one operation.
#[derive(Clone)]
pub struct OperationSpec {
    name: &'static str,
    description: &'static str,
    error_label: &'static str,
    input_schema: Arc<JsonObject>,
    required: Vec<String>,
    defaults: JsonObject,
    planner: Planner,
}

impl std::fmt::Debug for OperationSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationSpec")
            .field("name", &self.name)
            .field("required", &self.required)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

fn plan_with<O: Operation>(args: JsonObject) -> Result<Plan, PrepareError> {
    let typed: O::Args = serde_json::from_value(Value::Object(args))?;
    Ok(O::plan(typed)?)
}

impl OperationSpec {
    /// Derive the spec of `O`, checking its schema describes an argument object.
    pub fn of<O: Operation>() -> Result<Self, RegistryError> {
        let malformed = |reason: &str| RegistryError::MalformedSchema {
            name: O::NAME.to_string(),
            reason: reason.to_string(),
        };

        let schema = schemars::schema_for!(O::Args);
        let Ok(Value::Object(mut schema)) = serde_json::to_value(&schema) else {
            return Err(malformed("schema is not a JSON object"));
        };
        if schema.get("type").and_then(Value::as_str) != Some("object") {
            return Err(malformed("top-level type must be \"object\""));
        }
        // Clients only need the argument shape.
        schema.remove("$schema");
        schema.remove("title");

        let required = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let mut defaults = JsonObject::new();
        if let Some(props) = schema.get("properties").and_then(Value::as_object) {
            for (pname, pobj) in props {
                if let Some(d) = pobj.get("default") {
                    defaults.insert(pname.clone(), d.clone());
                }
            }
            if let Some(missing) = required.iter().find(|r| !props.contains_key(r.as_str())) {
                return Err(malformed(&format!(
                    "required field '{missing}' has no property"
                )));
            }
        }

        Ok(Self {
            name: O::NAME,
            description: O::DESCRIPTION,
            error_label: O::ERROR_LABEL,
            input_schema: Arc::new(schema),
            required,
            defaults,
            planner: plan_with::<O>,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn error_label(&self) -> &'static str {
        self.error_label
    }

    pub fn input_schema(&self) -> &Arc<JsonObject> {
        &self.input_schema
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn defaults(&self) -> &JsonObject {
        &self.defaults
    }

    /// Required fields absent from `args`, in schema order.
    pub fn missing_required(&self, args: &JsonObject) -> Vec<&str> {
        self.required
            .iter()
            .filter(|r| !args.contains_key(r.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Convert to the typed argument struct (defaults applied) and build the plan.
    pub fn plan(&self, args: JsonObject) -> Result<Plan, PrepareError> {
        (self.planner)(args)
    }
}

/// Name-keyed, registration-ordered set of operations. Read-only once built.
#[derive(Debug, Default)]
pub struct Registry {
    ops: Vec<OperationSpec>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: OperationSpec) -> Result<(), RegistryError> {
        if self.lookup(spec.name()).is_some() {
            return Err(RegistryError::Duplicate(spec.name().to_string()));
        }
        self.ops.push(spec);
        Ok(())
    }

    /// Shorthand for `register(OperationSpec::of::<O>()?)`.
    pub fn with<O: Operation>(mut self) -> Result<Self, RegistryError> {
        self.register(OperationSpec::of::<O>()?)?;
        Ok(self)
    }

    pub fn lookup(&self, name: &str) -> Option<&OperationSpec> {
        self.ops.iter().find(|op| op.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OperationSpec> {
        self.ops.iter()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
