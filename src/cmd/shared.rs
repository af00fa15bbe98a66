/*!
shared.rs - helpers shared by the operator subcommands.

Focus:
  - load_registry / find_operation: profile -> registry -> operation lookup
  - describe_params: flatten an operation's input schema into display rows
  - build_arguments + coerce_value: CLI strings -> typed JSON arguments
  - parse_param / load_param_file_into_map: --param and --param-file handling
*/

use anyhow::{Context, Result, bail};
use rmcp::model::JsonObject;
use serde_json::Value;
use std::collections::HashMap;

use crate::relay::{OperationSpec, Registry};
use crate::servers::ServerKind;

/* ---- Registry Access ---- */

pub fn load_registry(kind: ServerKind) -> Result<Registry> {
    kind.registry()
        .with_context(|| format!("Failed to build registry for profile '{kind}'"))
}

/// Exact match first, then case-insensitive.
pub fn find_operation<'a>(registry: &'a Registry, name: &str) -> Option<&'a OperationSpec> {
    registry.lookup(name).or_else(|| {
        registry
            .iter()
            .find(|op| op.name().eq_ignore_ascii_case(name))
    })
}

pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")
}

/* ---- Schema Flattening ---- */

#[derive(Debug, Clone, PartialEq)]
pub struct ParamInfo {
    pub name: String,
    pub ptype: String,
    pub required: bool,
    pub default: Option<Value>,
    pub description: String,
    /// Allowed values when the property is an enum.
    pub choices: Vec<String>,
}

/// Follow a local `$ref` (or the first non-null `anyOf` branch) to the schema that
/// actually carries `type` / `enum`.
fn resolve<'a>(root: &'a JsonObject, prop: &'a Value) -> &'a Value {
    if let Some(reference) = prop.get("$ref").and_then(Value::as_str)
        && let Some(name) = reference.strip_prefix("#/$defs/")
        && let Some(def) = root.get("$defs").and_then(|d| d.get(name))
    {
        return def;
    }
    if let Some(branches) = prop.get("anyOf").and_then(Value::as_array)
        && let Some(first) = branches
            .iter()
            .find(|b| b.get("type").and_then(Value::as_str) != Some("null"))
    {
        return resolve(root, first);
    }
    prop
}

fn type_of(schema: &Value) -> String {
    match schema.get("type") {
        Some(Value::String(t)) => t.clone(),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null")
            .unwrap_or("any")
            .to_string(),
        _ if !choices_of(schema).is_empty() => "string".to_string(),
        _ => "any".to_string(),
    }
}

fn choices_of(schema: &Value) -> Vec<String> {
    if let Some(values) = schema.get("enum").and_then(Value::as_array) {
        return values
            .iter()
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
            .collect();
    }
    // schemars renders documented unit variants as `oneOf: [{const, description}]`.
    schema
        .get("oneOf")
        .and_then(Value::as_array)
        .map(|variants| {
            variants
                .iter()
                .filter_map(|v| v.get("const").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn describe_params(op: &OperationSpec) -> Vec<ParamInfo> {
    let schema = op.input_schema();
    let Some(props) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    props
        .iter()
        .map(|(name, prop)| {
            let target = resolve(schema, prop);
            let description = prop
                .get("description")
                .or_else(|| target.get("description"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            ParamInfo {
                name: name.clone(),
                ptype: type_of(target),
                required: op.required().iter().any(|r| r == name),
                default: op.defaults().get(name).cloned(),
                description,
                choices: choices_of(target),
            }
        })
        .collect()
}

/* ---- Argument Building ---- */

/// Coerce CLI strings into a JSON argument object using each parameter's declared type.
/// Unknown keys pass through as strings so the dispatcher can report them. Required
/// parameters are not checked here; the dispatcher owns that rule.
pub fn build_arguments(op: &OperationSpec, provided: &HashMap<String, String>) -> JsonObject {
    let types: HashMap<String, String> = describe_params(op)
        .into_iter()
        .map(|p| (p.name, p.ptype))
        .collect();
    let mut args = JsonObject::new();
    for (key, raw) in provided {
        let hint = types.get(key).map(String::as_str).unwrap_or("string");
        args.insert(key.clone(), coerce_value(raw, hint));
    }
    args
}

/// Best-effort primitive coercion; anything that does not parse stays a string.
pub fn coerce_value(raw: &str, type_hint: &str) -> Value {
    let fallback = || Value::String(raw.to_string());
    match type_hint {
        "integer" => raw
            .trim()
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .unwrap_or_else(|_| fallback()),
        "number" => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(fallback),
        "boolean" => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => Value::Bool(true),
            "false" | "0" | "no" | "n" => Value::Bool(false),
            _ => fallback(),
        },
        "array" => Value::Array(
            raw.split(',')
                .map(|s| Value::String(s.trim().to_string()))
                .collect(),
        ),
        _ => fallback(),
    }
}

/* ---- CLI Parameter Sources ---- */

pub fn parse_param(kv: &str) -> Result<(String, String)> {
    let Some((k, v)) = kv.split_once('=') else {
        bail!("invalid --param (expected KEY=VALUE): {kv}");
    };
    let key = k.trim();
    if key.is_empty() {
        bail!("invalid --param (empty key): {kv}");
    }
    Ok((key.to_string(), v.trim().to_string()))
}

/// Merge a JSON or YAML object file into `provided`; keys already present win.
pub fn load_param_file_into_map(path: &str, provided: &mut HashMap<String, String>) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read param file: {path}"))?;
    let lower = path.to_ascii_lowercase();

    let value: Value = if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&raw).context("failed to parse YAML param file")?;
        serde_json::to_value(yaml).context("failed to convert YAML to JSON")?
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON param file")?
    };

    let Value::Object(obj) = value else {
        bail!("param file root must be an object");
    };
    for (k, v) in obj {
        let s = match v {
            Value::String(s) => s,
            Value::Array(items) => items
                .iter()
                .map(|i| i.as_str().map(str::to_string).unwrap_or_else(|| i.to_string()))
                .collect::<Vec<_>>()
                .join(","),
            other => other.to_string(),
        };
        provided.entry(k).or_insert(s);
    }
    Ok(())
}

/* ---- Tests ---- */
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search_commits() -> OperationSpec {
        load_registry(ServerKind::GitHistory)
            .unwrap()
            .lookup("search_commits")
            .cloned()
            .unwrap()
    }

    #[test]
    fn coerce_primitives() {
        assert_eq!(coerce_value("42", "integer"), json!(42));
        assert_eq!(coerce_value("x42", "integer"), json!("x42"));
        assert_eq!(coerce_value("No", "boolean"), json!(false));
        assert_eq!(coerce_value("maybe", "boolean"), json!("maybe"));
        assert_eq!(coerce_value("a,b, c", "array"), json!(["a", "b", "c"]));
    }

    #[test]
    fn params_follow_schema_types() {
        let op = search_commits();
        let params = describe_params(&op);
        let limit = params.iter().find(|p| p.name == "limit").unwrap();
        assert_eq!(limit.ptype, "integer");
        assert_eq!(limit.default, Some(json!(10)));
        assert!(!limit.required);

        let mode = params.iter().find(|p| p.name == "mode").unwrap();
        assert_eq!(mode.ptype, "string");
        assert_eq!(mode.choices, ["message", "diff"]);

        let repo = params.iter().find(|p| p.name == "repoPath").unwrap();
        assert!(repo.required);
        assert!(repo.description.contains("git repository"));
    }

    #[test]
    fn build_arguments_coerces_known_keys() {
        let op = search_commits();
        let mut provided = HashMap::new();
        provided.insert("limit".to_string(), "3".to_string());
        provided.insert("query".to_string(), "42".to_string());
        provided.insert("extra".to_string(), "x".to_string());
        let args = build_arguments(&op, &provided);
        assert_eq!(args.get("limit"), Some(&json!(3)));
        assert_eq!(args.get("query"), Some(&json!("42")));
        assert_eq!(args.get("extra"), Some(&json!("x")));
    }

    #[test]
    fn case_insensitive_lookup() {
        let registry = load_registry(ServerKind::Searxng).unwrap();
        assert_eq!(
            find_operation(&registry, "SEARCH_NEWS").map(|op| op.name()),
            Some("search_news")
        );
        assert!(find_operation(&registry, "search_video").is_none());
    }

    #[test]
    fn parse_param_forms() {
        assert_eq!(
            parse_param("query = a=b").unwrap(),
            ("query".to_string(), "a=b".to_string())
        );
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }

    #[test]
    fn param_file_yaml_merge() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.yaml");
        std::fs::write(&path, "repoPath: /srv/repo\nlimit: 4\nquery: from-file\n").unwrap();
        let mut provided = HashMap::new();
        provided.insert("query".to_string(), "from-cli".to_string());
        load_param_file_into_map(path.to_str().unwrap(), &mut provided).unwrap();
        assert_eq!(provided["repoPath"], "/srv/repo");
        assert_eq!(provided["limit"], "4");
        assert_eq!(provided["query"], "from-cli");
    }

    #[test]
    fn param_file_must_be_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        let mut provided = HashMap::new();
        let err = load_param_file_into_map(path.to_str().unwrap(), &mut provided).unwrap_err();
        assert!(err.to_string().contains("must be an object"));
    }
}
