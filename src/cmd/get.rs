/*!
`get.rs`

Implements `mcp-relay get <profile> [NAME]`: parameter-level detail for every
operation of a profile, or for a single one.

Human output: one framed header per operation, then a parameter table
(NAME | TYPE | REQ | DEFAULT | DESCRIPTION). Enum choices are appended to the
description.

JSON Output Shape:
{
  "status":"ok",
  "profile":"searxng",
  "count": 1,
  "tools":[
    {
      "name":"search_news",
      "description":"...",
      "parameters":[
        {"name":"query","type":"string","required":true,"default":null,"description":"...","choices":[]}
      ],
      "input_schema": { <raw schema> }
    }
  ]
}
*/

use anyhow::{Result, bail};
use clap::Args;
use serde_json::{Value, json};

use crate::cmd::format::{Role, StyleOptions, color, header, table};
use crate::cmd::shared::{ParamInfo, describe_params, find_operation, load_registry};
use crate::relay::OperationSpec;
use crate::servers::ServerKind;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Server profile
    pub profile: ServerKind,

    /// Operation name (case-insensitive); all operations when omitted
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

pub fn execute_get(args: GetArgs) -> Result<()> {
    let registry = load_registry(args.profile)?;

    let selected: Vec<&OperationSpec> = match args.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => match find_operation(&registry, name) {
            Some(op) => vec![op],
            None => {
                let known: Vec<&str> = registry.iter().map(|op| op.name()).collect();
                bail!(
                    "tool '{name}' not found in profile '{}' (available: {})",
                    args.profile,
                    known.join(", ")
                );
            }
        },
        _ => registry.iter().collect(),
    };

    if args.json {
        let tools: Vec<Value> = selected.iter().map(|op| tool_json(op)).collect();
        let out = json!({
            "status": "ok",
            "profile": args.profile.to_string(),
            "count": tools.len(),
            "tools": tools,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    for (idx, op) in selected.iter().enumerate() {
        if idx > 0 {
            println!();
        }
        print_tool(op, &style);
    }
    Ok(())
}

fn param_json(p: &ParamInfo) -> Value {
    json!({
        "name": p.name,
        "type": p.ptype,
        "required": p.required,
        "default": p.default,
        "description": p.description,
        "choices": p.choices,
    })
}

fn tool_json(op: &OperationSpec) -> Value {
    let params: Vec<Value> = describe_params(op).iter().map(param_json).collect();
    json!({
        "name": op.name(),
        "description": op.description(),
        "error_label": op.error_label(),
        "parameters": params,
        "input_schema": Value::Object(op.input_schema().as_ref().clone()),
    })
}

fn param_rows(params: &[ParamInfo]) -> Vec<Vec<String>> {
    let mut params: Vec<&ParamInfo> = params.iter().collect();
    // Required first, then alphabetical.
    params.sort_by(|a, b| b.required.cmp(&a.required).then_with(|| a.name.cmp(&b.name)));
    params
        .into_iter()
        .map(|p| {
            let default = match &p.default {
                Some(Value::String(s)) => format!("\"{s}\""),
                Some(other) => other.to_string(),
                None => "-".to_string(),
            };
            let mut description = p.description.clone();
            if !p.choices.is_empty() {
                if !description.is_empty() {
                    description.push(' ');
                }
                description.push_str(&format!("[{}]", p.choices.join("|")));
            }
            vec![
                p.name.clone(),
                p.ptype.clone(),
                if p.required { "yes".into() } else { "no".into() },
                default,
                description,
            ]
        })
        .collect()
}

fn print_tool(op: &OperationSpec, style: &StyleOptions) {
    println!("{}", header(op.name(), Some(op.description()), style));
    let params = describe_params(op);
    if params.is_empty() {
        println!("{}", color(Role::Dim, "(no parameters)", style));
        return;
    }
    println!(
        "{}",
        table(
            &["NAME", "TYPE", "REQ", "DEFAULT", "DESCRIPTION"],
            &param_rows(&params),
            style
        )
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(kind: ServerKind, name: &str) -> OperationSpec {
        load_registry(kind).unwrap().lookup(name).cloned().unwrap()
    }

    #[test]
    fn required_params_sort_first() {
        let op = op(ServerKind::GitHistory, "search_commits");
        let rows = param_rows(&describe_params(&op));
        let names: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(names, ["query", "repoPath", "limit", "mode"]);
        assert_eq!(rows[2][3], "10");
        assert_eq!(rows[3][3], "\"message\"");
        assert!(rows[3][4].ends_with("[message|diff]"), "{}", rows[3][4]);
    }

    #[test]
    fn tool_json_includes_schema_and_label() {
        let op = op(ServerKind::Searxng, "search_news");
        let out = tool_json(&op);
        assert_eq!(out["error_label"], "Error executing search");
        assert_eq!(out["input_schema"]["type"], "object");
        let range = out["parameters"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["name"] == "time_range")
            .unwrap();
        assert_eq!(range["default"], "week");
    }
}
