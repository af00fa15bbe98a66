/*!
`call.rs`

Implements `mcp-relay call <profile> <OPERATION>`: run one operation through the
same dispatcher the MCP server uses and print the response envelope.

Parameters:
  --param KEY=VALUE                (repeatable)
  --param-file params.(json|yaml)  (merged; --param overrides file entries)

Values are coerced using the parameter's schema type (integer / number /
boolean / array / string). Required-argument and type checks are left to the
dispatcher so the CLI reports exactly what an MCP client would see.

Exit status is non-zero when the envelope is an error.

JSON Output:
{
  "status": "ok" | "error",
  "profile": "git-history",
  "tool": "search_commits",
  "elapsed_ms": 42,
  "arguments": { ... },
  "text": "..."
}
*/

use anyhow::{Result, bail};
use clap::Args;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::cmd::format::{Role, StyleOptions, color, header, table};
use crate::cmd::shared::{
    build_arguments, coerce_value, find_operation, load_param_file_into_map, load_registry,
    parse_param, runtime,
};
use crate::config::RelayConfig;
use crate::relay::{Dispatcher, ExternalInvoker, ResponseEnvelope};
use crate::servers::ServerKind;

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Server profile
    pub profile: ServerKind,

    /// Operation to invoke
    #[arg(value_name = "OPERATION")]
    pub tool: String,

    /// Provide parameter (KEY=VALUE), repeatable
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Load parameters from file (JSON or YAML). --param overrides file entries
    #[arg(long = "param-file", value_name = "PATH")]
    pub param_file: Option<String>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute_call(args: CallArgs, config: &RelayConfig) -> Result<()> {
    let mut provided: HashMap<String, String> = HashMap::new();
    for kv in &args.params {
        let (k, v) = parse_param(kv)?;
        provided.insert(k, v);
    }
    if let Some(path) = &args.param_file {
        load_param_file_into_map(path, &mut provided)?;
    }

    let registry = load_registry(args.profile)?;
    // Unknown names still go through the dispatcher so the error text matches the server's.
    let (name, arguments) = match find_operation(&registry, args.tool.trim()) {
        Some(op) => (op.name().to_string(), build_arguments(op, &provided)),
        None => (
            args.tool.trim().to_string(),
            provided
                .iter()
                .map(|(k, v)| (k.clone(), coerce_value(v, "string")))
                .collect(),
        ),
    };

    let dispatcher = Dispatcher::new(Arc::new(registry), ExternalInvoker::from_config(config)?);
    let started = Instant::now();
    let envelope = runtime()?.block_on(dispatcher.dispatch(&name, Some(arguments.clone())));
    let elapsed_ms = started.elapsed().as_millis();

    if args.json {
        let out = json!({
            "status": if envelope.is_error { "error" } else { "ok" },
            "profile": args.profile.to_string(),
            "tool": name,
            "elapsed_ms": elapsed_ms,
            "arguments": arguments,
            "text": envelope.text,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
        );
    } else {
        print_human(&name, &arguments, &envelope, elapsed_ms);
    }

    if envelope.is_error {
        bail!("'{name}' returned an error");
    }
    Ok(())
}

fn print_human(
    name: &str,
    arguments: &rmcp::model::JsonObject,
    envelope: &ResponseEnvelope,
    elapsed_ms: u128,
) {
    let style = StyleOptions::detect();
    let (mark, role) = if envelope.is_error {
        ("✖ error", Role::Error)
    } else {
        ("✔ ok", Role::Success)
    };
    println!(
        "{}",
        header(name, Some(&format!("{elapsed_ms} ms")), &style)
    );
    println!("{}", color(role, mark, &style));

    if !arguments.is_empty() {
        let mut rows: Vec<Vec<String>> = arguments
            .iter()
            .map(|(k, v)| {
                let shown = match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                vec![k.clone(), shown]
            })
            .collect();
        rows.sort_by(|a, b| a[0].cmp(&b[0]));
        println!("{}", table(&["ARGUMENT", "VALUE"], &rows, &style));
        println!();
    }

    if envelope.is_error {
        println!("{}", color(Role::Error, &envelope.text, &style));
    } else {
        println!("{}", envelope.text);
    }
}
