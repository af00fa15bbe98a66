/*!
`list.rs`

Implements `mcp-relay list <profile>`: the operations a profile would expose over
`tools/list`, without starting a server.

JSON Output Shape:
{
  "status": "ok",
  "profile": "git-history",
  "server": "mcp-git-history",
  "count": 2,
  "tools": [
    { "name": "search_commits", "description": "...", "required": ["repoPath","query"] }
  ]
}
*/

use anyhow::Result;
use clap::Args;

use crate::cmd::format::{Role, StyleOptions, color, header, table};
use crate::cmd::shared::{describe_params, load_registry};
use crate::relay::Registry;
use crate::servers::ServerKind;
use crate::utils::truncate_chars;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Server profile to list
    pub profile: ServerKind,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

pub fn execute_list(args: ListArgs) -> Result<()> {
    let registry = load_registry(args.profile)?;
    if args.json {
        println!("{}", list_json(args.profile, &registry));
        return Ok(());
    }

    let style = StyleOptions::detect();
    println!(
        "{}",
        header(
            &format!("Tools ({})", registry.len()),
            Some(&format!(
                "profile={} • server={}",
                args.profile,
                args.profile.server_name()
            )),
            &style,
        )
    );
    println!("{}", table(&["#", "NAME", "PARAMS", "DESCRIPTION"], &rows(&registry), &style));
    println!(
        "\n{}",
        color(
            Role::Dim,
            format!("Use `mcp-relay get {} <name>` for parameter details", args.profile),
            &style
        )
    );
    Ok(())
}

fn list_json(kind: ServerKind, registry: &Registry) -> serde_json::Value {
    let tools: Vec<serde_json::Value> = registry
        .iter()
        .map(|op| {
            serde_json::json!({
                "name": op.name(),
                "description": op.description(),
                "required": op.required(),
            })
        })
        .collect();
    serde_json::json!({
        "status": "ok",
        "profile": kind.to_string(),
        "server": kind.server_name(),
        "count": tools.len(),
        "tools": tools,
    })
}

/// `#`, name, `p:type` summary (required marked with `*`), description.
fn rows(registry: &Registry) -> Vec<Vec<String>> {
    registry
        .iter()
        .enumerate()
        .map(|(idx, op)| {
            let params = describe_params(op)
                .iter()
                .map(|p| {
                    let star = if p.required { "*" } else { "" };
                    format!("{}{star}:{}", p.name, p.ptype)
                })
                .collect::<Vec<_>>();
            let params = if params.is_empty() {
                "-".to_string()
            } else {
                params.join(", ")
            };
            vec![
                (idx + 1).to_string(),
                op.name().to_string(),
                params,
                truncate_chars(&op.description().replace('\n', " "), 90),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        cmd: TestSub,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestSub {
        List(ListArgs),
    }

    #[test]
    fn clap_parses_profile() {
        let cli = TestCli::try_parse_from(["t", "list", "git-history", "--json"]).unwrap();
        let TestSub::List(args) = cli.cmd;
        assert_eq!(args.profile, ServerKind::GitHistory);
        assert!(args.json);
        assert!(TestCli::try_parse_from(["t", "list", "ftp"]).is_err());
    }

    #[test]
    fn json_lists_every_operation() {
        let registry = load_registry(ServerKind::Scip).unwrap();
        let out = list_json(ServerKind::Scip, &registry);
        assert_eq!(out["count"], 2);
        assert_eq!(out["server"], "mcp-scip");
        assert_eq!(out["tools"][1]["name"], "index_python");
        assert_eq!(out["tools"][1]["required"], serde_json::json!(["projectPath"]));
    }

    #[test]
    fn rows_mark_required_params() {
        let registry = load_registry(ServerKind::Scip).unwrap();
        let rows = rows(&registry);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1], "index_typescript");
        assert!(rows[0][2].contains("projectPath*:string"), "{}", rows[0][2]);
        assert!(rows[1][2].contains("projectName:string"), "{}", rows[1][2]);
    }
}
