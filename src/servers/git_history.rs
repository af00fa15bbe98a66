//! `git-history` profile: commit search and per-file history over `git log`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::non_zero_or;
use crate::relay::{
    ArgumentError, CommandRequest, ExternalRequest, Operation, Plan, Registry, RegistryError,
    TemplateKind,
};

pub const ERROR_LABEL: &str = "Git Error";

/// One commit per line: short hash, ISO author date, subject.
const PRETTY: &str = "--pretty=format:%h|%ad|%s";

const DEFAULT_COMMIT_LIMIT: u32 = 10;
const DEFAULT_HISTORY_LIMIT: u32 = 5;

pub fn registry() -> Result<Registry, RegistryError> {
    Registry::new()
        .with::<SearchCommits>()?
        .with::<GetFileHistory>()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Match commit messages (`git log --grep`)
    #[default]
    Message,
    /// Match added/removed content (`git log -S`, pickaxe)
    Diff,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchCommitsArgs {
    #[schemars(description = "Absolute path to the git repository")]
    pub repo_path: String,

    #[schemars(description = "Term to search for (uses git log --grep or -S)")]
    pub query: String,

    #[schemars(description = "'message' (search commit msg) or 'diff' (search changed content)")]
    #[serde(default)]
    pub mode: SearchMode,

    #[schemars(description = "Max number of commits to return")]
    #[serde(default = "default_commit_limit")]
    pub limit: u32,
}

fn default_commit_limit() -> u32 {
    DEFAULT_COMMIT_LIMIT
}

pub struct SearchCommits;

impl Operation for SearchCommits {
    type Args = SearchCommitsArgs;
    const NAME: &'static str = "search_commits";
    const DESCRIPTION: &'static str = "Search git commit messages and content for specific terms";
    const ERROR_LABEL: &'static str = ERROR_LABEL;

    fn plan(args: SearchCommitsArgs) -> Result<Plan, ArgumentError> {
        let limit = non_zero_or(args.limit, DEFAULT_COMMIT_LIMIT);
        let filter = match args.mode {
            SearchMode::Message => format!("--grep={}", args.query),
            SearchMode::Diff => format!("-S{}", args.query),
        };
        let cmd = CommandRequest::new("git")
            .arg("log")
            .arg(filter)
            .arg("-n")
            .arg(limit.to_string())
            .arg(PRETTY)
            .arg("--date=iso")
            .current_dir(args.repo_path);

        Ok(Plan {
            request: ExternalRequest::Command(cmd),
            limit: Some(limit as usize),
            template: TemplateKind::CommitSearch,
            query: args.query,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileHistoryArgs {
    #[schemars(description = "Absolute path to the git repository")]
    pub repo_path: String,

    #[schemars(description = "Relative path to file")]
    pub file_path: String,

    #[schemars(description = "Max number of commits to return")]
    #[serde(default = "default_history_limit")]
    pub limit: u32,
}

fn default_history_limit() -> u32 {
    DEFAULT_HISTORY_LIMIT
}

pub struct GetFileHistory;

impl Operation for GetFileHistory {
    type Args = FileHistoryArgs;
    const NAME: &'static str = "get_file_history";
    const DESCRIPTION: &'static str = "Get evolution of a specific file";
    const ERROR_LABEL: &'static str = ERROR_LABEL;

    fn plan(args: FileHistoryArgs) -> Result<Plan, ArgumentError> {
        let limit = non_zero_or(args.limit, DEFAULT_HISTORY_LIMIT);
        // `--` keeps a path that looks like an option or revision from being parsed as one.
        let cmd = CommandRequest::new("git")
            .arg("log")
            .arg("-n")
            .arg(limit.to_string())
            .arg(PRETTY)
            .arg("--date=iso")
            .arg("--")
            .arg(args.file_path.clone())
            .current_dir(args.repo_path);

        Ok(Plan {
            request: ExternalRequest::Command(cmd),
            limit: Some(limit as usize),
            template: TemplateKind::FileHistory,
            query: args.file_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn command_of(plan: &Plan) -> &CommandRequest {
        match &plan.request {
            ExternalRequest::Command(cmd) => cmd,
            other => panic!("expected command, got {other:?}"),
        }
    }

    fn plan_for(name: &str, args: serde_json::Value) -> Plan {
        let registry = registry().unwrap();
        let spec = registry.lookup(name).unwrap();
        spec.plan(args.as_object().cloned().unwrap()).unwrap()
    }

    #[test]
    fn message_mode_argv_is_exact() {
        let plan = plan_for(
            "search_commits",
            json!({"repoPath": "/r", "query": "foo", "mode": "message", "limit": 5}),
        );
        let cmd = command_of(&plan);
        assert_eq!(cmd.program, "git");
        assert_eq!(
            cmd.args,
            [
                "log",
                "--grep=foo",
                "-n",
                "5",
                "--pretty=format:%h|%ad|%s",
                "--date=iso"
            ]
        );
        assert_eq!(cmd.working_dir, Some(PathBuf::from("/r")));
        assert_eq!(plan.template, TemplateKind::CommitSearch);
    }

    #[test]
    fn diff_mode_uses_pickaxe() {
        let plan = plan_for(
            "search_commits",
            json!({"repoPath": "/r", "query": "fn main", "mode": "diff"}),
        );
        let cmd = command_of(&plan);
        assert_eq!(cmd.args[1], "-Sfn main");
        assert_eq!(cmd.args[3], "10");
    }

    #[test]
    fn query_with_shell_metacharacters_stays_one_argument() {
        let plan = plan_for(
            "search_commits",
            json!({"repoPath": "/r", "query": "\"; rm -rf / #"}),
        );
        assert_eq!(command_of(&plan).args[1], "--grep=\"; rm -rf / #");
    }

    #[test]
    fn zero_limit_falls_back_to_default() {
        let plan = plan_for(
            "search_commits",
            json!({"repoPath": "/r", "query": "x", "limit": 0}),
        );
        assert_eq!(command_of(&plan).args[3], "10");
        assert_eq!(plan.limit, Some(10));
    }

    #[test]
    fn file_history_argv_ends_with_path() {
        let plan = plan_for(
            "get_file_history",
            json!({"repoPath": "/r", "filePath": "src/lib.rs"}),
        );
        let cmd = command_of(&plan);
        assert_eq!(
            cmd.args,
            [
                "log",
                "-n",
                "5",
                "--pretty=format:%h|%ad|%s",
                "--date=iso",
                "--",
                "src/lib.rs"
            ]
        );
        assert_eq!(plan.query, "src/lib.rs");
    }

    #[test]
    fn schema_advertises_required_and_defaults() {
        let registry = registry().unwrap();
        let spec = registry.lookup("search_commits").unwrap();
        let mut required = spec.required().to_vec();
        required.sort();
        assert_eq!(required, ["query", "repoPath"]);
        assert_eq!(spec.defaults().get("mode"), Some(&json!("message")));
        assert_eq!(spec.defaults().get("limit"), Some(&json!(10)));

        let spec = registry.lookup("get_file_history").unwrap();
        assert_eq!(spec.defaults().get("limit"), Some(&json!(5)));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let registry = registry().unwrap();
        let spec = registry.lookup("search_commits").unwrap();
        let args = json!({"repoPath": "/r", "query": "x", "mode": "blame"});
        assert!(spec.plan(args.as_object().cloned().unwrap()).is_err());
    }
}
