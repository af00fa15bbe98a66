//! `scip` profile: run a SCIP indexer against a project directory.
//!
//! The index is always written to `<projectPath>/index.scip`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::relay::{
    ArgumentError, CommandRequest, ExternalRequest, Operation, Plan, Registry, RegistryError,
    TemplateKind,
};

const INDEX_FILE: &str = "index.scip";
const DEFAULT_PROJECT_NAME: &str = "my-project";

pub fn registry() -> Result<Registry, RegistryError> {
    Registry::new()
        .with::<IndexTypescript>()?
        .with::<IndexPython>()
}

fn index_output(project_path: &str) -> String {
    Path::new(project_path)
        .join(INDEX_FILE)
        .to_string_lossy()
        .into_owned()
}

fn indexed(cmd: CommandRequest, project_path: String) -> Plan {
    Plan {
        request: ExternalRequest::Command(cmd),
        limit: None,
        template: TemplateKind::ScipIndex,
        query: project_path,
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TypescriptArgs {
    #[schemars(description = "Absolute path to the project root (containing package.json)")]
    pub project_path: String,
}

pub struct IndexTypescript;

impl Operation for IndexTypescript {
    type Args = TypescriptArgs;
    const NAME: &'static str = "index_typescript";
    const DESCRIPTION: &'static str = "Generate SCIP index for a TypeScript/JavaScript project";
    const ERROR_LABEL: &'static str = "Error indexing TypeScript";

    fn plan(args: TypescriptArgs) -> Result<Plan, ArgumentError> {
        let cmd = CommandRequest::new("scip-typescript")
            .arg("index")
            .arg("--cwd")
            .arg(args.project_path.clone())
            .arg("--output")
            .arg(index_output(&args.project_path));
        Ok(indexed(cmd, args.project_path))
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PythonArgs {
    #[schemars(description = "Absolute path to the project root")]
    pub project_path: String,

    #[schemars(description = "Project name recorded in the index")]
    #[serde(default = "default_project_name")]
    pub project_name: String,
}

fn default_project_name() -> String {
    DEFAULT_PROJECT_NAME.to_string()
}

pub struct IndexPython;

impl Operation for IndexPython {
    type Args = PythonArgs;
    const NAME: &'static str = "index_python";
    const DESCRIPTION: &'static str = "Generate SCIP index for a Python project";
    const ERROR_LABEL: &'static str = "Error indexing Python";

    fn plan(args: PythonArgs) -> Result<Plan, ArgumentError> {
        let cmd = CommandRequest::new("scip-python")
            .arg("index")
            .arg("--project-name")
            .arg(args.project_name)
            .arg("--output")
            .arg(index_output(&args.project_path))
            .arg(args.project_path.clone());
        Ok(indexed(cmd, args.project_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn argv(name: &str, args: serde_json::Value) -> (String, Vec<String>) {
        let registry = registry().unwrap();
        let plan = registry
            .lookup(name)
            .unwrap()
            .plan(args.as_object().cloned().unwrap())
            .unwrap();
        match plan.request {
            ExternalRequest::Command(cmd) => (cmd.program, cmd.args),
            other => panic!("expected command, got {other:?}"),
        }
    }

    #[test]
    fn typescript_argv() {
        let (program, args) = argv("index_typescript", json!({"projectPath": "/w/app"}));
        assert_eq!(program, "scip-typescript");
        assert_eq!(
            args,
            ["index", "--cwd", "/w/app", "--output", "/w/app/index.scip"]
        );
    }

    #[test]
    fn python_argv_defaults_project_name() {
        let (program, args) = argv("index_python", json!({"projectPath": "/w/py"}));
        assert_eq!(program, "scip-python");
        assert_eq!(
            args,
            [
                "index",
                "--project-name",
                "my-project",
                "--output",
                "/w/py/index.scip",
                "/w/py"
            ]
        );
    }

    #[test]
    fn python_project_name_is_configurable() {
        let (_, args) = argv(
            "index_python",
            json!({"projectPath": "/w/py", "projectName": "billing"}),
        );
        assert_eq!(args[2], "billing");
    }

    #[test]
    fn trailing_slash_does_not_double() {
        let (_, args) = argv("index_typescript", json!({"projectPath": "/w/app/"}));
        assert_eq!(args[4], "/w/app/index.scip");
    }
}
