/*!
Dispatcher: one tool call from name + argument bag to a response envelope.

Received -> Validated -> Invoked -> Rendered -> Responded

Every short-circuit lands in `Responded` with `is_error = true`; nothing is raised
across this boundary. The dispatcher owns no mutable state, so one instance serves
any number of concurrent calls.
*/

use rmcp::model::JsonObject;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use super::invoker::{InvokeFailure, Invoker};
use super::model::ResponseEnvelope;
use super::registry::Registry;
use super::render::{RenderError, render};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Missing required argument(s) for '{op}': {}", .missing.join(", "))]
    MissingArguments { op: String, missing: Vec<String> },
    #[error("Invalid arguments for '{op}': {reason}")]
    InvalidArguments { op: String, reason: String },
    #[error("{label}: {source}")]
    External {
        label: &'static str,
        #[source]
        source: InvokeFailure,
    },
    #[error("{label}: unable to render result")]
    Render {
        label: &'static str,
        #[source]
        source: RenderError,
    },
}

pub struct Dispatcher<I> {
    registry: Arc<Registry>,
    invoker: I,
}

impl<I: Invoker> Dispatcher<I> {
    pub fn new(registry: Arc<Registry>, invoker: I) -> Self {
        Self { registry, invoker }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub async fn dispatch(&self, name: &str, arguments: Option<JsonObject>) -> ResponseEnvelope {
        tracing::debug!(tool = name, "dispatch");
        match self.try_dispatch(name, arguments).await {
            Ok(text) => ResponseEnvelope::success(text),
            Err(err) => {
                tracing::warn!(tool = name, error = %err, "call failed");
                ResponseEnvelope::error(err.to_string())
            }
        }
    }

    async fn try_dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<String, DispatchError> {
        let spec = self
            .registry
            .lookup(name)
            .ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;

        let args = drop_undefined(arguments.unwrap_or_default());
        let missing = spec.missing_required(&args);
        if !missing.is_empty() {
            return Err(DispatchError::MissingArguments {
                op: spec.name().to_string(),
                missing: missing.into_iter().map(str::to_string).collect(),
            });
        }

        let plan = spec
            .plan(args)
            .map_err(|e| DispatchError::InvalidArguments {
                op: spec.name().to_string(),
                reason: e.to_string(),
            })?;

        let label = spec.error_label();
        let mut payload = self
            .invoker
            .invoke(plan.request)
            .await
            .map_err(|source| DispatchError::External { label, source })?;

        if let Some(limit) = plan.limit {
            payload.truncate(limit);
        }
        render(plan.template, &plan.query, &payload)
            .map_err(|source| DispatchError::Render { label, source })
    }
}

/// Null and empty-string values count as "not supplied".
fn drop_undefined(mut args: JsonObject) -> JsonObject {
    args.retain(|_, v| match v {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    });
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::model::{CommandOutput, ExternalRequest, Payload, ResultRecord};
    use crate::relay::test_support::RecordingInvoker;
    use crate::servers::ServerKind;
    use serde_json::json;

    fn dispatcher(kind: ServerKind, invoker: RecordingInvoker) -> Dispatcher<RecordingInvoker> {
        Dispatcher::new(Arc::new(kind.registry().unwrap()), invoker)
    }

    fn args(value: Value) -> Option<JsonObject> {
        value.as_object().cloned()
    }

    fn records(n: usize) -> Payload {
        Payload::Records(
            (1..=n)
                .map(|i| ResultRecord::new(format!("r{i}"), format!("https://example.com/{i}")))
                .collect(),
        )
    }

    #[tokio::test]
    async fn unknown_tool_never_invokes() {
        let d = dispatcher(ServerKind::GitHistory, RecordingInvoker::returning(records(0)));
        let env = d.dispatch("rm_rf", args(json!({}))).await;
        assert!(env.is_error);
        assert_eq!(env.text, "Unknown tool: rm_rf");
        assert!(d.invoker.requests().is_empty());
    }

    #[tokio::test]
    async fn missing_required_names_fields_and_never_invokes() {
        let d = dispatcher(ServerKind::GitHistory, RecordingInvoker::returning(records(0)));
        let env = d.dispatch("search_commits", None).await;
        assert!(env.is_error);
        assert!(env.text.contains("repoPath"), "{}", env.text);
        assert!(env.text.contains("query"), "{}", env.text);
        assert!(d.invoker.requests().is_empty());
    }

    #[tokio::test]
    async fn every_operation_rejects_empty_arguments_without_invoking() {
        for kind in ServerKind::variants() {
            let d = dispatcher(*kind, RecordingInvoker::returning(records(0)));
            let names: Vec<&str> = d.registry().iter().map(|op| op.name()).collect();
            for name in names {
                for arguments in [None, args(json!({}))] {
                    let env = d.dispatch(name, arguments).await;
                    assert!(env.is_error, "{kind}/{name}: {}", env.text);
                    assert!(
                        env.text
                            .starts_with(&format!("Missing required argument(s) for '{name}': ")),
                        "{kind}/{name}: {}",
                        env.text
                    );
                }
            }
            assert!(d.invoker.requests().is_empty(), "{kind}");
        }
    }

    #[tokio::test]
    async fn null_and_empty_values_count_as_missing() {
        let d = dispatcher(ServerKind::Searxng, RecordingInvoker::returning(records(0)));
        let env = d.dispatch("search", args(json!({"query": ""}))).await;
        assert!(env.is_error);
        assert_eq!(env.text, "Missing required argument(s) for 'search': query");

        let env = d
            .dispatch("search", args(json!({"query": "x", "time_range": null})))
            .await;
        assert!(!env.is_error, "{}", env.text);
    }

    #[tokio::test]
    async fn type_errors_are_invalid_arguments() {
        let d = dispatcher(ServerKind::GitHistory, RecordingInvoker::returning(records(0)));
        let env = d
            .dispatch(
                "search_commits",
                args(json!({"repoPath": "/r", "query": "x", "limit": "many"})),
            )
            .await;
        assert!(env.is_error);
        assert!(env.text.starts_with("Invalid arguments for 'search_commits':"), "{}", env.text);
        assert!(d.invoker.requests().is_empty());
    }

    #[tokio::test]
    async fn external_failure_is_labelled() {
        let d = dispatcher(
            ServerKind::GitHistory,
            RecordingInvoker::failing("fatal: not a git repository"),
        );
        let env = d
            .dispatch("search_commits", args(json!({"repoPath": "/tmp", "query": "x"})))
            .await;
        assert!(env.is_error);
        assert_eq!(env.text, "Git Error: fatal: not a git repository");
    }

    #[tokio::test]
    async fn results_truncated_to_max_results_in_order() {
        let d = dispatcher(ServerKind::Searxng, RecordingInvoker::returning(records(3)));
        let env = d
            .dispatch("search", args(json!({"query": "q", "max_results": 2})))
            .await;
        assert!(!env.is_error);
        assert!(env.text.contains("### 1. r1"));
        assert!(env.text.contains("### 2. r2"));
        assert!(!env.text.contains("### 3."));
        assert!(env.text.find("r1").unwrap() < env.text.find("r2").unwrap());
    }

    #[tokio::test]
    async fn empty_results_echo_query() {
        let d = dispatcher(ServerKind::Searxng, RecordingInvoker::returning(records(0)));
        let env = d
            .dispatch("search_news", args(json!({"query": "rust 2024"})))
            .await;
        assert!(!env.is_error);
        assert_eq!(env.text, "No news results found for: \"rust 2024\"");
    }

    #[tokio::test]
    async fn commit_output_is_rendered() {
        let d = dispatcher(
            ServerKind::GitHistory,
            RecordingInvoker::returning(Payload::Output(CommandOutput {
                stdout: "abc123|2024-01-02 10:00:00 +0000|fix foo".into(),
                stderr: String::new(),
            })),
        );
        let env = d
            .dispatch(
                "search_commits",
                args(json!({"repoPath": "/repo", "query": "foo", "limit": 5})),
            )
            .await;
        assert!(!env.is_error);
        assert!(env.text.contains("1. abc123|2024-01-02 10:00:00 +0000|fix foo"));

        let requests = d.invoker.requests();
        let [ExternalRequest::Command(cmd)] = requests.as_slice() else {
            panic!("expected one command request, got {requests:?}");
        };
        assert_eq!(cmd.program, "git");
        assert_eq!(&cmd.args[..4], ["log", "--grep=foo", "-n", "5"]);
    }

    #[tokio::test]
    async fn mismatched_payload_is_a_render_error() {
        let d = dispatcher(ServerKind::Scip, RecordingInvoker::returning(records(1)));
        let env = d
            .dispatch("index_python", args(json!({"projectPath": "/p"})))
            .await;
        assert!(env.is_error);
        assert_eq!(env.text, "Error indexing Python: unable to render result");
    }
}
