//! Value types flowing through a single tool call.
//!
//! ExternalRequest -> (invoker) -> Payload | InvokeFailure -> (renderer) -> ResponseEnvelope
//!
//! Nothing here is shared between calls; every value is built, consumed once and dropped.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// One external action, built fresh by an operation's plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalRequest {
    Command(CommandRequest),
    HttpGet(HttpGetRequest),
}

/// Subprocess invocation as a discrete argument vector (never a shell string).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl CommandRequest {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Shell-quoted rendering, for diagnostics only.
    pub fn display_line(&self) -> String {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(self.program.as_str());
        words.extend(self.args.iter().map(String::as_str));
        shell_words::join(words)
    }
}

/// GET against the configured search endpoint. The base URL is owned by the invoker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpGetRequest {
    pub path: &'static str,
    pub query: Vec<(&'static str, String)>,
}

impl HttpGetRequest {
    pub fn new(path: &'static str) -> Self {
        Self {
            path,
            query: Vec::new(),
        }
    }

    /// Add a parameter; empty values are skipped.
    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.query.push((key, value));
        }
        self
    }

    pub fn param_opt(self, key: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    /// First value recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Captured text of a finished subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Normalized success payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Output(CommandOutput),
    Records(Vec<ResultRecord>),
}

impl Payload {
    /// Keep at most `limit` records (or stdout lines). Order is untouched.
    pub fn truncate(&mut self, limit: usize) {
        match self {
            Payload::Records(records) => records.truncate(limit),
            Payload::Output(out) => {
                if out.stdout.lines().count() > limit {
                    let kept: Vec<&str> = out.stdout.lines().take(limit).collect();
                    out.stdout = kept.join("\n");
                }
            }
        }
    }
}

/// One search hit. `url` is always present; hits without one never get this far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultRecord {
    pub title: Option<String>,
    pub url: String,
    pub content: Option<String>,
    pub engine: Option<String>,
    pub published_date: Option<String>,
    pub img_src: Option<String>,
    pub source: Option<String>,
}

impl ResultRecord {
    #[cfg(test)]
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            url: url.into(),
            ..Default::default()
        }
    }
}

/// One entry of SearXNG's `format=json` `results` array, decoded leniently.
#[derive(Debug, Default, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    engine: Option<String>,
    #[serde(default, rename = "publishedDate")]
    published_date: Option<String>,
    #[serde(default)]
    img_src: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

impl RawRecord {
    /// `None` when the hit has no usable URL.
    pub fn into_record(self) -> Option<ResultRecord> {
        let url = self.url.filter(|u| !u.trim().is_empty())?;
        Some(ResultRecord {
            title: self.title,
            url,
            content: self.content,
            engine: self.engine,
            published_date: self.published_date,
            img_src: self.img_src,
            source: self.source,
        })
    }
}

/// What goes back to the caller for every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    pub text: String,
    pub is_error: bool,
}

impl ResponseEnvelope {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

impl fmt::Display for ResponseEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_params_skip_empty_values() {
        let req = HttpGetRequest::new("/search")
            .param("q", "rust")
            .param("time_range", "")
            .param_opt("language", None::<String>)
            .param_opt("pageno", Some("2"));
        assert_eq!(
            req.query,
            vec![("q", "rust".to_string()), ("pageno", "2".to_string())]
        );
        assert_eq!(req.get("time_range"), None);
    }

    #[test]
    fn display_line_quotes_arguments() {
        let req = CommandRequest::new("git").arg("log").arg("--grep=two words");
        assert_eq!(req.display_line(), "git log '--grep=two words'");
    }

    #[test]
    fn truncate_output_keeps_leading_lines() {
        let mut payload = Payload::Output(CommandOutput {
            stdout: "a\nb\nc".into(),
            stderr: String::new(),
        });
        payload.truncate(2);
        match payload {
            Payload::Output(out) => assert_eq!(out.stdout, "a\nb"),
            _ => panic!("expected output payload"),
        }
    }

    #[test]
    fn record_parses_searxng_shape() {
        let raw: RawRecord = serde_json::from_str(
            r#"{"title":"T","url":"https://x","publishedDate":null,"img_src":"https://i","score":1.5}"#,
        )
        .unwrap();
        let rec = raw.into_record().unwrap();
        assert_eq!(rec.title.as_deref(), Some("T"));
        assert_eq!(rec.published_date, None);
        assert_eq!(rec.img_src.as_deref(), Some("https://i"));
    }

    #[test]
    fn record_without_url_is_dropped() {
        for body in [r#"{"title":"a"}"#, r#"{"title":"a","url":null}"#, r#"{"url":" "}"#] {
            let raw: RawRecord = serde_json::from_str(body).unwrap();
            assert_eq!(raw.into_record(), None, "{body}");
        }
    }
}
