//! Result rendering: payload + original query -> markdown-ish text.
//!
//! Pure functions, no I/O. Record order is preserved exactly as received;
//! truncation already happened in the dispatcher.

use std::fmt::Write as _;
use thiserror::Error;

use super::model::{CommandOutput, Payload, ResultRecord};

/// Which text template a plan wants for its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    WebSearch,
    Images,
    News,
    Code,
    StackOverflow,
    Docs,
    Packages,
    GitHub(GitHubScope),
    CommitSearch,
    FileHistory,
    ScipIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubScope {
    Repos,
    Code,
}

impl GitHubScope {
    fn as_str(self) -> &'static str {
        match self {
            GitHubScope::Repos => "repos",
            GitHubScope::Code => "code",
        }
    }
}

impl TemplateKind {
    /// All record-shaped templates (search results).
    pub const RECORD_KINDS: [TemplateKind; 9] = [
        TemplateKind::WebSearch,
        TemplateKind::Images,
        TemplateKind::News,
        TemplateKind::Code,
        TemplateKind::StackOverflow,
        TemplateKind::Docs,
        TemplateKind::Packages,
        TemplateKind::GitHub(GitHubScope::Repos),
        TemplateKind::GitHub(GitHubScope::Code),
    ];

    pub fn name(self) -> &'static str {
        match self {
            TemplateKind::WebSearch => "web search",
            TemplateKind::Images => "images",
            TemplateKind::News => "news",
            TemplateKind::Code => "code",
            TemplateKind::StackOverflow => "stack overflow",
            TemplateKind::Docs => "docs",
            TemplateKind::Packages => "packages",
            TemplateKind::GitHub(_) => "github",
            TemplateKind::CommitSearch => "commit search",
            TemplateKind::FileHistory => "file history",
            TemplateKind::ScipIndex => "scip index",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("{template} template cannot render {got}")]
    PayloadMismatch {
        template: &'static str,
        got: &'static str,
    },
}

pub fn render(template: TemplateKind, query: &str, payload: &Payload) -> Result<String, RenderError> {
    let mismatch = |got| RenderError::PayloadMismatch {
        template: template.name(),
        got,
    };
    match payload {
        Payload::Records(records) => record_layout(template)
            .map(|layout| render_records(&layout, query, records))
            .ok_or_else(|| mismatch("search records")),
        Payload::Output(output) => {
            render_output(template, query, output).ok_or_else(|| mismatch("command output"))
        }
    }
}

/* ---- Search records ---- */

/// Wording and optional fields of one record template, beyond title + URL.
#[derive(Default)]
struct Layout {
    empty: String,
    heading: String,
    content: bool,
    engine: bool,
    published: bool,
    registry: bool,
    image: bool,
}

fn record_layout(template: TemplateKind) -> Option<Layout> {
    let words = |empty: &str, heading: &str| Layout {
        empty: empty.to_string(),
        heading: heading.to_string(),
        ..Default::default()
    };
    let layout = match template {
        TemplateKind::WebSearch => Layout {
            content: true,
            engine: true,
            ..words("No results found for", "Search Results")
        },
        TemplateKind::Images => Layout {
            image: true,
            ..words("No image results found for", "Image Results")
        },
        TemplateKind::News => Layout {
            content: true,
            engine: true,
            published: true,
            ..words("No news results found for", "News Results")
        },
        TemplateKind::Code => Layout {
            content: true,
            engine: true,
            ..words("No code/IT results found for", "Code & IT Results")
        },
        TemplateKind::StackOverflow => Layout {
            content: true,
            ..words("No Stack Overflow results found for", "Stack Overflow Results")
        },
        TemplateKind::Docs => Layout {
            content: true,
            engine: true,
            ..words("No documentation found for", "Documentation Results")
        },
        TemplateKind::Packages => Layout {
            content: true,
            registry: true,
            ..words("No packages found for", "Package Results")
        },
        TemplateKind::GitHub(scope) => Layout {
            content: true,
            ..words(
                &format!("No GitHub {} found for", scope.as_str()),
                match scope {
                    GitHubScope::Repos => "GitHub Repository Results",
                    GitHubScope::Code => "GitHub Code Results",
                },
            )
        },
        TemplateKind::CommitSearch | TemplateKind::FileHistory | TemplateKind::ScipIndex => {
            return None;
        }
    };
    Some(layout)
}

fn render_records(layout: &Layout, query: &str, records: &[ResultRecord]) -> String {
    if records.is_empty() {
        return format!("{}: \"{query}\"", layout.empty);
    }

    let mut out = format!("## {} for: \"{query}\"\n\n", layout.heading);
    for (idx, rec) in records.iter().enumerate() {
        let _ = writeln!(
            out,
            "### {}. {}",
            idx + 1,
            rec.title.as_deref().filter(|t| !t.is_empty()).unwrap_or("No title")
        );
        if layout.image {
            let image = rec.img_src.as_deref().filter(|s| !s.is_empty()).unwrap_or(&rec.url);
            let _ = writeln!(out, "**Image URL:** {image}");
            let _ = writeln!(out, "**Page URL:** {}", rec.url);
            if let Some(source) = present(&rec.source) {
                let _ = writeln!(out, "*Source: {source}*");
            }
            out.push('\n');
            continue;
        }
        if layout.registry {
            let _ = writeln!(out, "**Registry:** {}", registry_label(&rec.url));
        }
        let _ = writeln!(out, "**URL:** {}", rec.url);
        if layout.published
            && let Some(date) = present(&rec.published_date)
        {
            let _ = writeln!(out, "**Published:** {date}");
        }
        if layout.content
            && let Some(content) = present(&rec.content)
        {
            let _ = writeln!(out, "{content}");
        }
        if layout.engine
            && let Some(engine) = present(&rec.engine)
        {
            let _ = writeln!(out, "*Source: {engine}*");
        }
        out.push('\n');
    }
    out
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Package registry inferred from the result URL.
pub fn registry_label(url: &str) -> &'static str {
    if url.contains("npmjs.com") {
        "npm"
    } else if url.contains("pypi.org") {
        "PyPI"
    } else if url.contains("crates.io") {
        "crates.io"
    } else if url.contains("rubygems.org") {
        "RubyGems"
    } else {
        "Unknown"
    }
}

/* ---- Command output ---- */

fn render_output(template: TemplateKind, query: &str, output: &CommandOutput) -> Option<String> {
    let text = match template {
        TemplateKind::ScipIndex => format!(
            "Successfully created index.scip at {query}\nOutput: {}\nErrors: {}",
            output.stdout, output.stderr
        ),
        TemplateKind::CommitSearch => {
            render_log_lines("No matches found for", "Commits matching", query, &output.stdout)
        }
        TemplateKind::FileHistory => {
            render_log_lines("No history found for file", "History of", query, &output.stdout)
        }
        _ => return None,
    };
    Some(text)
}

/// `git log --pretty=format:%h|%ad|%s` lines, one numbered entry each.
fn render_log_lines(empty: &str, heading: &str, query: &str, stdout: &str) -> String {
    let lines: Vec<&str> = stdout.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return format!("{empty}: \"{query}\"");
    }
    let mut out = format!("## {heading}: \"{query}\"\n\n");
    for (idx, line) in lines.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", idx + 1, line.trim_end());
    }
    out
}
