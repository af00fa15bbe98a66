/*!
Server profiles served by the binary.

Variants:
  git-history (search_commits, get_file_history)
  scip        (index_typescript, index_python)
  searxng     (search, search_images, search_news, search_code,
               search_stackoverflow, search_docs, search_packages, search_github)

Each profile builds its own registry; no state is shared between profiles.
*/

pub mod git_history;
pub mod scip;
pub mod searxng;

use std::fmt;

use crate::relay::{Registry, RegistryError};

#[derive(clap::ValueEnum, Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ServerKind {
    /// Commit search and file history over `git log`
    GitHistory,
    /// SCIP indexing for TypeScript and Python projects
    Scip,
    /// Web and code search through a SearXNG instance
    Searxng,
}

impl ServerKind {
    #[cfg(test)]
    pub const fn variants() -> &'static [ServerKind] {
        &[ServerKind::GitHistory, ServerKind::Scip, ServerKind::Searxng]
    }

    /// Name reported in the MCP `initialize` handshake.
    pub fn server_name(self) -> &'static str {
        match self {
            ServerKind::GitHistory => "mcp-git-history",
            ServerKind::Scip => "mcp-scip",
            ServerKind::Searxng => "searxng",
        }
    }

    pub fn instructions(self) -> &'static str {
        match self {
            ServerKind::GitHistory => {
                "Search commit messages or diffs with 'search_commits'; list recent commits touching a file with 'get_file_history'. Paths must point at a local git repository."
            }
            ServerKind::Scip => {
                "Generate index.scip for a project with 'index_typescript' (needs scip-typescript on PATH) or 'index_python' (needs scip-python on PATH)."
            }
            ServerKind::Searxng => {
                "Metasearch through SearXNG. Use 'search' for general queries and the search_* tools for images, news, code, Stack Overflow, docs, packages and GitHub."
            }
        }
    }

    pub fn registry(self) -> Result<Registry, RegistryError> {
        match self {
            ServerKind::GitHistory => git_history::registry(),
            ServerKind::Scip => scip::registry(),
            ServerKind::Searxng => searxng::registry(),
        }
    }
}

impl fmt::Display for ServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServerKind::GitHistory => "git-history",
            ServerKind::Scip => "scip",
            ServerKind::Searxng => "searxng",
        };
        f.write_str(s)
    }
}

/// Treat `0` as "not supplied".
pub(crate) fn non_zero_or<T: Default + PartialEq>(value: T, default: T) -> T {
    if value == T::default() { default } else { value }
}

/* --------------------------------- Tests ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;

    #[test]
    fn every_profile_builds_its_registry() {
        let expected = [
            (ServerKind::GitHistory, vec!["search_commits", "get_file_history"]),
            (ServerKind::Scip, vec!["index_typescript", "index_python"]),
            (
                ServerKind::Searxng,
                vec![
                    "search",
                    "search_images",
                    "search_news",
                    "search_code",
                    "search_stackoverflow",
                    "search_docs",
                    "search_packages",
                    "search_github",
                ],
            ),
        ];
        for (kind, names) in expected {
            let registry = kind.registry().unwrap();
            let got: Vec<&str> = registry.iter().map(|op| op.name()).collect();
            assert_eq!(got, names, "{kind}");
        }
    }

    #[test]
    fn every_schema_is_an_object_with_properties() {
        for kind in ServerKind::variants() {
            for op in kind.registry().unwrap().iter() {
                let schema = op.input_schema();
                assert_eq!(schema.get("type").and_then(|v| v.as_str()), Some("object"));
                assert!(schema.get("properties").is_some(), "{}", op.name());
                assert!(!op.required().is_empty(), "{}", op.name());
            }
        }
    }

    #[test]
    fn display_matches_cli_value() {
        for kind in ServerKind::variants() {
            let parsed = ServerKind::from_str(&kind.to_string(), true).unwrap();
            assert_eq!(parsed, *kind);
        }
    }

    #[test]
    fn zero_means_default() {
        assert_eq!(non_zero_or(0u32, 10), 10);
        assert_eq!(non_zero_or(3usize, 10), 3);
    }
}
