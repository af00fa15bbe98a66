/*!
`searxng` profile: general, media and coding-focused searches against a SearXNG
instance's `/search?format=json` endpoint.

Every operation takes `query` (required) and `max_results` (default 10); the
specialised ones pin a category and/or prefix the query with site filters.
*/

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::non_zero_or;
use crate::relay::{
    ArgumentError, ExternalRequest, GitHubScope, HttpGetRequest, Operation, Plan, Registry,
    RegistryError, TemplateKind,
};

pub const ERROR_LABEL: &str = "Error executing search";

const SEARCH_PATH: &str = "/search";
const DEFAULT_MAX_RESULTS: usize = 10;

pub fn registry() -> Result<Registry, RegistryError> {
    Registry::new()
        .with::<Search>()?
        .with::<SearchImages>()?
        .with::<SearchNews>()?
        .with::<SearchCode>()?
        .with::<SearchStackOverflow>()?
        .with::<SearchDocs>()?
        .with::<SearchPackages>()?
        .with::<SearchGithub>()
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

/// `q` + `format=json`; callers add the rest.
fn search_request(q: impl Into<String>) -> HttpGetRequest {
    HttpGetRequest::new(SEARCH_PATH)
        .param("q", q)
        .param("format", "json")
}

fn records_plan(request: HttpGetRequest, max_results: usize, template: TemplateKind, query: String) -> Plan {
    Plan {
        request: ExternalRequest::HttpGet(request),
        limit: Some(non_zero_or(max_results, DEFAULT_MAX_RESULTS)),
        template,
        query,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
}

impl TimeRange {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
        }
    }
}

/* ---- search ---- */

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchArgs {
    #[schemars(description = "The search query")]
    pub query: String,

    #[schemars(
        description = "Comma-separated categories to search (e.g., \"general\", \"images\", \"videos\", \"news\", \"music\", \"files\", \"it\", \"science\", \"social media\")"
    )]
    #[serde(default = "default_categories")]
    pub categories: String,

    #[schemars(description = "Language code for results (e.g., \"en\", \"de\", \"fr\", \"auto\")")]
    #[serde(default = "default_language")]
    pub language: String,

    #[schemars(description = "Time range filter: \"day\", \"week\", \"month\", \"year\"; omit for all time")]
    #[serde(default)]
    pub time_range: Option<TimeRange>,

    #[schemars(description = "Safe search level: 0 (off), 1 (moderate), 2 (strict)")]
    #[serde(default)]
    pub safesearch: u8,

    #[schemars(description = "Page number of results (starts at 1)")]
    #[serde(default = "default_pageno")]
    pub pageno: u32,

    #[schemars(description = "Maximum number of results to return")]
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_categories() -> String {
    "general".to_string()
}

fn default_language() -> String {
    "auto".to_string()
}

fn default_pageno() -> u32 {
    1
}

pub struct Search;

impl Operation for Search {
    type Args = SearchArgs;
    const NAME: &'static str = "search";
    const DESCRIPTION: &'static str =
        "Search the web using SearXNG metasearch engine. Returns results from multiple search engines.";
    const ERROR_LABEL: &'static str = ERROR_LABEL;

    fn plan(args: SearchArgs) -> Result<Plan, ArgumentError> {
        if args.safesearch > 2 {
            return Err(ArgumentError(format!(
                "safesearch must be 0, 1 or 2 (got {})",
                args.safesearch
            )));
        }
        let request = search_request(args.query.clone())
            .param("categories", args.categories)
            .param("language", args.language)
            .param_opt("time_range", args.time_range.map(TimeRange::as_str))
            .param("safesearch", args.safesearch.to_string())
            .param("pageno", args.pageno.max(1).to_string());
        Ok(records_plan(request, args.max_results, TemplateKind::WebSearch, args.query))
    }
}

/* ---- search_images ---- */

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ImageArgs {
    #[schemars(description = "The image search query")]
    pub query: String,

    #[schemars(description = "Maximum number of results to return")]
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

pub struct SearchImages;

impl Operation for SearchImages {
    type Args = ImageArgs;
    const NAME: &'static str = "search_images";
    const DESCRIPTION: &'static str = "Search for images using SearXNG";
    const ERROR_LABEL: &'static str = ERROR_LABEL;

    fn plan(args: ImageArgs) -> Result<Plan, ArgumentError> {
        let request = search_request(args.query.clone()).param("categories", "images");
        Ok(records_plan(request, args.max_results, TemplateKind::Images, args.query))
    }
}

/* ---- search_news ---- */

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct NewsArgs {
    #[schemars(description = "The news search query")]
    pub query: String,

    #[schemars(description = "Time range: \"day\", \"week\", \"month\", \"year\"")]
    #[serde(default = "default_news_range")]
    pub time_range: TimeRange,

    #[schemars(description = "Maximum number of results to return")]
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_news_range() -> TimeRange {
    TimeRange::Week
}

pub struct SearchNews;

impl Operation for SearchNews {
    type Args = NewsArgs;
    const NAME: &'static str = "search_news";
    const DESCRIPTION: &'static str = "Search for news articles using SearXNG";
    const ERROR_LABEL: &'static str = ERROR_LABEL;

    fn plan(args: NewsArgs) -> Result<Plan, ArgumentError> {
        let request = search_request(args.query.clone())
            .param("categories", "news")
            .param("time_range", args.time_range.as_str());
        Ok(records_plan(request, args.max_results, TemplateKind::News, args.query))
    }
}

/* ---- search_code ---- */

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CodeArgs {
    #[schemars(
        description = "The programming/code search query (e.g., \"python async await\", \"react hooks tutorial\")"
    )]
    pub query: String,

    #[schemars(description = "Programming language to focus on (added to query)")]
    #[serde(default)]
    pub language: Option<String>,

    #[schemars(description = "Maximum number of results to return")]
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

pub struct SearchCode;

impl Operation for SearchCode {
    type Args = CodeArgs;
    const NAME: &'static str = "search_code";
    const DESCRIPTION: &'static str = "Search for programming and IT-related content. Uses the IT category which includes coding tutorials, documentation, and technical articles.";
    const ERROR_LABEL: &'static str = ERROR_LABEL;

    fn plan(args: CodeArgs) -> Result<Plan, ArgumentError> {
        let q = match &args.language {
            Some(lang) => format!("{lang} {}", args.query),
            None => args.query.clone(),
        };
        let request = search_request(q).param("categories", "it");
        Ok(records_plan(request, args.max_results, TemplateKind::Code, args.query))
    }
}

/* ---- search_stackoverflow ---- */

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StackOverflowArgs {
    #[schemars(description = "The coding question or error message to search for")]
    pub query: String,

    #[schemars(description = "Maximum number of results to return")]
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

pub struct SearchStackOverflow;

impl Operation for SearchStackOverflow {
    type Args = StackOverflowArgs;
    const NAME: &'static str = "search_stackoverflow";
    const DESCRIPTION: &'static str =
        "Search Stack Overflow and programming Q&A sites for coding solutions and answers.";
    const ERROR_LABEL: &'static str = ERROR_LABEL;

    fn plan(args: StackOverflowArgs) -> Result<Plan, ArgumentError> {
        let request = search_request(format!(
            "site:stackoverflow.com OR site:stackexchange.com {}",
            args.query
        ))
        .param("categories", "general");
        Ok(records_plan(
            request,
            args.max_results,
            TemplateKind::StackOverflow,
            args.query,
        ))
    }
}

/* ---- search_docs ---- */

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DocsArgs {
    #[schemars(
        description = "The documentation search query (e.g., \"useState hook\", \"pandas dataframe\")"
    )]
    pub query: String,

    #[schemars(
        description = "Framework or library name to focus on (e.g., \"react\", \"django\", \"pytorch\")"
    )]
    #[serde(default)]
    pub framework: Option<String>,

    #[schemars(description = "Maximum number of results to return")]
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

pub struct SearchDocs;

impl Operation for SearchDocs {
    type Args = DocsArgs;
    const NAME: &'static str = "search_docs";
    const DESCRIPTION: &'static str = "Search for official documentation and API references. Targets documentation sites like MDN, ReadTheDocs, official docs.";
    const ERROR_LABEL: &'static str = ERROR_LABEL;

    fn plan(args: DocsArgs) -> Result<Plan, ArgumentError> {
        let q = match &args.framework {
            Some(framework) => format!("{framework} {} documentation", args.query),
            None => format!("{} documentation", args.query),
        };
        let request = search_request(q).param("categories", "it");
        Ok(records_plan(request, args.max_results, TemplateKind::Docs, args.query))
    }
}

/* ---- search_packages ---- */

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PackageRegistry {
    Npm,
    Pypi,
    Crates,
    Rubygems,
    #[default]
    All,
}

impl PackageRegistry {
    fn site_filter(self) -> &'static str {
        match self {
            PackageRegistry::Npm => "site:npmjs.com",
            PackageRegistry::Pypi => "site:pypi.org",
            PackageRegistry::Crates => "site:crates.io",
            PackageRegistry::Rubygems => "site:rubygems.org",
            PackageRegistry::All => {
                "site:npmjs.com OR site:pypi.org OR site:crates.io OR site:rubygems.org"
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PackageArgs {
    #[schemars(description = "The package name or functionality to search for")]
    pub query: String,

    #[schemars(
        description = "Package registry to focus on: \"npm\", \"pypi\", \"crates\", \"rubygems\", or \"all\""
    )]
    #[serde(default)]
    pub registry: PackageRegistry,

    #[schemars(description = "Maximum number of results to return")]
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

pub struct SearchPackages;

impl Operation for SearchPackages {
    type Args = PackageArgs;
    const NAME: &'static str = "search_packages";
    const DESCRIPTION: &'static str =
        "Search for packages and libraries on npm, PyPI, crates.io, and other package registries.";
    const ERROR_LABEL: &'static str = ERROR_LABEL;

    fn plan(args: PackageArgs) -> Result<Plan, ArgumentError> {
        let request = search_request(format!("{} {}", args.registry.site_filter(), args.query))
            .param("categories", "general");
        Ok(records_plan(request, args.max_results, TemplateKind::Packages, args.query))
    }
}

/* ---- search_github ---- */

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GithubSearchType {
    #[default]
    Repos,
    Code,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GithubArgs {
    #[schemars(description = "The search query for GitHub repos/code")]
    pub query: String,

    #[schemars(
        description = "Type of GitHub search: \"repos\" for repositories, \"code\" for code snippets"
    )]
    #[serde(default)]
    pub search_type: GithubSearchType,

    #[schemars(description = "Maximum number of results to return")]
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

pub struct SearchGithub;

impl Operation for SearchGithub {
    type Args = GithubArgs;
    const NAME: &'static str = "search_github";
    const DESCRIPTION: &'static str = "Search for GitHub repositories, code, and projects.";
    const ERROR_LABEL: &'static str = ERROR_LABEL;

    fn plan(args: GithubArgs) -> Result<Plan, ArgumentError> {
        let (filter, scope) = match args.search_type {
            GithubSearchType::Repos => ("site:github.com", GitHubScope::Repos),
            GithubSearchType::Code => ("site:github.com inurl:blob", GitHubScope::Code),
        };
        let request =
            search_request(format!("{filter} {}", args.query)).param("categories", "general");
        Ok(records_plan(
            request,
            args.max_results,
            TemplateKind::GitHub(scope),
            args.query,
        ))
    }
}
