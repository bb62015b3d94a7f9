/// CLI argument definitions via clap derive.
///
/// Workflow variables set by Alfred arrive as environment variables; each one
/// is bound to a hidden long flag so it can also be given on the command line
/// when running outside Alfred.
use std::ffi::OsString;

use clap::{Args, Parser, ValueEnum};

/// alfred-emoji — look up emojis by keyword from Alfred.
///
/// Queries that begin with `-` must follow `--`.
#[derive(Debug, Parser)]
#[command(
    name = "alfred-emoji",
    about = "Alfred Script Filter that looks up emojis by keyword",
    version
)]
pub struct Cli {
    /// Check GitHub for a new release instead of searching.
    #[arg(long)]
    pub check: bool,

    /// Search query. Absent or empty lists every emoji.
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Output format. Auto-detects: table when TTY, Alfred JSON when piped.
    #[arg(long, value_name = "FORMAT", default_value = "auto")]
    pub output: OutputFormat,

    /// Omit table headers.
    #[arg(long)]
    pub no_header: bool,

    #[command(flatten)]
    pub env: EnvArgs,
}

/// Output format variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Auto-detect: table when stdout is a TTY, Alfred JSON when piped.
    #[default]
    Auto,
    /// Compact Script Filter JSON, as Alfred reads it.
    Alfred,
    /// Pretty-printed Script Filter JSON.
    Json,
    /// Aligned table with headers (human-readable).
    Table,
}

/// Workflow variables and Alfred-provided environment.
#[derive(Debug, Clone, Default, Args)]
pub struct EnvArgs {
    /// Skin tone for emojis that support it.
    #[arg(long, env = "skin_tone", hide = true)]
    pub skin_tone: Option<String>,

    /// GitHub `owner/repo` to check for releases. Unset disables updates.
    #[arg(long, env = "update_repository", hide = true)]
    pub update_repository: Option<String>,

    #[arg(long, env = "alfred_workflow_bundleid", hide = true)]
    pub bundle_id: Option<String>,

    #[arg(long, env = "alfred_workflow_version", hide = true)]
    pub workflow_version: Option<String>,

    #[arg(long, env = "alfred_workflow_cache", hide = true)]
    pub cache_dir: Option<std::path::PathBuf>,

    #[arg(long, env = "alfred_workflow_data", hide = true)]
    pub data_dir: Option<std::path::PathBuf>,

    /// Version of the running Alfred app, e.g. "5.5".
    #[arg(long, env = "alfred_version", hide = true)]
    pub alfred_version: Option<String>,

    /// Set by Alfred while its workflow debugger is open.
    #[arg(
        long,
        env = "alfred_debug",
        hide = true,
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub alfred_debug: bool,
}

/// Accept the single-dash `-check` spelling the workflow has always used.
#[must_use]
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut seen_separator = false;
    args.into_iter()
        .map(|arg| {
            if arg == "--" {
                seen_separator = true;
            }
            if !seen_separator && arg == "-check" {
                OsString::from("--check")
            } else {
                arg
            }
        })
        .collect()
}
