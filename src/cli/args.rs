use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use patrifind::types::Level;

/// Parse command line arguments into the strongly typed [`CliArgs`] structure.
pub fn parse_cli() -> CliArgs {
    CliArgs::parse()
}

#[derive(Parser, Debug)]
#[command(
    name = "patrifind",
    version,
    about = "Faceted search and location resolution over an asset-registry fixture"
)]
pub struct CliArgs {
    /// Free-text search input; hyphenated input is matched as code-checkdigit.
    pub query: Option<String>,

    /// JSON fixture holding records and the organizational hierarchy.
    #[arg(long, env = "PATRIFIND_FIXTURE")]
    pub fixture: Option<PathBuf>,

    /// Optional TOML settings file layered under CLI flags.
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// List hierarchy nodes at this level instead of searching.
    #[arg(long, value_enum)]
    pub list: Option<LevelArg>,

    /// Parent node id scoping the listing (required below unit level).
    #[arg(long, requires = "list")]
    pub parent: Option<String>,

    /// Free-text filter narrowing the listing.
    #[arg(long, requires = "list")]
    pub filter: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value = "plain")]
    pub output: OutputFormat,

    /// Print the resolved settings before running.
    #[arg(long)]
    pub print_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LevelArg {
    Unit,
    Agency,
    Sector,
    Location,
}

impl From<LevelArg> for Level {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Unit => Level::Unit,
            LevelArg::Agency => Level::Agency,
            LevelArg::Sector => Level::Sector,
            LevelArg::Location => Level::Location,
        }
    }
}
