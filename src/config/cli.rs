use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_required_field, Validate,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Toml,
}

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "project-usage")]
#[command(about = "Report the current resource allocations of a project")]
pub struct CliConfig {
    /// Snapshot of the project database (TOML or JSON)
    #[arg(long, default_value = "./snapshot.toml")]
    pub snapshot: String,

    /// Project to report on
    #[arg(long, short)]
    pub project: Option<String>,

    /// Report on every project in the snapshot
    #[arg(long, conflicts_with = "project")]
    pub all: bool,

    /// With --all, leave out projects that set no limits.* keys
    #[arg(long, requires = "all")]
    pub limited_only: bool,

    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    /// 回傳要計算的專案名稱；使用 --all 時為 None
    pub fn target_project(&self) -> Result<Option<&str>> {
        if self.all {
            return Ok(None);
        }
        let project = validate_required_field("project", &self.project)?;
        Ok(Some(project.as_str()))
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("snapshot", &self.snapshot)?;
        if let Some(project) = self.target_project()? {
            validate_non_empty_string("project", project)?;
        }
        Ok(())
    }
}
