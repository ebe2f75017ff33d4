use crate::adapters::memory::MemoryStore;
use crate::core::ProjectInfo;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_unique_names, Validate};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Toml,
    Json,
}

impl SnapshotFormat {
    /// 依副檔名判斷格式，未知副檔名以 TOML 處理
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("json") => SnapshotFormat::Json,
            _ => SnapshotFormat::Toml,
        }
    }
}

/// A dump of project entity graphs, as exported from the instance database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub projects: Vec<ProjectInfo>,
}

impl SnapshotFile {
    /// 從快照檔案載入
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content, SnapshotFormat::from_path(&path))
    }

    pub fn parse(content: &str, format: SnapshotFormat) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        let snapshot: SnapshotFile = match format {
            SnapshotFormat::Toml => toml::from_str(&processed)?,
            SnapshotFormat::Json => serde_json::from_str(&processed)?,
        };

        tracing::debug!("Loaded snapshot with {} projects", snapshot.projects.len());
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// 替換環境變數 (例如 ${POOL_SIZE})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn into_store(self) -> MemoryStore {
        self.projects.into_iter().collect()
    }
}

impl Validate for SnapshotFile {
    fn validate(&self) -> Result<()> {
        validate_unique_names("projects", self.projects.iter().map(|p| p.name.as_str()))?;

        for project in &self.projects {
            validate_non_empty_string("projects.name", &project.name)?;

            for instance in &project.instances {
                validate_non_empty_string(
                    &format!("projects.{}.instances.name", project.name),
                    &instance.name,
                )?;
            }
            validate_unique_names(
                &format!("projects.{}.instances", project.name),
                project.instances.iter().map(|i| i.name.as_str()),
            )?;
            validate_unique_names(
                &format!("projects.{}.profiles", project.name),
                project.profiles.iter().map(|p| p.name.as_str()),
            )?;
            validate_unique_names(
                &format!("projects.{}.volumes", project.name),
                project.volumes.iter().map(|v| v.name.as_str()),
            )?;
        }

        Ok(())
    }
}
