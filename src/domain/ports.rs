use crate::domain::model::{Image, Instance, LimitKey, LimitTotals, LimitValue, Profile, ProjectInfo};
use crate::utils::error::Result;

/// Read access to the persisted project entity graph.
pub trait ProjectStore: Send + Sync {
    /// Returns `Ok(None)` when the project does not exist. With `skip_if_no_limits`
    /// a project without any `limits.*` config is treated as absent as well.
    fn load_project(&self, name: &str, skip_if_no_limits: bool) -> Result<Option<ProjectInfo>>;

    fn project_images(&self, name: &str) -> Result<Vec<Image>>;
}

/// Applies profile inheritance, returning instances with their effective config and devices.
pub trait ConfigExpander: Send + Sync {
    fn expand(&self, instances: &[Instance], profiles: &[Profile]) -> Result<Vec<Instance>>;
}

pub trait LimitTotaller: Send + Sync {
    fn totals(&self, project: &ProjectInfo, keys: &[LimitKey]) -> Result<LimitTotals>;
}

pub trait Printer: Send + Sync {
    fn format(&self, value: LimitValue) -> String;
}
