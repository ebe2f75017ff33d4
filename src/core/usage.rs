use crate::core::classify::count_instances;
use crate::core::expand::ProfileExpander;
use crate::core::report::{PrinterRegistry, ReportFormatter};
use crate::core::storage::{image_bytes, root_disk_bytes, volume_bytes, StorageTotals};
use crate::core::totals::InstanceLimitTotaller;
use crate::core::{ConfigExpander, LimitKey, LimitTotaller, ProjectStore, UsageReport};
use crate::utils::error::{Result, UsageError};

/// Limits summed across instances for the report.
pub const REPORTED_LIMITS: [LimitKey; 3] = [LimitKey::Memory, LimitKey::Cpu, LimitKey::Processes];

fn stage_error<'a>(
    stage: &'static str,
    project: &'a str,
) -> impl FnOnce(UsageError) -> UsageError + 'a {
    move |source| UsageError::Collaborator {
        stage,
        project: project.to_string(),
        source: Box::new(source),
    }
}

/// Engine wired with the standard expander and totaller.
pub type DefaultEngine<S> = UsageEngine<S, ProfileExpander, InstanceLimitTotaller>;

pub struct UsageEngine<S: ProjectStore, E: ConfigExpander, T: LimitTotaller> {
    store: S,
    expander: E,
    totaller: T,
    formatter: ReportFormatter,
}

impl<S: ProjectStore> DefaultEngine<S> {
    /// Engine with the standard expander, totaller and printers.
    pub fn new(store: S) -> Self {
        Self::with_components(
            store,
            ProfileExpander::new(),
            InstanceLimitTotaller::new(),
            PrinterRegistry::default(),
        )
    }
}

impl<S: ProjectStore, E: ConfigExpander, T: LimitTotaller> UsageEngine<S, E, T> {
    pub fn with_components(store: S, expander: E, totaller: T, printers: PrinterRegistry) -> Self {
        Self {
            store,
            expander,
            totaller,
            formatter: ReportFormatter::new(printers),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 計算專案目前的資源使用量。專案不存在時回傳全為 "0" 的報告。
    pub fn compute(&self, project: &str) -> Result<UsageReport> {
        Ok(self.compute_report(project, false)?.unwrap_or_default())
    }

    /// Like [`compute`](Self::compute), but returns `None` for projects that are
    /// missing or set no `limits.*` keys.
    pub fn compute_if_limited(&self, project: &str) -> Result<Option<UsageReport>> {
        self.compute_report(project, true)
    }

    fn compute_report(
        &self,
        project: &str,
        skip_if_no_limits: bool,
    ) -> Result<Option<UsageReport>> {
        tracing::debug!("Computing usage for project '{}'", project);

        let Some(mut info) = self
            .store
            .load_project(project, skip_if_no_limits)
            .map_err(stage_error("load project", project))?
        else {
            tracing::info!("Project '{}' not found, reporting no allocations", project);
            return Ok(None);
        };

        info.instances = self
            .expander
            .expand(&info.instances, &info.profiles)
            .map_err(stage_error("expand instance config", project))?;

        let totals = self
            .totaller
            .totals(&info, &REPORTED_LIMITS)
            .map_err(stage_error("compute limit totals", project))?;

        // 先檢查 volume 與 root disk，再查詢映像檔
        let volumes = volume_bytes(&info.volumes, project)?;
        let root_disks = root_disk_bytes(&info.instances, project)?;
        let images = self
            .store
            .project_images(project)
            .map_err(stage_error("load images", project))?;
        let storage = StorageTotals {
            volumes,
            root_disks,
            images: image_bytes(&images, project)?,
        };
        tracing::debug!("Storage for project '{}': {:?}", project, storage);

        let disk = storage.total(project)?;
        let counts = count_instances(&info.instances)?;

        tracing::debug!(
            "Project '{}': {} containers, {} virtual machines, {} bytes of storage",
            project,
            counts.containers,
            counts.virtual_machines,
            disk
        );

        self.formatter.format(&totals, disk, counts).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::core::{Image, Instance, Profile, ProjectInfo, Volume};
    use crate::domain::model::{ConfigMap, DeviceMap};

    fn config(pairs: &[(&str, &str)]) -> ConfigMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn default_profile() -> Profile {
        let mut devices = DeviceMap::new();
        devices.insert(
            "root".to_string(),
            config(&[("type", "disk"), ("path", "/"), ("size", "5GB")]),
        );
        Profile {
            name: "default".to_string(),
            config: config(&[
                ("limits.cpu", "1"),
                ("limits.memory", "1GiB"),
                ("limits.processes", "100"),
            ]),
            devices,
        }
    }

    fn instance(name: &str, instance_type: &str) -> Instance {
        Instance {
            name: name.to_string(),
            instance_type: instance_type.to_string(),
            profiles: vec!["default".to_string()],
            ..Default::default()
        }
    }

    fn project() -> ProjectInfo {
        ProjectInfo {
            name: "p1".to_string(),
            instances: vec![instance("c1", "container")],
            profiles: vec![default_profile()],
            volumes: vec![Volume {
                name: "data".to_string(),
                config: config(&[("size", "3GB")]),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_project_reports_zero() {
        let engine = UsageEngine::new(MemoryStore::new());
        assert_eq!(engine.compute("nope").unwrap(), UsageReport::default());
    }

    #[test]
    fn test_computes_report_from_profiles() {
        let engine = UsageEngine::new(MemoryStore::new().with_project(project()));

        let report = engine.compute("p1").unwrap();

        assert_eq!(report.get("disk"), Some("7.5GiB"));
        assert_eq!(report.get("memory"), Some("1.0GiB"));
        assert_eq!(report.get("cpu"), Some("1"));
        assert_eq!(report.get("processes"), Some("100"));
        assert_eq!(report.get("containers"), Some("1"));
        assert_eq!(report.get("virtual-machines"), Some("0"));
        assert_eq!(report.get("networks"), Some("0"));
    }

    #[test]
    fn test_images_count_towards_disk() {
        let store = MemoryStore::new().with_project(ProjectInfo {
            images: vec![Image {
                fingerprint: "f00".to_string(),
                size: 1 << 30,
            }],
            ..project()
        });

        let report = UsageEngine::new(store).compute("p1").unwrap();

        // 8GB + 1GiB
        assert_eq!(report.get("disk"), Some("8.5GiB"));
    }

    #[test]
    fn test_totaller_failure_is_wrapped_with_stage() {
        let mut info = project();
        info.profiles[0].config.remove("limits.processes");

        let err = UsageEngine::new(MemoryStore::new().with_project(info))
            .compute("p1")
            .unwrap_err();

        match &err {
            UsageError::Collaborator { stage, project, .. } => {
                assert_eq!(*stage, "compute limit totals");
                assert_eq!(project, "p1");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(err.root_cause(), UsageError::MissingLimit { .. }));
    }

    /// Serves projects from memory but fails every image query.
    struct ImagesDown(MemoryStore);

    impl ProjectStore for ImagesDown {
        fn load_project(
            &self,
            name: &str,
            skip_if_no_limits: bool,
        ) -> Result<Option<ProjectInfo>> {
            self.0.load_project(name, skip_if_no_limits)
        }

        fn project_images(&self, _name: &str) -> Result<Vec<Image>> {
            Err(UsageError::StoreError {
                message: "images down".to_string(),
            })
        }
    }

    #[test]
    fn test_volume_size_is_checked_before_images() {
        let mut info = project();
        info.volumes[0].config.remove("size");
        let engine = UsageEngine::new(ImagesDown(MemoryStore::new().with_project(info)));

        let err = engine.compute("p1").unwrap_err();

        assert!(
            matches!(err, UsageError::MissingVolumeSize { ref volume, .. } if volume == "data"),
            "{err}"
        );
    }

    #[test]
    fn test_image_failure_is_wrapped_with_stage() {
        let engine = UsageEngine::new(ImagesDown(MemoryStore::new().with_project(project())));

        let err = engine.compute("p1").unwrap_err();

        assert_eq!(
            err.to_string(),
            "Project \"p1\": failed to load images: Project store error: images down"
        );
    }

    #[test]
    fn test_compute_if_limited_skips_projects_without_limits() {
        let mut limited = project();
        limited.name = "limited".to_string();
        limited
            .config
            .insert("limits.memory".to_string(), "10GB".to_string());
        let store = MemoryStore::new()
            .with_project(project())
            .with_project(limited);
        let engine = UsageEngine::new(store);

        assert_eq!(engine.compute_if_limited("p1").unwrap(), None);
        assert_eq!(engine.compute_if_limited("nope").unwrap(), None);
        let report = engine.compute_if_limited("limited").unwrap().unwrap();
        assert_eq!(report.get("containers"), Some("1"));

        // 未設定限制的專案仍可直接計算
        assert_eq!(engine.compute("p1").unwrap().get("containers"), Some("1"));
    }

    #[test]
    fn test_compute_is_idempotent() {
        let mut info = project();
        info.instances.push(instance("v1", "virtual-machine"));
        let engine = UsageEngine::new(MemoryStore::new().with_project(info));

        let first = serde_json::to_string(&engine.compute("p1").unwrap()).unwrap();
        let second = serde_json::to_string(&engine.compute("p1").unwrap()).unwrap();

        assert_eq!(first, second);
    }
}
