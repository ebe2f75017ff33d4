use crate::core::{Image, Instance, Volume};
use crate::utils::error::{Result, UsageError};
use crate::utils::units::parse_byte_size;

/// Byte totals that make up a project's `disk` usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageTotals {
    pub volumes: i64,
    pub root_disks: i64,
    pub images: i64,
}

impl StorageTotals {
    pub fn total(&self, project: &str) -> Result<i64> {
        self.volumes
            .checked_add(self.root_disks)
            .and_then(|sum| sum.checked_add(self.images))
            .ok_or_else(|| overflow(project))
    }
}

fn overflow(project: &str) -> UsageError {
    UsageError::SizeOverflow {
        project: project.to_string(),
    }
}

fn accumulate(total: i64, size: i64, project: &str) -> Result<i64> {
    total.checked_add(size).ok_or_else(|| overflow(project))
}

pub fn volume_bytes(volumes: &[Volume], project: &str) -> Result<i64> {
    let mut total = 0_i64;
    for volume in volumes {
        let size = volume
            .config
            .get("size")
            .ok_or_else(|| UsageError::MissingVolumeSize {
                volume: volume.name.clone(),
                project: project.to_string(),
            })?;

        let bytes = parse_byte_size(size).map_err(|source| UsageError::InvalidSize {
            value: size.clone(),
            context: format!("Failed to determine size of volume {:?}", volume.name),
            source,
        })?;

        total = accumulate(total, bytes, project)?;
    }
    Ok(total)
}

/// Root disk sizes of expanded instances.
pub fn root_disk_bytes(instances: &[Instance], project: &str) -> Result<i64> {
    let mut total = 0_i64;
    for instance in instances {
        let size = instance
            .devices
            .get("root")
            .and_then(|root| root.get("size"))
            .ok_or_else(|| UsageError::MissingRootDiskSize {
                instance: instance.name.clone(),
                project: project.to_string(),
            })?;

        let bytes = parse_byte_size(size).map_err(|source| UsageError::InvalidSize {
            value: size.clone(),
            context: format!("Failed to determine root disk usage {:?}", project),
            source,
        })?;

        total = accumulate(total, bytes, project)?;
    }
    Ok(total)
}

pub fn image_bytes(images: &[Image], project: &str) -> Result<i64> {
    images
        .iter()
        .try_fold(0_i64, |total, image| accumulate(total, image.size, project))
}
