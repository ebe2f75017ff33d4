use crate::core::{Instance, InstanceType};
use crate::utils::error::{Result, UsageError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstanceCounts {
    pub containers: i64,
    pub virtual_machines: i64,
}

/// Counts instances by type. An unknown type means the stored data is corrupt,
/// so the first one aborts the count.
pub fn count_instances(instances: &[Instance]) -> Result<InstanceCounts> {
    let mut counts = InstanceCounts::default();

    for instance in instances {
        match InstanceType::parse(&instance.instance_type) {
            Some(InstanceType::Container) => counts.containers += 1,
            Some(InstanceType::VirtualMachine) => counts.virtual_machines += 1,
            None => {
                return Err(UsageError::UnexpectedInstanceType {
                    kind: instance.instance_type.clone(),
                })
            }
        }
    }

    Ok(counts)
}
