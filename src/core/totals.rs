use crate::core::{LimitKey, LimitTotaller, LimitTotals, LimitValue, ProjectInfo};
use crate::utils::error::{Result, UsageError};
use crate::utils::units::parse_byte_size;

/// Parses a single instance-level limit value into its raw aggregate form.
pub fn parse_limit_value(key: LimitKey, value: &str) -> std::result::Result<LimitValue, String> {
    match key {
        LimitKey::Memory => {
            if value.ends_with('%') {
                return Err("Value can't be a percentage".to_string());
            }
            parse_byte_size(value)
                .map(LimitValue::Bytes)
                .map_err(|e| e.to_string())
        }
        LimitKey::Cpu => {
            if value.contains(',') || value.contains('-') {
                return Err("CPUs can't be pinned if project limits are used".to_string());
            }
            value
                .parse::<i64>()
                .map(LimitValue::Count)
                .map_err(|e| e.to_string())
        }
        LimitKey::Processes => value
            .parse::<i64>()
            .map(LimitValue::Count)
            .map_err(|e| e.to_string()),
        LimitKey::Disk => parse_byte_size(value)
            .map(LimitValue::Bytes)
            .map_err(|e| e.to_string()),
    }
}

/// Sums configured limits across all instances of a project. Every instance
/// must set every requested key, directly or through a profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceLimitTotaller;

impl InstanceLimitTotaller {
    pub fn new() -> Self {
        Self
    }

    fn add(
        total: &mut LimitValue,
        value: LimitValue,
        key: LimitKey,
        owner: &str,
        project: &str,
    ) -> Result<()> {
        *total = total
            .checked_add(value)
            .ok_or_else(|| UsageError::InvalidLimit {
                key: key.to_string(),
                instance: owner.to_string(),
                project: project.to_string(),
                reason: "Aggregate value overflows".to_string(),
            })?;
        Ok(())
    }
}

impl LimitTotaller for InstanceLimitTotaller {
    fn totals(&self, project: &ProjectInfo, keys: &[LimitKey]) -> Result<LimitTotals> {
        let mut totals: LimitTotals = keys.iter().map(|&key| (key, key.zero())).collect();

        for instance in &project.instances {
            for &key in keys {
                let Some(value) = instance
                    .config
                    .get(key.as_str())
                    .filter(|value| !value.is_empty())
                else {
                    return Err(UsageError::MissingLimit {
                        instance: instance.name.clone(),
                        project: project.name.clone(),
                        key: key.to_string(),
                    });
                };

                let parsed =
                    parse_limit_value(key, value).map_err(|reason| UsageError::InvalidLimit {
                        key: key.to_string(),
                        instance: instance.name.clone(),
                        project: project.name.clone(),
                        reason,
                    })?;

                let total = totals.entry(key).or_insert_with(|| key.zero());
                Self::add(total, parsed, key, &instance.name, &project.name)?;
            }
        }

        tracing::debug!("Limit totals for project '{}': {:?}", project.name, totals);
        Ok(totals)
    }
}
