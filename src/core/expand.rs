use crate::core::{ConfigExpander, Instance, Profile};
use crate::utils::error::Result;
use std::collections::HashMap;

/// 依實例列出的 profile 順序套用設定，實例本身的設定最後覆蓋。
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileExpander;

impl ProfileExpander {
    pub fn new() -> Self {
        Self
    }

    fn expand_one(instance: &Instance, profiles: &HashMap<&str, &Profile>) -> Instance {
        let mut expanded = instance.clone();
        expanded.config.clear();
        expanded.devices.clear();

        for name in &instance.profiles {
            let Some(profile) = profiles.get(name.as_str()) else {
                tracing::warn!(
                    "Instance '{}' references unknown profile '{}', skipping it",
                    instance.name,
                    name
                );
                continue;
            };

            expanded
                .config
                .extend(profile.config.iter().map(|(k, v)| (k.clone(), v.clone())));
            // devices are replaced as a whole, never merged attribute by attribute
            expanded
                .devices
                .extend(profile.devices.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        expanded
            .config
            .extend(instance.config.iter().map(|(k, v)| (k.clone(), v.clone())));
        expanded
            .devices
            .extend(instance.devices.iter().map(|(k, v)| (k.clone(), v.clone())));

        expanded
    }
}

impl ConfigExpander for ProfileExpander {
    fn expand(&self, instances: &[Instance], profiles: &[Profile]) -> Result<Vec<Instance>> {
        let by_name: HashMap<&str, &Profile> =
            profiles.iter().map(|p| (p.name.as_str(), p)).collect();

        Ok(instances
            .iter()
            .map(|instance| Self::expand_one(instance, &by_name))
            .collect())
    }
}
