use std::collections::BTreeMap;

use super::{Config, ConfigSource};

impl Config {
    /// Effective configuration as `key -> (value, source label)`, sorted by key
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let values = [
            (
                "runner.default_timeout_ms",
                self.runner.default_timeout_ms.to_string(),
            ),
            ("runner.raise_priority", self.runner.raise_priority.to_string()),
            ("logging.verbose", self.logging.verbose.to_string()),
            ("logging.format", self.logging.format.to_string()),
        ];

        values
            .into_iter()
            .map(|(key, value)| {
                let source = self
                    .source_attribution
                    .get(key)
                    .unwrap_or(&ConfigSource::Default)
                    .label()
                    .to_string();
                (key.to_string(), (value, source))
            })
            .collect()
    }
}
