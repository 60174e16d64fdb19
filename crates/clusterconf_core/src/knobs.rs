//! Tunable defaults applied when a configuration is reset.

/// Defaults for role counts that the cluster picks when no explicit count has
/// been configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigKnobs {
    /// Proxy count used while `proxies` is unset.
    pub default_auto_proxies: i32,

    /// Resolver count used while `resolvers` is unset.
    pub default_auto_resolvers: i32,

    /// Transaction log count used while `logs` is unset.
    pub default_auto_logs: i32,
}

impl Default for ConfigKnobs {
    fn default() -> Self {
        Self {
            default_auto_proxies: 3,
            default_auto_resolvers: 1,
            default_auto_logs: 3,
        }
    }
}

impl ConfigKnobs {
    /// Creates knobs with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the automatic proxy count.
    #[must_use]
    pub const fn default_auto_proxies(mut self, value: i32) -> Self {
        self.default_auto_proxies = value;
        self
    }

    /// Sets the automatic resolver count.
    #[must_use]
    pub const fn default_auto_resolvers(mut self, value: i32) -> Self {
        self.default_auto_resolvers = value;
        self
    }

    /// Sets the automatic transaction log count.
    #[must_use]
    pub const fn default_auto_logs(mut self, value: i32) -> Self {
        self.default_auto_logs = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_knobs() {
        let knobs = ConfigKnobs::default();
        assert_eq!(knobs.default_auto_proxies, 3);
        assert_eq!(knobs.default_auto_resolvers, 1);
        assert_eq!(knobs.default_auto_logs, 3);
    }

    #[test]
    fn builder_pattern() {
        let knobs = ConfigKnobs::new()
            .default_auto_proxies(5)
            .default_auto_resolvers(2)
            .default_auto_logs(8);

        assert_eq!(knobs.default_auto_proxies, 5);
        assert_eq!(knobs.default_auto_resolvers, 2);
        assert_eq!(knobs.default_auto_logs, 8);
    }
}
