use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the health path is malformed or an upstream has
    /// an unusable name or header
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_health()?;
        self.validate_upstreams()?;
        Ok(())
    }

    fn validate_health(&self) -> anyhow::Result<()> {
        let health = &self.server.health;

        if health.enabled && !health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/': `{}`", health.path);
        }

        Ok(())
    }

    /// Upstream names become a single path segment of the pass-through route
    fn validate_upstreams(&self) -> anyhow::Result<()> {
        for (name, upstream) in &self.upstreams {
            if name.is_empty() {
                anyhow::bail!("upstream names must not be empty");
            }

            if name.contains('/') || name.contains('?') || name.contains('#') {
                anyhow::bail!("upstream name '{name}' must be a single URL path segment");
            }

            if upstream.base_url.cannot_be_a_base() {
                anyhow::bail!("upstream '{name}' base_url cannot be used as a base: {}", upstream.base_url);
            }

            upstream
                .header_map()
                .map_err(|e| anyhow::anyhow!("upstream '{name}': {e}"))?;
        }

        Ok(())
    }
}
