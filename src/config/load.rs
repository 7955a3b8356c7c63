use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `EIGHTD__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("EIGHTD")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.audio.highpass_hz > 0.0) {
            return Err("audio.highpass_hz must be > 0".to_string());
        }
        if self.audio.compressor_ratio < 1.0 {
            return Err("audio.compressor_ratio must be >= 1".to_string());
        }
        if !(self.audio.output_trim > 0.0 && self.audio.output_trim <= 1.0) {
            return Err("audio.output_trim must be in (0, 1]".to_string());
        }
        if !(self.orbit.radius_x > 0.0 && self.orbit.radius_z > 0.0) {
            return Err("orbit radii must be > 0".to_string());
        }
        if self.orbit.tick_ms == 0 {
            return Err("orbit.tick_ms must be >= 1".to_string());
        }
        if self.presets.resolve(&self.presets.default).is_none() {
            return Err(format!(
                "presets.default names an unknown profile: {}",
                self.presets.default
            ));
        }
        Ok(())
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Resolve the config path from `EIGHTD_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("EIGHTD_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/eightd/config.toml`
/// or `~/.config/eightd/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("eightd").join("config.toml"))
}
