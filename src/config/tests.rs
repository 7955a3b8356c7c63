use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_eightd_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("EIGHTD_CONFIG_PATH", "/tmp/eightd-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/eightd-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("eightd")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("eightd")
            .join("config.toml")
    );
}

#[test]
fn defaults_match_the_reference_chain() {
    let s = Settings::default();
    assert_eq!(s.audio.highpass_hz, 60.0);
    assert_eq!(s.audio.presence_hz, 2500.0);
    assert_eq!(s.audio.presence_q, 1.2);
    assert_eq!(s.audio.compressor_threshold_db, -18.0);
    assert_eq!(s.audio.compressor_knee_db, 24.0);
    assert_eq!(s.audio.compressor_ratio, 3.0);
    assert_eq!(s.audio.compressor_attack_ms, 5);
    assert_eq!(s.audio.compressor_release_ms, 250);
    assert_eq!(s.audio.output_trim, 0.95);
    assert_eq!(s.orbit.tick_ms, 30);
    assert_eq!(s.presets.default, "balanced");
    assert!(s.validate().is_ok());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
highpass_hz = 40.0
output_trim = 0.8

[orbit]
radius_x = 1.4
radius_z = 0.6
speed = 1.0
tick_ms = 20

[presets]
default = "night"

[presets.profiles.night]
bass = 2.0
presence = 0.0
treble = -3.0

[metadata]
enabled = false
api_key = "k"

[library]
extensions = ["mp3"]
recursive = false

[ui]
header_text = "hello"

[controls]
seek_step = 0.1

[logging]
filter = "debug"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("EIGHTD_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("EIGHTD__ORBIT__SPEED");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.highpass_hz, 40.0);
    assert_eq!(s.audio.output_trim, 0.8);
    // Untouched keys keep their defaults.
    assert_eq!(s.audio.compressor_ratio, 3.0);
    assert_eq!(s.orbit.radius_x, 1.4);
    assert_eq!(s.orbit.radius_z, 0.6);
    assert_eq!(s.orbit.speed, 1.0);
    assert_eq!(s.orbit.tick_ms, 20);
    assert_eq!(s.presets.default, "night");
    let night = s.presets.resolve("night").unwrap();
    assert_eq!(night.treble, -3.0);
    assert!(s.presets.resolve("vocal").is_some());
    assert!(!s.metadata.enabled);
    assert_eq!(s.metadata.api_key.as_deref(), Some("k"));
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.controls.seek_step, 0.1);
    assert_eq!(s.logging.filter, "debug");
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[orbit]
tick_ms = 30
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("EIGHTD_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("EIGHTD__ORBIT__TICK_MS", "45");

    let s = Settings::load().unwrap();
    assert_eq!(s.orbit.tick_ms, 45);
}

#[test]
fn validate_rejects_unknown_default_preset_and_bad_orbit() {
    let mut s = Settings::default();
    s.presets.default = "nope".into();
    assert!(s.validate().unwrap_err().contains("nope"));

    let mut s = Settings::default();
    s.orbit.tick_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.orbit.radius_z = 0.0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.output_trim = 1.5;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.compressor_ratio = 0.5;
    assert!(s.validate().is_err());
}

#[test]
fn dumped_toml_loads_back() {
    let _lock = env_lock();

    let text = Settings::default().to_toml().unwrap();
    assert!(text.contains("[orbit]"));

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(&cfg_path, text).unwrap();
    let _g1 = EnvGuard::set("EIGHTD_CONFIG_PATH", cfg_path.to_str().unwrap());

    let s = Settings::load().unwrap();
    assert_eq!(s.orbit.speed, 1.2);
    assert_eq!(s.audio.treble_hz, 4000.0);
}
