use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use ballot_gate::GateConfig;
use serde::{Deserialize, Serialize};

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "ballot.toml";
pub const DEFAULT_STATE_FILE: &str = "ballot.json";

/// Settings read from `ballot.toml`.
///
/// ```toml
/// state_path = "elections/board.json"
///
/// [gate]
/// max_name_len = 64
/// reject_blank_names = true
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub state_path: Option<PathBuf>,
    pub gate: GateConfig,
}

impl CliConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.gate.validate()?;
        Ok(config)
    }

    /// An explicit path must exist; otherwise fall back to `ballot.toml` in
    /// the working directory, then to defaults.
    pub fn resolve(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Command-line override, then config, then `ballot.json`.
    pub fn state_path(&self, cli_override: Option<&Path>) -> PathBuf {
        cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.state_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = CliConfig::default();
        assert!(c.state_path.is_none());
        assert!(!c.gate.checks_names());
        assert_eq!(c.state_path(None), PathBuf::from("ballot.json"));
    }

    #[test]
    fn override_beats_config() {
        let c = CliConfig {
            state_path: Some("from-config.json".into()),
            ..Default::default()
        };
        assert_eq!(c.state_path(None), PathBuf::from("from-config.json"));
        assert_eq!(
            c.state_path(Some(Path::new("cli.json"))),
            PathBuf::from("cli.json")
        );
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ballot.toml");
        fs::write(
            &path,
            "state_path = \"board.json\"\n\n[gate]\nmax_name_len = 10\n",
        )
        .unwrap();

        let c = CliConfig::load(&path).unwrap();
        assert_eq!(c.state_path, Some(PathBuf::from("board.json")));
        assert_eq!(c.gate.max_name_len, Some(10));
        assert!(!c.gate.reject_blank_names);
    }

    #[test]
    fn invalid_gate_settings_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ballot.toml");
        fs::write(&path, "[gate]\nmax_name_len = 0\n").unwrap();
        assert!(CliConfig::load(&path).is_err());
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CliConfig::resolve(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
