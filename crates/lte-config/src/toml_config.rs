use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use toml::Value;

use super::stack_config::{CfgMac, SharedConfig, StackConfig};

/// Build `SharedConfig` from a TOML configuration string
pub fn from_toml_str(toml_str: &str) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    // Various sanity checks
    let expected_config_version = "0.1";
    if !root.config_version.eq(expected_config_version) {
        return Err(format!(
            "Unrecognized config_version: {}, expect {}",
            root.config_version, expected_config_version
        )
        .into());
    }
    if !root.extra.is_empty() {
        return Err(format!("Unrecognized top-level fields: {:?}", sorted_keys(&root.extra)).into());
    }
    if let Some(ref mac) = root.mac {
        if !mac.extra.is_empty() {
            return Err(format!("Unrecognized fields in mac: {:?}", sorted_keys(&mac.extra)).into());
        }
    }

    let mut cfg = StackConfig {
        debug_log: root.debug_log,
        mac: CfgMac::default(),
    };

    if let Some(mac) = root.mac {
        apply_mac_patch(&mut cfg.mac, mac);
    }

    Ok(SharedConfig::from_config(cfg)?)
}

/// Build `SharedConfig` from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build `SharedConfig` from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    from_reader(BufReader::new(f))
}

fn apply_mac_patch(dst: &mut CfgMac, src: MacDto) {
    if let Some(v) = src.max_sch_subpdus {
        dst.max_sch_subpdus = v;
    }
    if let Some(v) = src.max_mch_subpdus {
        dst.max_mch_subpdus = v;
    }
    if let Some(v) = src.max_rars {
        dst.max_rars = v;
    }
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&str> {
    let mut v: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    v.sort_unstable();
    v
}

/// ----------------------- DTOs for input shape -----------------------

#[derive(Deserialize)]
struct TomlConfigRoot {
    config_version: String,
    debug_log: Option<String>,

    #[serde(default)]
    mac: Option<MacDto>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Default, Deserialize)]
struct MacDto {
    pub max_sch_subpdus: Option<usize>,
    pub max_mch_subpdus: Option<usize>,
    pub max_rars: Option<usize>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let cfg = from_toml_str("config_version = \"0.1\"\n").unwrap();
        assert_eq!(cfg.config().mac, CfgMac::default());
        assert!(cfg.config().debug_log.is_none());
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
            config_version = "0.1"
            debug_log = "/tmp/mac.log"

            [mac]
            max_sch_subpdus = 20
            max_mch_subpdus = 30
            max_rars = 8
        "#;
        let cfg = from_toml_str(toml).unwrap().config();
        assert_eq!(cfg.debug_log.as_deref(), Some("/tmp/mac.log"));
        assert_eq!(cfg.mac.max_sch_subpdus, 20);
        assert_eq!(cfg.mac.max_mch_subpdus, 30);
        assert_eq!(cfg.mac.max_rars, 8);
    }

    #[test]
    fn test_rejects_wrong_version() {
        let err = from_toml_str("config_version = \"0.5\"\n").unwrap_err();
        assert!(err.to_string().contains("Unrecognized config_version"));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = from_toml_str("config_version = \"0.1\"\nfoo = 1\n").unwrap_err();
        assert!(err.to_string().contains("foo"));

        let err = from_toml_str("config_version = \"0.1\"\n[mac]\nmax_rar = 3\nbar = 2\n").unwrap_err();
        assert_eq!(err.to_string(), "Unrecognized fields in mac: [\"bar\", \"max_rar\"]");
    }

    #[test]
    fn test_rejects_invalid_capacity() {
        let err = from_toml_str("config_version = \"0.1\"\n[mac]\nmax_rars = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_rars"));
    }
}
