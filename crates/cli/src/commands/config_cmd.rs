//! `concierge config` — Configuration management commands.

use concierge_config::AppConfig;
use std::path::Path;

pub fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    println!("{}", toml::to_string_pretty(&config.redacted())?);
    Ok(())
}

pub fn init(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = AppConfig::config_dir().join("config.toml");
    if write_default(&path, force)? {
        println!("✅ Wrote default configuration to {}", path.display());
    } else {
        println!("  Config already exists at {}", path.display());
        println!("  Run with --force to overwrite it.");
    }
    Ok(())
}

/// Write the default TOML to `path`. Returns false if the file exists and
/// `force` is not set.
fn write_default(path: &Path, force: bool) -> std::io::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, AppConfig::default_toml())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_a_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(write_default(&path, false).unwrap());
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_provider, "cerebras");
        assert_eq!(config.routing.default_user_id, "samantha");
    }

    #[test]
    fn init_keeps_existing_file_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_model = \"llama-3.3-70b\"\n").unwrap();

        assert!(!write_default(&path, false).unwrap());
        assert!(std::fs::read_to_string(&path).unwrap().contains("llama"));

        assert!(write_default(&path, true).unwrap());
        assert!(!std::fs::read_to_string(&path).unwrap().contains("llama"));
    }
}
