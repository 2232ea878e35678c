use anyhow::Result;
use jsonsubschema_cli::{Cli, Commands, load_config, run_with_cli};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_schema(dir: &TempDir, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.path().join(name);
    fs::write(&path, content)?;
    Ok(path)
}

fn check_cli(lhs: &Path, rhs: &Path, config: Option<String>) -> Cli {
    Cli {
        verbose: 0,
        config,
        command: Commands::Check {
            lhs: lhs.to_string_lossy().into_owned(),
            rhs: rhs.to_string_lossy().into_owned(),
        },
    }
}

#[test]
fn test_run_check_command() -> Result<()> {
    let dir = TempDir::new()?;
    let lhs = write_schema(&dir, "lhs.json", r#"{"type": "integer", "minimum": 5}"#)?;
    let rhs = write_schema(&dir, "rhs.json", r#"{"type": "integer", "minimum": 1}"#)?;

    run_with_cli(check_cli(&lhs, &rhs, None))?;
    Ok(())
}

#[test]
fn test_run_equivalent_command() -> Result<()> {
    let dir = TempDir::new()?;
    let lhs = write_schema(&dir, "lhs.json", r#"{"type": "number", "multipleOf": 1}"#)?;
    let rhs = write_schema(&dir, "rhs.json", r#"{"type": "integer"}"#)?;

    let cli = Cli {
        verbose: 1,
        config: None,
        command: Commands::Equivalent {
            lhs: lhs.to_string_lossy().into_owned(),
            rhs: rhs.to_string_lossy().into_owned(),
        },
    };
    run_with_cli(cli)?;
    Ok(())
}

#[test]
fn test_run_check_with_malformed_schema_fails() -> Result<()> {
    let dir = TempDir::new()?;
    let lhs = write_schema(&dir, "lhs.json", r#"{"type": "number", "multipleOf": -0.5}"#)?;
    let rhs = write_schema(&dir, "rhs.json", r#"{"type": "number"}"#)?;

    let result = run_with_cli(check_cli(&lhs, &rhs, None));
    assert!(result.is_err_and(|e| e.to_string().contains("Malformed schema")));
    Ok(())
}

#[test]
fn test_run_check_with_missing_file_fails() -> Result<()> {
    let dir = TempDir::new()?;
    let rhs = write_schema(&dir, "rhs.json", "{}")?;
    let missing = dir.path().join("missing.json");

    assert!(run_with_cli(check_cli(&missing, &rhs, None)).is_err());
    Ok(())
}

#[test]
fn test_run_check_with_invalid_json_fails() -> Result<()> {
    let dir = TempDir::new()?;
    let lhs = write_schema(&dir, "lhs.json", "{not json")?;
    let rhs = write_schema(&dir, "rhs.json", "{}")?;

    assert!(run_with_cli(check_cli(&lhs, &rhs, None)).is_err());
    Ok(())
}

#[test]
fn test_config_disables_validation() -> Result<()> {
    let dir = TempDir::new()?;
    let config = write_schema(&dir, "config.json", r#"{"validate_schemas": false}"#)?;
    let lhs = write_schema(&dir, "lhs.json", r#"{"type": "array", "items": false}"#)?;
    let rhs = write_schema(&dir, "rhs.json", r#"{"type": "array", "maxItems": 0}"#)?;

    let config_path = Some(config.to_string_lossy().into_owned());
    run_with_cli(check_cli(&lhs, &rhs, config_path))?;
    assert!(run_with_cli(check_cli(&lhs, &rhs, None)).is_err());
    Ok(())
}

#[test]
fn test_load_config_explicit_path() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_schema(&dir, "config.json", r#"{"max_depth": 7}"#)?;

    let config = load_config(Some(&path))?;
    assert_eq!(config.max_depth, 7);
    assert!(config.validate_schemas);
    Ok(())
}

#[test]
fn test_load_config_rejects_bad_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_schema(&dir, "config.json", r#"{"max_depth": "deep"}"#)?;

    assert!(load_config(Some(&path)).is_err());
    assert!(load_config(Some(&dir.path().join("absent.json"))).is_err());
    Ok(())
}
