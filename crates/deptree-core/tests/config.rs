use deptree_core::config::GlobalConfig;
use tempfile::TempDir;

#[test]
fn test_global_config_default_recurses_conflicts() {
    let config = GlobalConfig::default();
    assert!(config.tree.recurse_conflicts);
}

#[test]
fn test_global_config_default_has_no_paths_or_markers() {
    let config = GlobalConfig::default();
    assert!(config.environment.paths.is_empty());
    assert!(config.markers.is_empty());
}

#[test]
fn test_global_config_empty_toml_uses_defaults() {
    let config: GlobalConfig = toml::from_str("").unwrap();
    assert!(config.tree.recurse_conflicts);
}

#[test]
fn test_global_config_parse_from_toml() {
    let toml = r#"
[environment]
paths = ["/venv/lib/python3.11/site-packages", "/opt/extra"]

[markers]
python_version = "3.11"
sys_platform = "linux"

[tree]
recurse-conflicts = false
"#;
    let config: GlobalConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.environment.paths.len(), 2);
    assert!(config.environment.paths[0].ends_with("site-packages"));
    assert_eq!(config.markers.get("python_version").map(String::as_str), Some("3.11"));
    assert!(!config.tree.recurse_conflicts);
}

#[test]
fn test_from_path_missing_file_is_default() {
    let tmp = TempDir::new().unwrap();
    let config = GlobalConfig::from_path(&tmp.path().join("config.toml")).unwrap();
    assert!(config.tree.recurse_conflicts);
}

#[test]
fn test_from_path_reads_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[tree]\nrecurse-conflicts = false\n").unwrap();
    let config = GlobalConfig::from_path(&path).unwrap();
    assert!(!config.tree.recurse_conflicts);
}

#[test]
fn test_from_path_invalid_toml_is_config_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[tree\n").unwrap();
    let err = GlobalConfig::from_path(&path).unwrap_err();
    assert!(err.to_string().contains("Configuration error"), "got: {err}");
}
