use std::path::Path;

use deptree_core::key::ProjectKey;
use deptree_core::marker::MarkerEnvironment;
use deptree_metadata::provider::{MetadataProvider, Satisfaction};
use deptree_metadata::site_packages::{venv_site_packages, SitePackages};
use deptree_core::requirement::RequirementSpec;
use tempfile::TempDir;

fn write_dist_info(site: &Path, dir_name: &str, metadata: &str) {
    let dir = site.join(dir_name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("METADATA"), metadata).unwrap();
}

fn linux_env() -> MarkerEnvironment {
    let mut env = MarkerEnvironment::default();
    env.set("sys_platform", "linux");
    env.set("python_version", "3.11");
    env
}

#[test]
fn scans_dist_info_directories() {
    let tmp = TempDir::new().unwrap();
    write_dist_info(
        tmp.path(),
        "requests-2.31.0.dist-info",
        "Metadata-Version: 2.1\nName: requests\nVersion: 2.31.0\nRequires-Dist: idna (<4,>=2.5)\nRequires-Dist: PySocks (!=1.5.7,>=1.5.6) ; extra == 'socks'\nProvides-Extra: socks\n\nlong description\n",
    );
    write_dist_info(tmp.path(), "idna-3.6.dist-info", "Name: idna\nVersion: 3.6\n");
    std::fs::create_dir(tmp.path().join("requests")).unwrap();

    let sp = SitePackages::scan(&[tmp.path().to_path_buf()], linux_env()).unwrap();
    let names: Vec<&str> = sp.installed().iter().map(|d| d.project_name.as_str()).collect();
    assert_eq!(names, vec!["idna", "requests"]);

    let requests = sp.find(&ProjectKey::new("requests")).unwrap();
    assert_eq!(requests.requires_dist.len(), 2);
    assert!(requests.provides_extras.contains("socks"));

    let base = sp.requires(requests, &Default::default());
    assert_eq!(base.len(), 1);
    assert_eq!(base[0].to_string(), "idna<4,>=2.5");

    let with_socks = sp.requires(requests, &["socks".to_string()].into_iter().collect());
    assert_eq!(with_socks.len(), 2);
}

#[test]
fn scans_egg_info_directory_and_file() {
    let tmp = TempDir::new().unwrap();
    let egg = tmp.path().join("legacy-0.9-py3.11.egg-info");
    std::fs::create_dir(&egg).unwrap();
    std::fs::write(egg.join("PKG-INFO"), "Name: Legacy\nVersion: 0.9\n").unwrap();
    std::fs::write(egg.join("requires.txt"), "six\n\n[:sys_platform == \"win32\"]\npywin32\n").unwrap();
    std::fs::write(tmp.path().join("single-1.0.egg-info"), "Name: single\nVersion: 1.0\n").unwrap();

    let sp = SitePackages::scan(&[tmp.path().to_path_buf()], linux_env()).unwrap();
    let legacy = sp.find(&ProjectKey::new("legacy")).unwrap();
    assert_eq!(legacy.project_name, "Legacy");
    let reqs = sp.requires(legacy, &Default::default());
    let texts: Vec<String> = reqs.iter().map(ToString::to_string).collect();
    assert_eq!(texts, vec!["six"]);
    assert!(sp.find(&ProjectKey::new("single")).is_some());
}

#[test]
fn earlier_directory_shadows_later() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write_dist_info(first.path(), "lib-2.0.dist-info", "Name: lib\nVersion: 2.0\n");
    write_dist_info(second.path(), "lib-1.0.dist-info", "Name: lib\nVersion: 1.0\n");

    let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
    let sp = SitePackages::scan(&dirs, linux_env()).unwrap();
    assert_eq!(sp.installed().len(), 1);
    assert_eq!(sp.installed()[0].version, "2.0");
    assert_eq!(
        sp.installed()[0].location.as_deref(),
        Some(first.path().join("lib-2.0.dist-info").as_path())
    );
    assert_eq!(sp.dirs().len(), 2);
}

#[test]
fn metadata_without_headers_falls_back_to_directory_name() {
    let tmp = TempDir::new().unwrap();
    write_dist_info(tmp.path(), "nameless-3.1.dist-info", "Metadata-Version: 2.1\n");
    let sp = SitePackages::scan(&[tmp.path().to_path_buf()], linux_env()).unwrap();
    assert_eq!(sp.installed()[0].project_name, "nameless");
    assert_eq!(sp.installed()[0].version, "3.1");
}

#[test]
fn bad_requires_dist_lines_are_skipped() {
    let tmp = TempDir::new().unwrap();
    write_dist_info(
        tmp.path(),
        "app-1.0.dist-info",
        "Name: app\nVersion: 1.0\nRequires-Dist: ???\nRequires-Dist: lib\n",
    );
    let sp = SitePackages::scan(&[tmp.path().to_path_buf()], linux_env()).unwrap();
    assert_eq!(sp.installed()[0].requires_dist.len(), 1);
}

#[test]
fn satisfaction_reports_conflicts_and_missing() {
    let tmp = TempDir::new().unwrap();
    write_dist_info(tmp.path(), "lib-2.0.dist-info", "Name: lib\nVersion: 2.0\n");
    let sp = SitePackages::scan(&[tmp.path().to_path_buf()], linux_env()).unwrap();

    let ok = RequirementSpec::parse("lib>=1.5").unwrap();
    let conflict = RequirementSpec::parse("lib==1.0").unwrap();
    let missing = RequirementSpec::parse("other").unwrap();
    assert_eq!(sp.satisfaction(&ok), Satisfaction::Satisfied);
    assert_eq!(sp.satisfaction(&conflict), Satisfaction::VersionConflict);
    assert_eq!(sp.satisfaction(&missing), Satisfaction::NotFound);
}

#[test]
fn missing_directory_is_an_environment_error() {
    let tmp = TempDir::new().unwrap();
    let err = SitePackages::scan(&[tmp.path().join("nope")], linux_env()).unwrap_err();
    assert!(err.to_string().contains("Environment error"), "got: {err}");
}

#[test]
fn finds_virtualenv_site_packages() {
    let tmp = TempDir::new().unwrap();
    let sp = tmp.path().join("lib").join("python3.12").join("site-packages");
    std::fs::create_dir_all(&sp).unwrap();
    std::fs::create_dir_all(tmp.path().join("lib").join("other")).unwrap();
    assert_eq!(venv_site_packages(tmp.path()).unwrap(), vec![sp]);
}

#[test]
fn egg_info_sections_declare_extras() {
    let tmp = TempDir::new().unwrap();
    let egg = tmp.path().join("fetcher-1.0.egg-info");
    std::fs::create_dir(&egg).unwrap();
    std::fs::write(egg.join("PKG-INFO"), "Name: fetcher\nVersion: 1.0\n").unwrap();
    std::fs::write(
        egg.join("requires.txt"),
        "idna\n\n[Socks]\nPySocks>=1.5\n\n[:sys_platform == \"win32\"]\npywin32\n",
    )
    .unwrap();

    let sp = SitePackages::scan(&[tmp.path().to_path_buf()], linux_env()).unwrap();
    let fetcher = sp.find(&ProjectKey::new("fetcher")).unwrap();
    assert!(fetcher.provides_extras.contains("socks"));
    assert_eq!(fetcher.provides_extras.len(), 1);

    assert_eq!(sp.requires(fetcher, &Default::default()).len(), 1);
    let with_socks = sp.requires(fetcher, &["socks".to_string()].into_iter().collect());
    assert_eq!(with_socks.len(), 2);
    assert!(with_socks[1].to_string().starts_with("PySocks>=1.5"));
}
