use deptree_core::key::ProjectKey;
use deptree_core::marker::MarkerEnvironment;
use deptree_core::requirement::{Requirement, RequirementSpec, PLACEHOLDER};

#[test]
fn parse_bare_name() {
    let spec = RequirementSpec::parse("Requests").unwrap();
    assert_eq!(spec.name, "Requests");
    assert_eq!(spec.key, ProjectKey::new("requests"));
    assert!(spec.extras.is_empty());
    assert!(spec.specifiers.is_empty());
    assert!(spec.marker.is_none());
    assert_eq!(spec.to_string(), "Requests");
}

#[test]
fn parse_extras_specifiers_and_marker() {
    let spec = RequirementSpec::parse("urllib3[socks, brotli] (<3, >=1.21.1) ; python_version >= '3.7'").unwrap();
    assert_eq!(spec.key.as_str(), "urllib3");
    assert_eq!(spec.extras.iter().cloned().collect::<Vec<_>>(), vec!["brotli", "socks"]);
    assert!(spec.specifiers.matches("2.0.7"));
    assert!(!spec.specifiers.matches("3.0"));
    assert_eq!(
        spec.to_string(),
        "urllib3[brotli,socks]<3,>=1.21.1; python_version >= \"3.7\""
    );
}

#[test]
fn parse_marker_with_extra() {
    let spec = RequirementSpec::parse("PySocks!=1.5.7,>=1.5.6; extra == \"socks\"").unwrap();
    let marker = spec.marker.unwrap();
    assert!(marker.evaluate(&MarkerEnvironment::default(), "socks"));
    assert!(!marker.evaluate(&MarkerEnvironment::default(), ""));
}

#[test]
fn parse_url_requirement() {
    let spec = RequirementSpec::parse("pip @ https://example.com/pip.whl ; os_name == 'posix'").unwrap();
    assert_eq!(spec.url.as_deref(), Some("https://example.com/pip.whl"));
    assert!(spec.specifiers.is_empty());
    assert_eq!(spec.to_string(), "pip @ https://example.com/pip.whl ; os_name == \"posix\"");
}

#[test]
fn parse_rejects_malformed() {
    assert!(RequirementSpec::parse("").is_err());
    assert!(RequirementSpec::parse(">=1.0").is_err());
    assert!(RequirementSpec::parse("lib[extra").is_err());
    assert!(RequirementSpec::parse("lib>=").is_err());
    assert!(RequirementSpec::parse("lib;").is_err());
    assert!(RequirementSpec::parse("lib @").is_err());
}

#[test]
fn edge_carries_both_keys_and_display_form() {
    let spec = RequirementSpec::parse("lib[fast]==1.0").unwrap();
    let edge = Requirement::edge(ProjectKey::new("app"), &spec);
    assert_eq!(edge.dependent_key, Some(ProjectKey::new("app")));
    assert_eq!(edge.dependency_key, Some(ProjectKey::new("lib")));
    assert!(edge.extras.contains("fast"));
    assert_eq!(edge.to_string(), "lib[fast]==1.0");
}

#[test]
fn synthetic_roots() {
    let key = ProjectKey::new("Lib");
    let forward = Requirement::root(&key, false);
    assert_eq!(forward.dependent_key, None);
    assert_eq!(forward.dependency_key, Some(key.clone()));
    assert_eq!(forward.display_form, "lib");

    let reverse = Requirement::root(&key, true);
    assert_eq!(reverse.dependent_key, Some(key));
    assert_eq!(reverse.dependency_key, None);
    assert_eq!(reverse.display_form, PLACEHOLDER);
}

#[test]
fn user_root_keeps_extras_and_text() {
    let spec = RequirementSpec::parse("requests[socks]>=2").unwrap();
    let root = Requirement::user_root(&spec);
    assert_eq!(root.dependent_key, None);
    assert_eq!(root.dependency_key, Some(ProjectKey::new("requests")));
    assert!(root.extras.contains("socks"));
    assert_eq!(root.display_form, "requests[socks]>=2");
}
