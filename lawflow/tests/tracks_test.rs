//! Dependency track integration tests
//!
//! Builds tracks from organisation snapshots loaded as JSON, the way the
//! fetch layer hands them over, and checks the documented scenarios.

use lawbook::{Address, Dependency, Law, LawConfig, Organisation, Role};
use lawflow::{DependencyGraphBuilder, EngineConfig, LawflowError, OrganisationStore};

fn addr(n: u8) -> Address {
    Address::new([n; 20])
}

fn law(n: u8, name: &str, config: LawConfig) -> Law {
    Law {
        law: addr(n),
        name: name.to_string(),
        description: format!("{} law", name),
        allowed_role: Role::Numbered(1),
        config,
    }
}

fn needs(n: u8) -> LawConfig {
    LawConfig {
        need_completed: Dependency::On(addr(n)),
        ..Default::default()
    }
}

fn track_names(track: &[Law]) -> Vec<&str> {
    track.iter().map(|l| l.name.as_str()).collect()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_three_law_chain() {
    let laws = vec![
        law(0xa, "A", LawConfig::default()),
        law(0xb, "B", needs(0xa)),
        law(0xc, "C", needs(0xb)),
    ];

    let flow = DependencyGraphBuilder::new().build(&laws).unwrap();
    assert_eq!(flow.tracks.len(), 1);
    assert_eq!(track_names(&flow.tracks[0]), vec!["A", "B", "C"]);
    assert!(flow.orphans.is_empty());
}

#[test]
fn test_zero_dependencies_never_in_track() {
    let laws = vec![
        law(0xa, "A", LawConfig::default()),
        law(0xb, "B", needs(0xa)),
        law(0xd, "Standalone", LawConfig::default()),
    ];

    let flow = DependencyGraphBuilder::new().build(&laws).unwrap();
    assert_eq!(track_names(&flow.orphans), vec!["Standalone"]);
    assert!(flow.tracks.iter().all(|t| t.iter().all(|l| l.name != "Standalone")));
}

#[test]
fn test_two_ends_share_middle() {
    let laws = vec![
        law(0xa, "A", LawConfig::default()),
        law(0xb, "B", needs(0xa)),
        law(0xc, "C", needs(0xb)),
        law(0xe, "E", needs(0xb)),
    ];

    let flow = DependencyGraphBuilder::new().build(&laws).unwrap();
    assert_eq!(flow.tracks.len(), 2);
    for track in &flow.tracks {
        assert!(track.iter().any(|l| l.name == "B"));
    }
    assert_eq!(flow.tracks_containing(&addr(0xb)).len(), 2);
}

#[test]
fn test_cycle_reported() {
    let laws = vec![
        law(0xa, "A", needs(0xb)),
        law(0xb, "B", needs(0xa)),
    ];

    let result = DependencyGraphBuilder::new().build(&laws);
    assert!(matches!(result, Err(LawflowError::DependencyCycle { .. })));
}

// =============================================================================
// Snapshot wire format
// =============================================================================

#[test]
fn test_build_from_snapshot_json() {
    let zero = format!("0x{}", "0".repeat(40));
    let a = addr(0xa).to_string();
    let b = addr(0xb).to_string();
    let json = format!(
        r#"{{
  "address": "{org}",
  "name": "Test DAO",
  "laws": [],
  "activeLaws": [
    {{"law": "{a}", "name": "Nominate", "allowedRole": 4294967295,
      "config": {{"needCompleted": "{zero}", "needNotCompleted": "{zero}", "readStateFrom": "{zero}"}}}},
    {{"law": "{b}", "name": "Elect", "allowedRole": 0,
      "config": {{"quorum": 20, "needCompleted": "{a}", "needNotCompleted": "{zero}", "readStateFrom": "{zero}"}}}}
  ],
  "proposals": []
}}"#,
        org = addr(0xff),
    );

    let org = Organisation::from_json(&json).unwrap();
    assert_eq!(org.roles, vec![Role::Admin, Role::Public]);

    let store = OrganisationStore::new();
    store.replace(org);
    let snapshot = store.get(&addr(0xff)).unwrap();

    let config = EngineConfig::default();
    let flow = DependencyGraphBuilder::with_config(config.graph.clone())
        .build(&snapshot.active_laws)
        .unwrap();
    assert_eq!(track_names(&flow.tracks[0]), vec!["Nominate", "Elect"]);
    assert_eq!(flow.next_after(&addr(0xa)).unwrap().name, "Elect");

    let palette = config.role_palette().unwrap();
    let end = flow.tracks[0].last().unwrap();
    assert_eq!(palette.display(end.allowed_role).label, "Admin");
}
