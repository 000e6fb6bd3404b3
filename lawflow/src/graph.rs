//! Dependency graph builder - orders active laws into execution tracks.
//!
//! Laws reference each other through `needCompleted`, `needNotCompleted`
//! and `readStateFrom`. Laws that are only depended upon start a track,
//! laws that only declare dependencies end one, and laws with no relation at
//! all are orphans.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use lawbook::{Address, Law};

use crate::config::GraphConfig;
use crate::types::{LawflowError, Result};

/// Ordered execution tracks plus standalone laws.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    /// Each track reads start -> end, earliest-executable law first
    pub tracks: Vec<Vec<Law>>,
    pub orphans: Vec<Law>,
}

impl Flow {
    /// Every track that contains `law`.
    pub fn tracks_containing(&self, law: &Address) -> Vec<&[Law]> {
        self.tracks
            .iter()
            .filter(|track| track.iter().any(|l| &l.law == law))
            .map(Vec::as_slice)
            .collect()
    }

    /// The law following `law` in the first track that contains it.
    pub fn next_after(&self, law: &Address) -> Option<&Law> {
        self.tracks.iter().find_map(|track| {
            let pos = track.iter().position(|l| &l.law == law)?;
            track.get(pos + 1)
        })
    }

    pub fn is_orphan(&self, law: &Address) -> bool {
        self.orphans.iter().any(|l| &l.law == law)
    }
}

/// Active laws split by their place in the dependency relation.
#[derive(Debug, Clone, Default)]
pub struct Partition<'a> {
    /// Depended upon, no dependencies of their own
    pub start: Vec<&'a Law>,
    /// Depended upon and declaring dependencies
    pub middle: Vec<&'a Law>,
    /// Declaring dependencies, nothing depends on them
    pub end: Vec<&'a Law>,
    /// No relation at all
    pub orphans: Vec<&'a Law>,
}

/// Builds execution tracks from the active law set.
pub struct DependencyGraphBuilder {
    config: GraphConfig,
}

impl DependencyGraphBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Self { config }
    }

    /// Classify active laws. Input order is preserved within each group.
    pub fn partition(active_laws: &[Law]) -> Partition<'_> {
        let child_addrs: HashSet<Address> = active_laws
            .iter()
            .flat_map(|law| law.dependencies())
            .collect();

        let mut partition = Partition::default();
        for law in active_laws {
            let is_child = child_addrs.contains(&law.law);
            let is_parent = law.has_dependencies();
            match (is_child, is_parent) {
                (true, false) => partition.start.push(law),
                (true, true) => partition.middle.push(law),
                (false, true) => partition.end.push(law),
                (false, false) => partition.orphans.push(law),
            }
        }
        partition
    }

    /// Build tracks and orphans for `active_laws`.
    ///
    /// Each end law yields its own track: the middle laws it points at, then
    /// the start laws any of those point at, reversed into start -> end
    /// order. Tracks are not merged, so a shared law appears in each.
    pub fn build(&self, active_laws: &[Law]) -> Result<Flow> {
        if let Some(path) = find_cycle(active_laws) {
            if self.config.reject_cycles {
                warn!(cycle = ?path, "Rejected cyclic law dependencies");
                return Err(LawflowError::DependencyCycle { path });
            }
            warn!(cycle = ?path, "Building tracks despite cyclic law dependencies");
        }

        let partition = Self::partition(active_laws);

        let tracks: Vec<Vec<Law>> = partition
            .end
            .iter()
            .map(|&end| {
                let mut chain: Vec<&Law> = vec![end];
                chain.extend(partition.middle.iter().filter(|m| end.depends_on(&m.law)));

                let deps: HashSet<Address> =
                    chain.iter().flat_map(|law| law.dependencies()).collect();
                chain.extend(partition.start.iter().filter(|s| deps.contains(&s.law)));

                chain.into_iter().rev().cloned().collect()
            })
            .collect();

        info!(
            active = active_laws.len(),
            tracks = tracks.len(),
            orphans = partition.orphans.len(),
            "Built law dependency tracks"
        );

        Ok(Flow {
            tracks,
            orphans: partition.orphans.into_iter().cloned().collect(),
        })
    }
}

impl Default for DependencyGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// First dependency cycle among active laws, as a closed path.
fn find_cycle(active_laws: &[Law]) -> Option<Vec<Address>> {
    let by_addr: HashMap<Address, &Law> = active_laws.iter().map(|l| (l.law, l)).collect();
    let mut marks: HashMap<Address, Mark> = HashMap::new();
    let mut stack: Vec<Address> = Vec::new();

    fn visit(
        addr: Address,
        by_addr: &HashMap<Address, &Law>,
        marks: &mut HashMap<Address, Mark>,
        stack: &mut Vec<Address>,
    ) -> Option<Vec<Address>> {
        match marks.get(&addr) {
            Some(Mark::Done) => return None,
            Some(Mark::Visiting) => {
                let from = stack.iter().position(|a| *a == addr).unwrap_or(0);
                let mut path = stack[from..].to_vec();
                path.push(addr);
                return Some(path);
            }
            None => {}
        }

        marks.insert(addr, Mark::Visiting);
        stack.push(addr);
        if let Some(law) = by_addr.get(&addr) {
            for dep in law.dependencies() {
                // Dependencies outside the active set end the walk
                if by_addr.contains_key(&dep) {
                    if let Some(path) = visit(dep, by_addr, marks, stack) {
                        return Some(path);
                    }
                }
            }
        }
        stack.pop();
        marks.insert(addr, Mark::Done);
        None
    }

    active_laws
        .iter()
        .find_map(|law| visit(law.law, &by_addr, &mut marks, &mut stack))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lawbook::{Dependency, LawConfig, Role};

    fn addr(n: u8) -> Address {
        Address::new([n; 20])
    }

    fn law(n: u8, need_completed: Option<u8>) -> Law {
        Law {
            law: addr(n),
            name: format!("law-{}", n),
            description: String::new(),
            allowed_role: Role::Numbered(n as u64),
            config: LawConfig {
                need_completed: need_completed.map(addr).into(),
                ..Default::default()
            },
        }
    }

    fn names(track: &[Law]) -> Vec<&str> {
        track.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn test_linear_chain() {
        let laws = vec![law(1, None), law(2, Some(1)), law(3, Some(2))];
        let flow = DependencyGraphBuilder::new().build(&laws).unwrap();

        assert_eq!(flow.tracks.len(), 1);
        assert_eq!(names(&flow.tracks[0]), vec!["law-1", "law-2", "law-3"]);
        assert!(flow.orphans.is_empty());
        assert_eq!(flow.next_after(&addr(2)).unwrap().name, "law-3");
        assert!(flow.next_after(&addr(3)).is_none());
    }

    #[test]
    fn test_partition_groups() {
        let laws = vec![law(1, None), law(2, Some(1)), law(3, Some(2)), law(4, None)];
        let partition = DependencyGraphBuilder::partition(&laws);

        assert_eq!(partition.start.len(), 1);
        assert_eq!(partition.middle[0].law, addr(2));
        assert_eq!(partition.end[0].law, addr(3));
        assert_eq!(partition.orphans[0].law, addr(4));
    }

    #[test]
    fn test_no_dependencies_is_orphan() {
        let laws = vec![law(1, None), law(2, None)];
        let flow = DependencyGraphBuilder::new().build(&laws).unwrap();
        assert!(flow.tracks.is_empty());
        assert_eq!(flow.orphans.len(), 2);
        assert!(flow.is_orphan(&addr(1)));
    }

    #[test]
    fn test_shared_middle_is_duplicated() {
        let laws = vec![law(1, None), law(2, Some(1)), law(3, Some(2)), law(4, Some(2))];
        let flow = DependencyGraphBuilder::new().build(&laws).unwrap();

        assert_eq!(flow.tracks.len(), 2);
        assert_eq!(names(&flow.tracks[0]), vec!["law-1", "law-2", "law-3"]);
        assert_eq!(names(&flow.tracks[1]), vec!["law-1", "law-2", "law-4"]);
        assert_eq!(flow.tracks_containing(&addr(2)).len(), 2);
    }

    #[test]
    fn test_fan_in_accumulates() {
        let mut end = law(5, Some(2));
        end.config.need_not_completed = Dependency::On(addr(3));
        let laws = vec![law(1, None), law(2, Some(1)), law(3, Some(1)), end];

        let flow = DependencyGraphBuilder::new().build(&laws).unwrap();
        assert_eq!(flow.tracks.len(), 1);
        assert_eq!(names(&flow.tracks[0]), vec!["law-1", "law-3", "law-2", "law-5"]);
    }

    #[test]
    fn test_missing_links_shorten_track() {
        // Depends on a law that is not active
        let laws = vec![law(2, Some(9))];
        let flow = DependencyGraphBuilder::new().build(&laws).unwrap();
        assert_eq!(names(&flow.tracks[0]), vec!["law-2"]);

        // End directly on a start law
        let laws = vec![law(1, None), law(2, Some(1))];
        let flow = DependencyGraphBuilder::new().build(&laws).unwrap();
        assert_eq!(names(&flow.tracks[0]), vec!["law-1", "law-2"]);
    }

    #[test]
    fn test_read_state_from_links() {
        let mut reader = law(2, None);
        reader.config.read_state_from = Dependency::On(addr(1));
        let flow = DependencyGraphBuilder::new().build(&[law(1, None), reader]).unwrap();
        assert_eq!(names(&flow.tracks[0]), vec!["law-1", "law-2"]);
    }

    #[test]
    fn test_cycle_rejected() {
        let laws = vec![law(1, Some(2)), law(2, Some(1)), law(3, None)];
        let err = DependencyGraphBuilder::new().build(&laws).unwrap_err();
        match err {
            LawflowError::DependencyCycle { path } => {
                assert_eq!(path, vec![addr(1), addr(2), addr(1)]);
            }
            other => panic!("unexpected error: {other}"),
        }

        let self_loop = vec![law(4, Some(4))];
        assert!(DependencyGraphBuilder::new().build(&self_loop).is_err());
    }

    #[test]
    fn test_cycle_tolerated_when_configured() {
        let laws = vec![law(1, Some(2)), law(2, Some(1)), law(3, None)];
        let builder = DependencyGraphBuilder::with_config(GraphConfig { reject_cycles: false });
        let flow = builder.build(&laws).unwrap();

        // Both cyclic laws are middle laws; no end law means no track
        assert!(flow.tracks.is_empty());
        assert_eq!(names(&flow.orphans), vec!["law-3"]);
    }
}
