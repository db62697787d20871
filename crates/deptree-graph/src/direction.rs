//! Reading the graph forward (towards dependencies) or in reverse (towards
//! dependents).

use deptree_core::distribution::Distributions;
use deptree_core::key::ProjectKey;
use deptree_core::requirement::Requirement;
use deptree_util::errors::DeptreeError;
use petgraph::graph::NodeIndex;
use petgraph::visit::{Dfs, Reversed, VisitMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    pub fn from_reverse(reverse: bool) -> Self {
        if reverse {
            Self::Reverse
        } else {
            Self::Forward
        }
    }

    pub fn is_reverse(self) -> bool {
        self == Self::Reverse
    }

    /// Edge direction in the underlying graph, where `a -> b` means `a`
    /// requires `b`.
    pub fn edge_direction(self) -> petgraph::Direction {
        match self {
            Self::Forward => petgraph::Direction::Outgoing,
            Self::Reverse => petgraph::Direction::Incoming,
        }
    }

    /// The key a requirement leads to in this direction.
    pub fn target(self, requirement: &Requirement) -> Result<&ProjectKey, DeptreeError> {
        match self {
            Self::Forward => requirement
                .dependency_key
                .as_ref()
                .ok_or_else(|| DeptreeError::InvalidForwardRequirement {
                    requirement: requirement.to_string(),
                }),
            Self::Reverse => requirement
                .dependent_key
                .as_ref()
                .ok_or_else(|| DeptreeError::InvalidReverseRequirement {
                    requirement: requirement.to_string(),
                }),
        }
    }

    /// A synthetic root requirement for `key`.
    pub fn root(self, key: &ProjectKey) -> Requirement {
        Requirement::root(key, self.is_reverse())
    }

    /// Edges leaving `key`: its declared requirements going forward, or the
    /// requirement each dependent declares on it going in reverse.
    pub fn edges<'g>(self, graph: &'g Distributions, key: &ProjectKey) -> Vec<&'g Requirement> {
        graph.requirements(key, self.edge_direction())
    }

    /// Continue `dfs` from `start`, returning the nodes it had not reached
    /// before.
    pub fn walk<VM>(self, graph: &Distributions, dfs: &mut Dfs<NodeIndex, VM>, start: NodeIndex) -> Vec<NodeIndex>
    where
        VM: VisitMap<NodeIndex>,
    {
        dfs.move_to(start);
        let mut reached = Vec::new();
        loop {
            let next = match self {
                Self::Forward => dfs.next(graph.graph()),
                Self::Reverse => dfs.next(Reversed(graph.graph())),
            };
            match next {
                Some(idx) => reached.push(idx),
                None => return reached,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deptree_core::requirement::RequirementSpec;

    fn link(graph: &mut Distributions, from: &str, to: &str) {
        let (a, b) = (ProjectKey::new(from), ProjectKey::new(to));
        let spec = RequirementSpec::parse(to).unwrap();
        graph.add_requirement(&a, &b, Requirement::edge(a.clone(), &spec));
    }

    fn keys(graph: &Distributions, reached: Vec<NodeIndex>) -> Vec<&str> {
        reached.into_iter().map(|idx| graph.node(idx).key.as_str()).collect()
    }

    #[test]
    fn targets_follow_direction() {
        let lib = ProjectKey::new("lib");
        let forward = Requirement::forward_root(&lib);
        let reverse = Requirement::reverse_root(&lib);
        assert_eq!(Direction::Forward.target(&forward).unwrap(), &lib);
        assert_eq!(Direction::Reverse.target(&reverse).unwrap(), &lib);
        assert!(matches!(
            Direction::Forward.target(&reverse),
            Err(DeptreeError::InvalidForwardRequirement { .. })
        ));
        assert!(matches!(
            Direction::Reverse.target(&forward),
            Err(DeptreeError::InvalidReverseRequirement { .. })
        ));
    }

    #[test]
    fn reverse_edges_are_the_dependents_declarations() {
        let mut graph = Distributions::new();
        link(&mut graph, "app", "lib>=1");
        let edges = Direction::Reverse.edges(&graph, &ProjectKey::new("lib"));
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].display_form, "lib>=1");
        assert_eq!(Direction::Forward.edges(&graph, &ProjectKey::new("app")), edges);
        assert!(Direction::Forward.edges(&graph, &ProjectKey::new("nope")).is_empty());
    }

    #[test]
    fn walks_share_the_visited_set() {
        let mut graph = Distributions::new();
        link(&mut graph, "app", "lib");
        link(&mut graph, "lib", "app");
        link(&mut graph, "tool", "lib");
        let idx = |name: &str| graph.node_index(&ProjectKey::new(name)).unwrap();

        let mut dfs = Dfs::empty(graph.graph());
        let mut first = keys(&graph, Direction::Forward.walk(&graph, &mut dfs, idx("app")));
        first.sort();
        assert_eq!(first, vec!["app", "lib"]);
        assert_eq!(keys(&graph, Direction::Forward.walk(&graph, &mut dfs, idx("tool"))), vec!["tool"]);
        assert!(Direction::Forward.walk(&graph, &mut dfs, idx("lib")).is_empty());

        let mut dfs = Dfs::empty(graph.graph());
        let mut reverse = keys(&graph, Direction::Reverse.walk(&graph, &mut dfs, idx("lib")));
        reverse.sort();
        assert_eq!(reverse, vec!["app", "lib", "tool"]);
    }
}
