use crate::migration_planning::domain::{package_key, BrokenEdge, PackageNode};
use std::collections::{HashMap, HashSet};

/// PackageIndex maps each unique package id to its expanded occurrence.
///
/// Shared-reference and cyclic occurrences carry no children, so graph
/// algorithms look packages up here to follow the real dependency edges.
pub struct PackageIndex<'a> {
    nodes: HashMap<String, &'a PackageNode>,
    /// Keys in pre-order discovery order
    order: Vec<String>,
}

/// Result of a depth-first post-order walk over the unique packages
pub struct PostOrder<'a> {
    /// Packages, dependencies before dependents
    pub nodes: Vec<&'a PackageNode>,
    /// Edges skipped because they closed a cycle
    pub broken_edges: Vec<BrokenEdge>,
}

impl<'a> PackageIndex<'a> {
    /// Indexes every occurrence reachable from `roots`
    pub fn build(roots: &'a [PackageNode]) -> Self {
        let mut index = Self {
            nodes: HashMap::new(),
            order: Vec::new(),
        };
        for root in roots {
            root.walk(&mut |node| index.insert(node));
        }
        index
    }

    fn insert(&mut self, node: &'a PackageNode) {
        let key = node.key();
        match self.nodes.get(&key) {
            None => {
                self.order.push(key.clone());
                self.nodes.insert(key, node);
            }
            Some(existing) if !existing.is_expanded() && node.is_expanded() => {
                self.nodes.insert(key, node);
            }
            Some(_) => {}
        }
    }

    /// Expanded occurrence of a package (case-insensitive)
    pub fn get(&self, id: &str) -> Option<&'a PackageNode> {
        self.nodes.get(&package_key(id)).copied()
    }

    /// Number of unique packages
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Unique packages in discovery order
    pub fn packages(&self) -> impl Iterator<Item = &'a PackageNode> + '_ {
        self.order.iter().filter_map(|key| self.nodes.get(key).copied())
    }

    /// Walks the unique packages depth-first, emitting each after its
    /// dependencies. A dependency that is still on the walk stack closes a
    /// cycle: the edge is skipped and reported instead.
    pub fn post_order(&self) -> PostOrder<'a> {
        let mut walk = PostOrderWalk {
            index: self,
            visited: HashSet::new(),
            visiting: HashSet::new(),
            result: PostOrder {
                nodes: Vec::with_capacity(self.len()),
                broken_edges: Vec::new(),
            },
        };
        for key in &self.order {
            walk.visit(key);
        }
        walk.result
    }
}

struct PostOrderWalk<'i, 'a> {
    index: &'i PackageIndex<'a>,
    visited: HashSet<String>,
    visiting: HashSet<String>,
    result: PostOrder<'a>,
}

impl<'a> PostOrderWalk<'_, 'a> {
    fn visit(&mut self, key: &str) {
        if self.visited.contains(key) {
            return;
        }
        let Some(node) = self.index.nodes.get(key).copied() else {
            return;
        };

        self.visiting.insert(key.to_string());
        for child in &node.dependencies {
            let child_key = child.key();
            if self.visiting.contains(&child_key) {
                self.result.broken_edges.push(BrokenEdge {
                    from: node.id.clone(),
                    to: child.id.clone(),
                });
                continue;
            }
            self.visit(&child_key);
        }
        self.visiting.remove(key);

        self.visited.insert(key.to_string());
        self.result.nodes.push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration_planning::services::test_support::{node, stub};

    fn ids(nodes: &[&PackageNode]) -> Vec<String> {
        nodes.iter().map(|n| n.id.clone()).collect()
    }

    #[test]
    fn test_index_prefers_expanded_occurrence() {
        let shared = node("Shared", &[], vec![node("Leaf", &[], vec![])]);
        // The stub is encountered before the expanded node
        let roots = vec![
            node("A", &[], vec![stub(&shared, "1.0.0")]),
            node("B", &[], vec![shared.clone()]),
        ];

        let index = PackageIndex::build(&roots);

        assert_eq!(index.len(), 4);
        let found = index.get("SHARED").unwrap();
        assert!(found.is_expanded());
        assert_eq!(found.dependencies.len(), 1);
    }

    #[test]
    fn test_discovery_order() {
        let roots = vec![
            node("A", &[], vec![node("C", &[], vec![])]),
            node("B", &[], vec![]),
        ];
        let index = PackageIndex::build(&roots);
        let found: Vec<&str> = index.packages().map(|n| n.id.as_str()).collect();
        assert_eq!(found, vec!["A", "C", "B"]);
    }

    #[test]
    fn test_post_order_puts_dependencies_first() {
        let shared = node("Shared", &[], vec![]);
        let roots = vec![
            node("A", &[], vec![node("B", &[], vec![shared.clone()])]),
            node("C", &[], vec![stub(&shared, "1.0.0")]),
        ];

        let order = PackageIndex::build(&roots).post_order();

        assert_eq!(ids(&order.nodes), vec!["Shared", "B", "A", "C"]);
        assert!(order.broken_edges.is_empty());
    }

    #[test]
    fn test_post_order_follows_stubs_to_expanded_node() {
        let shared = node("Shared", &[], vec![node("Leaf", &[], vec![])]);
        let roots = vec![
            node("A", &[], vec![stub(&shared, "1.0.0")]),
            node("B", &[], vec![shared.clone()]),
        ];

        let order = PackageIndex::build(&roots).post_order();

        assert_eq!(ids(&order.nodes), vec!["Leaf", "Shared", "A", "B"]);
    }

    #[test]
    fn test_cycle_is_broken_and_reported() {
        let cyclic_a = PackageNode::cyclic("A".to_string(), None, false, 2);
        let roots = vec![node("A", &[], vec![node("B", &[], vec![cyclic_a])])];

        let order = PackageIndex::build(&roots).post_order();

        assert_eq!(ids(&order.nodes), vec!["B", "A"]);
        assert_eq!(
            order.broken_edges,
            vec![BrokenEdge {
                from: "B".to_string(),
                to: "A".to_string(),
            }]
        );
    }

    #[test]
    fn test_empty_index() {
        let index = PackageIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index.post_order().nodes.is_empty());
    }
}
