//! Building and walking the category forest

use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::model::{Category, CategoryNode};

/// ツリー構築エラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Category {id} is part of a parent cycle")]
    Cycle { id: String },

    #[error("Duplicate category id: {id}")]
    DuplicateId { id: String },
}

/// Nest a flat category list under `parent_id` (`None` for the roots).
///
/// Categories whose parent is not in `list` are left out of the result.
/// Parent cycles are reported as [`TreeError::Cycle`].
pub fn build_category_tree(
    list: &[Category],
    parent_id: Option<&str>,
) -> Result<Vec<CategoryNode>, TreeError> {
    let parents = parent_index(list)?;
    check_parent_chains(&parents)?;

    let mut visited = HashSet::new();
    let forest = build_level(list, parent_id, &mut visited)?;

    if parent_id.is_none() && visited.len() < list.len() {
        for category in list.iter().filter(|c| !visited.contains(c.id.as_str())) {
            log::warn!(
                "category {} references missing parent {:?}",
                category.id,
                category.parent_id()
            );
        }
    }

    Ok(forest)
}

fn parent_index(list: &[Category]) -> Result<HashMap<&str, Option<&str>>, TreeError> {
    let mut parents = HashMap::with_capacity(list.len());
    for category in list {
        if parents
            .insert(category.id.as_str(), category.parent_id())
            .is_some()
        {
            return Err(TreeError::DuplicateId {
                id: category.id.clone(),
            });
        }
    }
    Ok(parents)
}

// Walks every parent chain once; chains already proven acyclic are not revisited.
fn check_parent_chains(parents: &HashMap<&str, Option<&str>>) -> Result<(), TreeError> {
    let mut acyclic: HashSet<&str> = HashSet::new();

    for &start in parents.keys() {
        let mut chain: Vec<&str> = Vec::new();
        let mut on_chain: HashSet<&str> = HashSet::new();
        let mut current = Some(start);

        while let Some(id) = current {
            if acyclic.contains(id) {
                break;
            }
            if !on_chain.insert(id) {
                return Err(TreeError::Cycle { id: id.to_string() });
            }
            chain.push(id);
            current = parents.get(id).copied().flatten().filter(|p| parents.contains_key(p));
        }

        acyclic.extend(chain);
    }

    Ok(())
}

fn build_level<'a>(
    list: &'a [Category],
    parent_id: Option<&str>,
    visited: &mut HashSet<&'a str>,
) -> Result<Vec<CategoryNode>, TreeError> {
    let mut nodes = Vec::new();

    for category in list.iter().filter(|c| c.parent_id() == parent_id) {
        if !visited.insert(category.id.as_str()) {
            return Err(TreeError::Cycle {
                id: category.id.clone(),
            });
        }
        let children = build_level(list, Some(category.id.as_str()), visited)?;
        nodes.push(CategoryNode {
            category: category.clone(),
            children,
        });
    }

    Ok(nodes)
}

/// Flatten a forest back into a list, parents before children
pub fn flatten_tree(forest: &[CategoryNode]) -> Vec<Category> {
    let mut flat = Vec::new();
    let mut stack: Vec<&CategoryNode> = forest.iter().rev().collect();

    while let Some(node) = stack.pop() {
        flat.push(node.category.clone());
        stack.extend(node.children.iter().rev());
    }

    flat
}

/// Total number of nodes in a forest
pub fn count_nodes(forest: &[CategoryNode]) -> usize {
    forest.iter().map(CategoryNode::len).sum()
}

/// Ids of every category below `id`
pub fn descendant_ids(list: &[Category], id: &str) -> HashSet<String> {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for category in list {
        if let Some(parent) = category.parent_id() {
            children.entry(parent).or_default().push(category.id.as_str());
        }
    }

    let mut found = HashSet::new();
    let mut pending = vec![id];
    while let Some(current) = pending.pop() {
        for &child in children.get(current).map(Vec::as_slice).unwrap_or_default() {
            if child != id && found.insert(child.to_string()) {
                pending.push(child);
            }
        }
    }

    found
}

/// Whether giving `id` the parent `new_parent` would close a loop
pub fn would_create_cycle(list: &[Category], id: &str, new_parent: Option<&str>) -> bool {
    match new_parent {
        None => false,
        Some(parent) if parent == id => true,
        Some(parent) => descendant_ids(list, id).contains(parent),
    }
}

/// Categories that may be chosen as parent for the one being edited
pub fn parent_options<'a>(list: &'a [Category], editing: Option<&str>) -> Vec<&'a Category> {
    match editing {
        None => list.iter().collect(),
        Some(id) => {
            let excluded = descendant_ids(list, id);
            list.iter()
                .filter(|c| c.id != id && !excluded.contains(&c.id))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Category> {
        vec![
            Category::new("shoes", "Shoes", None),
            Category::new("boots", "Boots", Some("shoes")),
            Category::new("hiking", "Hiking Boots", Some("boots")),
            Category::new("sneakers", "Sneakers", Some("shoes")),
            Category::new("bags", "Bags", None),
        ]
    }

    fn assert_children_point_at_parent(nodes: &[CategoryNode]) {
        for node in nodes {
            for child in &node.children {
                assert_eq!(child.category.parent_id(), Some(node.category.id.as_str()));
            }
            assert_children_point_at_parent(&node.children);
        }
    }

    #[test]
    fn test_build_tree() {
        let list = sample();
        let forest = build_category_tree(&list, None).unwrap();

        assert_eq!(forest.len(), 2);
        assert_eq!(count_nodes(&forest), list.len());
        assert_children_point_at_parent(&forest);

        let shoes = &forest[0];
        assert_eq!(shoes.category.id, "shoes");
        assert_eq!(shoes.children.len(), 2);
        assert_eq!(shoes.children[0].children[0].category.id, "hiking");
    }

    fn chain(len: usize) -> Vec<Category> {
        (0..len)
            .map(|i| {
                let parent = if i == 0 { None } else { Some(format!("c{}", i - 1)) };
                Category::new(&format!("c{}", i), &format!("Level {}", i), parent.as_deref())
            })
            .collect()
    }

    fn fan(width: usize) -> Vec<Category> {
        let mut list = vec![Category::new("root", "Root", None)];
        list.extend((0..width).map(|i| Category::new(&format!("leaf{}", i), "Leaf", Some("root"))));
        list
    }

    // Every node i > 2 hangs under i / 3, with three roots
    fn bushy(len: usize) -> Vec<Category> {
        (0..len)
            .map(|i| {
                let parent = if i < 3 { None } else { Some(format!("n{}", i / 3)) };
                Category::new(&format!("n{}", i), "Node", parent.as_deref())
            })
            .collect()
    }

    fn permuted(list: &[Category], stride: usize) -> Vec<Category> {
        let n = list.len();
        (0..n).map(|i| list[(i * stride) % n].clone()).collect()
    }

    #[test]
    fn test_build_tree_generated_lists() {
        let mut reversed = bushy(40);
        reversed.reverse();
        let cases = vec![
            chain(60),
            permuted(&chain(61), 7),
            fan(45),
            permuted(&fan(44), 7),
            bushy(40),
            reversed,
            permuted(&bushy(41), 11),
        ];

        for list in cases {
            let forest = build_category_tree(&list, None).unwrap();
            let roots = list.iter().filter(|c| c.parent_id().is_none()).count();

            assert_eq!(count_nodes(&forest), list.len());
            assert_eq!(forest.len(), roots);
            assert_children_point_at_parent(&forest);
            for node in &forest {
                assert_eq!(node.category.parent_id(), None);
            }
        }
    }

    #[test]
    fn test_build_tree_empty() {
        assert_eq!(build_category_tree(&[], None).unwrap(), Vec::new());
    }

    #[test]
    fn test_build_subtree() {
        let forest = build_category_tree(&sample(), Some("boots")).unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].category.id, "hiking");
    }

    #[test]
    fn test_build_tree_idempotent() {
        let list = sample();
        let first = build_category_tree(&list, None).unwrap();
        let second = build_category_tree(&flatten_tree(&first), None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cycle_detected() {
        let list = vec![
            Category::new("a", "A", Some("b")),
            Category::new("b", "B", Some("a")),
            Category::new("root", "Root", None),
        ];
        assert!(matches!(
            build_category_tree(&list, None),
            Err(TreeError::Cycle { .. })
        ));
        assert!(matches!(
            build_category_tree(&list, Some("a")),
            Err(TreeError::Cycle { .. })
        ));

        let self_parent = vec![Category::new("a", "A", Some("a"))];
        assert_eq!(
            build_category_tree(&self_parent, None),
            Err(TreeError::Cycle { id: "a".to_string() })
        );
    }

    #[test]
    fn test_duplicate_id() {
        let list = vec![Category::new("a", "A", None), Category::new("a", "A2", None)];
        assert_eq!(
            build_category_tree(&list, None),
            Err(TreeError::DuplicateId { id: "a".to_string() })
        );
    }

    #[test]
    fn test_orphans_skipped() {
        let list = vec![
            Category::new("a", "A", None),
            Category::new("b", "B", Some("gone")),
        ];
        let forest = build_category_tree(&list, None).unwrap();
        assert_eq!(count_nodes(&forest), 1);
    }

    #[test]
    fn test_flatten_order() {
        let forest = build_category_tree(&sample(), None).unwrap();
        let ids: Vec<_> = flatten_tree(&forest).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["shoes", "boots", "hiking", "sneakers", "bags"]);
    }

    #[test]
    fn test_would_create_cycle() {
        let list = sample();
        assert!(would_create_cycle(&list, "shoes", Some("shoes")));
        assert!(would_create_cycle(&list, "shoes", Some("hiking")));
        assert!(!would_create_cycle(&list, "boots", Some("bags")));
        assert!(!would_create_cycle(&list, "boots", None));
    }

    #[test]
    fn test_parent_options_exclude_descendants() {
        let list = sample();
        let ids: Vec<_> = parent_options(&list, Some("shoes"))
            .into_iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["bags"]);
        assert_eq!(parent_options(&list, None).len(), list.len());
    }
}
