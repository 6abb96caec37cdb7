//! Tree projection of the idea list for display.
//!
//! The tree is rebuilt wholesale after every mutation; it carries no
//! expansion state of its own. `ExpansionState` is kept by the view and
//! reconciled against each new tree.

use std::collections::HashSet;

use crate::models::{FeatureId, Idea, IdeaId};

/// What a display node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Idea(IdeaId),
    Feature { idea: IdeaId, feature: FeatureId },
}

/// A node in the display tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub label: String,
    pub kind: NodeKind,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Builds one root per idea and one leaf per feature, in list order
pub fn build_tree(ideas: &[Idea]) -> Vec<TreeNode> {
    ideas
        .iter()
        .map(|idea| TreeNode {
            label: idea.name.clone(),
            kind: NodeKind::Idea(idea.id),
            children: idea
                .features
                .iter()
                .map(|feature| TreeNode {
                    label: feature.text.clone(),
                    kind: NodeKind::Feature {
                        idea: idea.id,
                        feature: feature.id,
                    },
                    children: Vec::new(),
                })
                .collect(),
        })
        .collect()
}

/// Position of the first root whose label is `name`
pub fn root_position_by_name(tree: &[TreeNode], name: &str) -> Option<usize> {
    tree.iter().position(|node| node.label == name)
}

/// Set of expanded idea nodes, carried across rebuilds by id
#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
    expanded: HashSet<IdeaId>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, idea: IdeaId) -> bool {
        self.expanded.contains(&idea)
    }

    pub fn set_expanded(&mut self, idea: IdeaId, expanded: bool) {
        if expanded {
            self.expanded.insert(idea);
        } else {
            self.expanded.remove(&idea);
        }
    }

    /// Expands the first root labelled `name`; returns whether one was found
    pub fn expand_by_name(&mut self, tree: &[TreeNode], name: &str) -> bool {
        self.expand_at(tree, root_position_by_name(tree, name))
    }

    /// Expands the root at `position` in the current tree
    pub fn expand_at_position(&mut self, tree: &[TreeNode], position: usize) -> bool {
        self.expand_at(tree, Some(position))
    }

    fn expand_at(&mut self, tree: &[TreeNode], position: Option<usize>) -> bool {
        match position.and_then(|p| tree.get(p)).map(|node| node.kind) {
            Some(NodeKind::Idea(id)) => {
                self.expanded.insert(id);
                true
            }
            _ => false,
        }
    }

    /// Forgets ideas that are no longer present in `tree`
    pub fn retain_existing(&mut self, tree: &[TreeNode]) {
        let present: HashSet<IdeaId> = tree
            .iter()
            .filter_map(|node| match node.kind {
                NodeKind::Idea(id) => Some(id),
                NodeKind::Feature { .. } => None,
            })
            .collect();
        self.expanded.retain(|id| present.contains(id));
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}
