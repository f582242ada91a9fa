use super::{Visitor, walk};
use crate::ast::{Block, BlockMode, Node};
use serde::Serialize;

/// What a template defines and depends on, collected after parsing.
///
/// Names are listed once each, in order of first appearance. Nothing is
/// resolved; paths are reported as written.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub mixins_defined: Vec<String>,
    pub mixins_called: Vec<String>,
    pub named_blocks: Vec<NamedBlockRef>,
    pub extends: Option<String>,
    pub includes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedBlockRef {
    pub name: String,
    pub mode: BlockMode,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collect(root: &Block) -> Self {
        let mut summary = Self::new();
        walk(root, &mut summary);
        summary
    }

    pub fn defines_mixin(&self, name: &str) -> bool {
        self.mixins_defined.iter().any(|defined| defined == name)
    }

    /// Mixins called here without a definition in the same tree
    pub fn undefined_mixins(&self) -> Vec<&str> {
        self.mixins_called
            .iter()
            .filter(|name| !self.defines_mixin(name))
            .map(String::as_str)
            .collect()
    }
}

impl Visitor for Summary {
    fn enter(&mut self, node: &Node) -> bool {
        match node {
            Node::Mixin(mixin) if mixin.call => push_unique(&mut self.mixins_called, &mixin.name),
            Node::Mixin(mixin) => push_unique(&mut self.mixins_defined, &mixin.name),
            Node::NamedBlock(named) => {
                let entry = NamedBlockRef { name: named.name.clone(), mode: named.mode };
                if !self.named_blocks.contains(&entry) {
                    self.named_blocks.push(entry);
                }
            }
            Node::Extends(extends) => {
                if self.extends.is_none() {
                    self.extends = Some(extends.path.clone());
                }
            }
            Node::Include(include) => push_unique(&mut self.includes, &include.path),
            _ => {}
        }
        true
    }
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|existing| existing == name) {
        names.push(name.to_string());
    }
}
