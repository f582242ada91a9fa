mod summary;

pub use summary::{NamedBlockRef, Summary};

use crate::ast::{Block, Node};

/// Read-only visitor over a parsed tree
pub trait Visitor {
    /// Called before visiting children. Return `false` to skip children.
    fn enter(&mut self, _node: &Node) -> bool {
        true
    }

    /// Called after visiting children.
    fn exit(&mut self, _node: &Node) {}
}

/// Visit every node under `root` depth-first, in source order
pub fn walk(root: &Block, visitor: &mut dyn Visitor) {
    visit_nodes(&root.nodes, visitor);
}

fn visit_nodes(nodes: &[Node], visitor: &mut dyn Visitor) {
    for node in nodes {
        if visitor.enter(node) {
            match node {
                Node::Block(block) => visit_nodes(&block.nodes, visitor),
                Node::NamedBlock(named) => visit_nodes(&named.nodes, visitor),
                Node::Tag(tag) => {
                    if let Some(code) = &tag.code {
                        visit_nodes(std::slice::from_ref(&**code), visitor);
                    }
                    visit_nodes(&tag.block.nodes, visitor);
                }
                Node::Mixin(mixin) => visit_optional(mixin.block.as_ref(), visitor),
                Node::Code(code) => visit_optional(code.block.as_ref(), visitor),
                Node::Case(case) => visit_nodes(&case.block.nodes, visitor),
                Node::When(when) => visit_optional(when.block.as_ref(), visitor),
                Node::Each(each) => {
                    visit_nodes(&each.block.nodes, visitor);
                    visit_optional(each.alternative.as_ref(), visitor);
                }
                Node::Include(include) => visit_nodes(&include.block.nodes, visitor),
                Node::BlockComment(comment) => visit_nodes(&comment.block.nodes, visitor),
                Node::Filter(filter) => visit_nodes(&filter.block.nodes, visitor),
                // Leaf nodes
                Node::Text(_)
                | Node::MixinBlock(_)
                | Node::Extends(_)
                | Node::Comment(_)
                | Node::Doctype(_) => {}
            }
        }
        visitor.exit(node);
    }
}

fn visit_optional(block: Option<&Block>, visitor: &mut dyn Visitor) {
    if let Some(block) = block {
        visit_nodes(&block.nodes, visitor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{JadeParser, Parser, Token};

    /// Records `type_name` on enter and `/type_name` on exit
    struct Trace {
        events: Vec<String>,
        skip: &'static str,
    }

    impl Visitor for Trace {
        fn enter(&mut self, node: &Node) -> bool {
            self.events.push(node.type_name().to_string());
            node.type_name() != self.skip
        }

        fn exit(&mut self, node: &Node) {
            self.events.push(format!("/{}", node.type_name()));
        }
    }

    fn tree() -> Block {
        let tokens = vec![
            Token::tag("ul", 1),
            Token::Indent { line: 2, val: 2 },
            Token::Each { line: 2, val: "item".to_string(), key: None, code: "items".to_string() },
            Token::Indent { line: 3, val: 4 },
            Token::tag("li", 3),
            Token::code("item", 3),
            Token::Outdent { line: 4 },
            Token::Code {
                line: 4,
                val: "else".to_string(),
                buffer: false,
                escape: false,
                is_else: true,
                is_if: false,
                has_if: false,
                requires_block: true,
            },
            Token::Indent { line: 5, val: 4 },
            Token::text("none", 5),
            Token::Outdent { line: 6 },
            Token::Outdent { line: 6 },
        ];
        JadeParser::new().parse(tokens).unwrap().root
    }

    #[test]
    fn test_walk_order() {
        let mut trace = Trace { events: Vec::new(), skip: "" };
        walk(&tree(), &mut trace);
        assert_eq!(
            trace.events,
            ["Tag", "Each", "Tag", "Code", "/Code", "/Tag", "Text", "/Text", "/Each", "/Tag"]
        );
    }

    #[test]
    fn test_skip_children() {
        let mut trace = Trace { events: Vec::new(), skip: "Each" };
        walk(&tree(), &mut trace);
        assert_eq!(trace.events, ["Tag", "Each", "/Each", "/Tag"]);
    }
}
