use serde::{Deserialize, Serialize};

/// AST node.
///
/// Serialized as a JSON object with a `type` discriminant. Every payload
/// carries the line of the first token consumed to build it and the filename
/// of the parse it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    // Structure
    Block(Block),
    NamedBlock(NamedBlock),
    Tag(Tag),
    Text(Text),

    // Mixins
    Mixin(Mixin),
    MixinBlock(MixinBlock),

    // Control flow
    Code(Code),
    Case(Case),
    When(When),
    Each(Each),

    // Inheritance
    Extends(Extends),
    Include(Include),

    // Passthrough
    Comment(Comment),
    BlockComment(BlockComment),
    Doctype(Doctype),
    Filter(Filter),
}

/// Ordered sequence of sibling nodes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    pub line: usize,
    pub filename: Option<String>,
    pub nodes: Vec<Node>,
    /// Marks the splice point for the enclosing block's content
    #[serde(rename = "yield", default, skip_serializing_if = "is_false")]
    pub is_yield: bool,
}

/// `block name` / `append name` / `prepend name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedBlock {
    pub line: usize,
    pub filename: Option<String>,
    pub name: String,
    pub mode: BlockMode,
    pub nodes: Vec<Node>,
}

/// HTML element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub line: usize,
    pub filename: Option<String>,
    pub name: String,
    pub self_closing: bool,
    /// Order-preserving; only `class` may repeat
    pub attrs: Vec<Attribute>,
    /// `&attributes(...)` expressions, left unexpanded
    pub attribute_blocks: Vec<String>,
    #[serde(with = "block_node")]
    pub block: Block,
    /// Inline `= expr` following the tag on the same line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Box<Node>>,
    pub is_inline: bool,
    /// Set for interpolated tag names (`#{expr}`)
    pub buffer: bool,
    pub text_only: bool,
}

/// Plain or raw-HTML text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub line: usize,
    pub filename: Option<String>,
    pub val: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_html: bool,
}

/// Mixin definition (`call: false`) or call site (`call: true`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mixin {
    pub line: usize,
    pub filename: Option<String>,
    pub name: String,
    pub args: Option<String>,
    #[serde(with = "optional_block_node")]
    pub block: Option<Block>,
    pub call: bool,
    #[serde(default)]
    pub attrs: Vec<Attribute>,
    #[serde(default)]
    pub attribute_blocks: Vec<String>,
}

/// `block` placeholder inside a mixin body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixinBlock {
    pub line: usize,
    pub filename: Option<String>,
}

/// Code line: unbuffered (`-`), buffered (`=`) or unescaped (`!=`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Code {
    pub line: usize,
    pub filename: Option<String>,
    pub val: String,
    pub buffer: bool,
    pub escape: bool,
    #[serde(default, with = "optional_block_node", skip_serializing_if = "Option::is_none")]
    pub block: Option<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub line: usize,
    pub filename: Option<String>,
    pub expr: String,
    #[serde(with = "block_node")]
    pub block: Block,
}

/// `when expr` or `default` (expr `"default"`) inside a case body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct When {
    pub line: usize,
    pub filename: Option<String>,
    pub expr: String,
    #[serde(default, with = "optional_block_node", skip_serializing_if = "Option::is_none")]
    pub block: Option<Block>,
}

/// `each val, key in obj`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Each {
    pub line: usize,
    pub filename: Option<String>,
    pub obj: String,
    pub val: String,
    pub key: Option<String>,
    #[serde(with = "block_node")]
    pub block: Block,
    /// Body rendered when `obj` is empty (`else` after the loop)
    #[serde(default, with = "optional_block_node", skip_serializing_if = "Option::is_none")]
    pub alternative: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extends {
    pub line: usize,
    pub filename: Option<String>,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Include {
    pub line: usize,
    pub filename: Option<String>,
    pub path: String,
    pub filter: Option<String>,
    pub attrs: Vec<Attribute>,
    #[serde(with = "block_node")]
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub line: usize,
    pub filename: Option<String>,
    pub val: String,
    pub buffer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockComment {
    pub line: usize,
    pub filename: Option<String>,
    pub val: String,
    pub buffer: bool,
    #[serde(with = "block_node")]
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctype {
    pub line: usize,
    pub filename: Option<String>,
    pub val: String,
}

/// `:markdown` and friends; the body is raw pipeless text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub line: usize,
    pub filename: Option<String>,
    pub name: String,
    pub attrs: Vec<Attribute>,
    #[serde(with = "block_node")]
    pub block: Block,
}

/// Attribute on a tag, mixin call, filter or include
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub val: AttrValue,
    #[serde(default)]
    pub escaped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Boolean attribute: `checked`
    Flag(bool),
    /// Expression source: `'text'`, `url`, `a + b`
    Expr(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockMode {
    #[default]
    Replace,
    Append,
    Prepend,
}

impl Block {
    pub fn new(line: usize, filename: Option<String>) -> Self {
        Self {
            line,
            filename,
            nodes: Vec::new(),
            is_yield: false,
        }
    }

    pub fn with_nodes(line: usize, filename: Option<String>, nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            ..Self::new(line, filename)
        }
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Node {
    /// The `type` discriminant as it appears in serialized output
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Block(_) => "Block",
            Node::NamedBlock(_) => "NamedBlock",
            Node::Tag(_) => "Tag",
            Node::Text(_) => "Text",
            Node::Mixin(_) => "Mixin",
            Node::MixinBlock(_) => "MixinBlock",
            Node::Code(_) => "Code",
            Node::Case(_) => "Case",
            Node::When(_) => "When",
            Node::Each(_) => "Each",
            Node::Extends(_) => "Extends",
            Node::Include(_) => "Include",
            Node::Comment(_) => "Comment",
            Node::BlockComment(_) => "BlockComment",
            Node::Doctype(_) => "Doctype",
            Node::Filter(_) => "Filter",
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Node::Block(n) => n.line,
            Node::NamedBlock(n) => n.line,
            Node::Tag(n) => n.line,
            Node::Text(n) => n.line,
            Node::Mixin(n) => n.line,
            Node::MixinBlock(n) => n.line,
            Node::Code(n) => n.line,
            Node::Case(n) => n.line,
            Node::When(n) => n.line,
            Node::Each(n) => n.line,
            Node::Extends(n) => n.line,
            Node::Include(n) => n.line,
            Node::Comment(n) => n.line,
            Node::BlockComment(n) => n.line,
            Node::Doctype(n) => n.line,
            Node::Filter(n) => n.line,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        let filename = match self {
            Node::Block(n) => &n.filename,
            Node::NamedBlock(n) => &n.filename,
            Node::Tag(n) => &n.filename,
            Node::Text(n) => &n.filename,
            Node::Mixin(n) => &n.filename,
            Node::MixinBlock(n) => &n.filename,
            Node::Code(n) => &n.filename,
            Node::Case(n) => &n.filename,
            Node::When(n) => &n.filename,
            Node::Each(n) => &n.filename,
            Node::Extends(n) => &n.filename,
            Node::Include(n) => &n.filename,
            Node::Comment(n) => &n.filename,
            Node::BlockComment(n) => &n.filename,
            Node::Doctype(n) => &n.filename,
            Node::Filter(n) => &n.filename,
        };
        filename.as_deref()
    }

    /// Raw-HTML text node, candidate for merging with adjacent ones
    pub fn as_html_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Node::Text(text) if text.is_html => Some(text),
            _ => None,
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Serialize a [`Block`] field as a full `{"type": "Block", ...}` node.
pub(crate) mod block_node {
    use super::{Block, Node};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize)]
    #[serde(tag = "type")]
    enum Tagged<'a> {
        Block(&'a Block),
    }

    pub fn serialize<S: Serializer>(block: &Block, serializer: S) -> Result<S::Ok, S::Error> {
        Tagged::Block(block).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Block, D::Error> {
        match Node::deserialize(deserializer)? {
            Node::Block(block) => Ok(block),
            other => Err(serde::de::Error::custom(format!(
                "expected a Block node, found {}",
                other.type_name()
            ))),
        }
    }
}

/// Same as [`block_node`] for nullable block fields.
pub(crate) mod optional_block_node {
    use super::{Block, Node};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    struct AsNode<'a>(&'a Block);

    impl Serialize for AsNode<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            super::block_node::serialize(self.0, serializer)
        }
    }

    pub fn serialize<S: Serializer>(block: &Option<Block>, serializer: S) -> Result<S::Ok, S::Error> {
        block.as_ref().map(AsNode).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Block>, D::Error> {
        match Option::<Node>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Node::Block(block)) => Ok(Some(block)),
            Some(other) => Err(serde::de::Error::custom(format!(
                "expected a Block node or null, found {}",
                other.type_name()
            ))),
        }
    }
}

/// Plain-data form of a root block
pub fn to_value(root: &Block) -> Result<serde_json::Value, serde_json::Error> {
    block_node::serialize(root, serde_json::value::Serializer)
}

/// Round-trip a tree through its plain-data form.
///
/// The returned tree shares nothing with the input and is guaranteed to be
/// representable as JSON.
pub fn normalize(root: Block) -> Result<Block, serde_json::Error> {
    let value = serde_json::to_value(Node::Block(root))?;
    block_node::deserialize(value)
}
