//! Command tree and line dispatch.
//!
//! The tree is assembled once with [`CommandTreeBuilder`] and frozen into an
//! immutable [`CommandTree`]. Resolving a line walks the `:`-separated header
//! one level at a time, matching each mnemonic case-insensitively against the
//! node's long or short form. The router only resolves; executing the bound
//! [`Handler`] is up to the caller.

use crate::commands::Handler;

/// Where a node was attached relative to the node passed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Sibling of the given node. Against the implicit root this is the top level.
    SameLevel,
    /// One level below the given node.
    Child,
}

/// Index of a node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

#[derive(Debug, Clone)]
pub struct CommandNode {
    long_name: String,
    short_name: String,
    handler: Option<Handler>,
    children: Vec<NodeId>,
    scope: Scope,
}

impl CommandNode {
    pub fn long_name(&self) -> &str {
        &self.long_name
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn handler(&self) -> Option<Handler> {
        self.handler
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    fn matches(&self, mnemonic: &str) -> bool {
        self.long_name.eq_ignore_ascii_case(mnemonic) || self.short_name.eq_ignore_ascii_case(mnemonic)
    }
}

#[derive(Debug)]
pub struct CommandTreeBuilder {
    nodes: Vec<CommandNode>,
    parents: Vec<Option<NodeId>>,
}

impl Default for CommandTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandTreeBuilder {
    pub fn new() -> Self {
        let root = CommandNode {
            long_name: String::new(),
            short_name: String::new(),
            handler: None,
            children: Vec::new(),
            scope: Scope::Child,
        };
        Self {
            nodes: vec![root],
            parents: vec![None],
        }
    }

    /// Attach a node and return its id for registering children under it.
    ///
    /// `handler = None` makes a pure namespace node.
    pub fn register(
        &mut self,
        parent: NodeId,
        scope: Scope,
        long_name: &str,
        short_name: &str,
        handler: Option<Handler>,
    ) -> NodeId {
        let attach_to = match scope {
            Scope::Child => parent,
            Scope::SameLevel => self.parents.get(parent.0).copied().flatten().unwrap_or(NodeId::ROOT),
        };
        let id = NodeId(self.nodes.len());
        self.nodes.push(CommandNode {
            long_name: long_name.to_string(),
            short_name: short_name.to_string(),
            handler,
            children: Vec::new(),
            scope,
        });
        self.parents.push(Some(attach_to));
        self.nodes[attach_to.0].children.push(id);
        id
    }

    pub fn build(self) -> CommandTree {
        CommandTree { nodes: self.nodes }
    }
}

/// Separator vs. content, in line order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Separator,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

impl<'a> Token<'a> {
    fn separator(text: &'a str) -> Self {
        Self {
            kind: TokenKind::Separator,
            text,
        }
    }

    fn content(text: &'a str) -> Self {
        Self {
            kind: TokenKind::Content,
            text,
        }
    }

    pub fn is_content(&self) -> bool {
        self.kind == TokenKind::Content
    }
}

/// Split a line into the header, the header/argument gap, and comma-separated arguments.
///
/// Whitespace inside an argument is kept (`300 C` stays one token); whitespace
/// around commas is dropped.
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    let line = line.trim();
    let mut tokens = Vec::new();
    if line.is_empty() {
        return tokens;
    }
    let split = line.find(char::is_whitespace).unwrap_or(line.len());
    let (header, rest) = line.split_at(split);
    tokens.push(Token::content(header));

    let args = rest.trim_start();
    if args.is_empty() {
        return tokens;
    }
    tokens.push(Token::separator(&rest[..rest.len() - args.len()]));
    for (i, arg) in args.split(',').enumerate() {
        if i > 0 {
            tokens.push(Token::separator(","));
        }
        let arg = arg.trim();
        if !arg.is_empty() {
            tokens.push(Token::content(arg));
        }
    }
    tokens
}

/// First content token, skipping separators.
pub fn first_argument<'a>(args: &[Token<'a>]) -> Option<&'a str> {
    args.iter().find(|t| t.is_content()).map(|t| t.text)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Blank line; nothing to do.
    Empty,
    /// No node matches the header, or the matched node has no handler.
    UndefinedHeader(String),
}

/// A line resolved to a handler, with the tokens that follow the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub handler: Handler,
    pub args: Vec<Token<'a>>,
}

#[derive(Debug, Clone)]
pub struct CommandTree {
    nodes: Vec<CommandNode>,
}

impl CommandTree {
    pub fn builder() -> CommandTreeBuilder {
        CommandTreeBuilder::new()
    }

    pub fn node(&self, id: NodeId) -> Option<&CommandNode> {
        self.nodes.get(id.0)
    }

    pub fn root(&self) -> &CommandNode {
        &self.nodes[NodeId::ROOT.0]
    }

    fn child_matching(&self, parent: NodeId, mnemonic: &str) -> Option<NodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|id| self.nodes[id.0].matches(mnemonic))
    }

    /// Resolve a header path such as `CTRL:TEMP?` to its node.
    pub fn find(&self, header: &str) -> Option<NodeId> {
        let path = header.strip_prefix(':').unwrap_or(header);
        if path.is_empty() {
            return None;
        }
        let mut at = NodeId::ROOT;
        for mnemonic in path.split(':') {
            if mnemonic.is_empty() {
                return None;
            }
            at = self.child_matching(at, mnemonic)?;
        }
        Some(at)
    }

    /// Tokenize `line` and resolve its header to a handler.
    pub fn resolve<'a>(&self, line: &'a str) -> Result<Resolved<'a>, RouteError> {
        let mut tokens = tokenize(line);
        if tokens.is_empty() {
            return Err(RouteError::Empty);
        }
        let header = tokens.remove(0).text;
        let handler = self
            .find(header)
            .and_then(|id| self.nodes[id.0].handler)
            .ok_or_else(|| RouteError::UndefinedHeader(header.to_string()))?;
        tracing::trace!(header, ?handler, "command resolved");
        Ok(Resolved {
            handler,
            args: tokens,
        })
    }
}
