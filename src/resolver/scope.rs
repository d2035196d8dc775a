//! Lexical scope model: a chain of scopes pushed/popped as traversal
//! enters and leaves this DSL's scope-introducing constructs.

use crate::lexer::token::Span;
use crate::syntax::NodeId;

pub type ScopeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The whole script file -- functions, processes, and workflows are
    /// visible here.
    Script,
    /// A workflow's `main:` block.
    Workflow,
    /// A function body.
    Function,
    /// A process's directive/input/output/when/exec blocks.
    Process,
}

#[derive(Debug, Clone)]
pub struct Scope {
    id: ScopeId,
    kind: ScopeKind,
    span: Span,
    /// Names bound directly in this scope (parameters, `take:` names,
    /// local assignments), mapped to the node that introduced them.
    bindings: std::collections::HashMap<String, NodeId>,
}

impl Scope {
    pub fn new(id: ScopeId, kind: ScopeKind, span: Span) -> Self {
        Self {
            id,
            kind,
            span,
            bindings: std::collections::HashMap::new(),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn bind(&mut self, name: impl Into<String>, node: NodeId) {
        self.bindings.insert(name.into(), node);
    }

    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.bindings.get(name).copied()
    }
}

/// A stack of enclosing scopes, innermost last -- lookups walk it back to
/// front.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn push(&mut self, kind: ScopeKind, span: Span) -> ScopeId {
        let id = self.scopes.len();
        self.scopes.push(Scope::new(id, kind, span));
        id
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    pub fn current_mut(&mut self) -> Option<&mut Scope> {
        self.scopes.last_mut()
    }

    /// Resolves `name` against the scope chain, innermost first.
    pub fn resolve(&self, name: &str) -> Option<NodeId> {
        self.scopes.iter().rev().find_map(|s| s.lookup(name))
    }

    pub fn in_closure(&self) -> bool {
        // A closure, in this DSL, is any function scope nested inside a
        // workflow/process scope rather than at the top level.
        let mut saw_function = false;
        for scope in self.scopes.iter().rev() {
            if scope.kind() == ScopeKind::Function {
                saw_function = true;
            } else if saw_function {
                return true;
            }
        }
        false
    }

    pub fn in_workflow_body(&self) -> bool {
        self.scopes.iter().any(|s| s.kind() == ScopeKind::Workflow)
    }
}
