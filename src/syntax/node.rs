//! Syntax tree node model.
//!
//! Nodes are tagged variants in a single arena per `SourceUnit`, not a
//! class hierarchy: a single exhaustive match over `NodeKind` replaces a
//! deep inheritance of visitor/node types. Identity is the `slotmap` key
//! `NodeId`, one arena per file, indexed by a stable numeric handle rather
//! than hashed by structural value: `Node` deliberately does not derive
//! `Hash`/`Eq` on structural content.

use slotmap::new_key_type;

use crate::lexer::token::Span;

new_key_type! {
    /// Stable handle for a node within one `SourceUnit`'s arena. Never
    /// compared structurally -- only by key identity.
    pub struct NodeId;
}

/// A reference to a node that may live in a different file's arena, used
/// for include targets and cross-file definition references.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobalNodeRef {
    pub uri: crate::uri::DocumentUri,
    pub node: NodeId,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub span: Span,
    pub doc_comment: Option<String>,
    /// Synthetic nodes (schema-derived fields, synthesized call outputs)
    /// are created during resolution, never appear in `getNodes(uri)`, and
    /// are excluded from traversal. They still live in the same arena for
    /// locality but are tagged so readers can filter.
    pub synthetic: bool,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessBody {
    Script,
    Shell,
    Exec,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Script {
        feature_flags: Vec<NodeId>,
        includes: Vec<NodeId>,
        params: Vec<NodeId>,
        functions: Vec<NodeId>,
        processes: Vec<NodeId>,
        workflows: Vec<NodeId>,
        entry_workflow: Option<NodeId>,
        output: Option<NodeId>,
    },

    Include {
        source_path: String,
        variables: Vec<IncludeVariable>,
    },

    /// Root node for a configuration-file `SourceUnit`. A script
    /// `SourceUnit` roots at `Script` instead; which root kind a file
    /// gets depends on the workspace filter.
    ConfigFile {
        items: Vec<NodeId>,
    },

    Process {
        name: String,
        directives: Vec<NodeId>,
        inputs: Vec<NodeId>,
        outputs: Vec<NodeId>,
        when_expr: Option<NodeId>,
        body_kind: ProcessBody,
        exec: Option<NodeId>,
        stub: Option<NodeId>,
    },

    /// A single `path 'x', emit: out` style output statement inside a
    /// process's `outputs:` block.
    ProcessOutput {
        emit_name: Option<String>,
    },

    /// A single input statement inside a process's `inputs:` block --
    /// only the count matters for the call checker, the shape is
    /// otherwise opaque.
    ProcessInput,

    Workflow {
        name: Option<String>,
        takes: Vec<NodeId>,
        emits: Vec<NodeId>,
        publishers: Vec<NodeId>,
        main: Vec<NodeId>,
    },

    WorkflowTake {
        name: String,
    },

    WorkflowEmit {
        name: String,
        value: Option<NodeId>,
    },

    WorkflowPublish {
        name: String,
    },

    Function {
        name: String,
        params: Vec<String>,
        body: Vec<NodeId>,
    },

    Output {
        body: Vec<NodeId>,
    },

    FeatureFlag {
        dotted_name: Vec<String>,
        value: NodeId,
    },

    Param {
        /// Property expression rooted at `params`, e.g. `params.reads`.
        target: NodeId,
        value: NodeId,
    },

    ConfigAssignment {
        dotted_name: Vec<String>,
        value: NodeId,
    },

    ConfigBlock {
        name: String,
        body: Vec<NodeId>,
    },

    ConfigInclude {
        source_path: String,
    },

    // ---- generic expression/statement nodes ----
    Ident {
        name: String,
    },

    PropertyAccess {
        target: NodeId,
        name: String,
    },

    Call {
        callee: NodeId,
        args: Vec<NodeId>,
    },

    UnaryNeg {
        expr: NodeId,
    },

    StringLiteral {
        value: String,
    },

    NumberLiteral {
        value: String,
    },

    BoolLiteral {
        value: bool,
    },

    NullLiteral,

    /// A raw embedded-host-language block (`script:`/`shell:`/`exec:`
    /// bodies, `def` function bodies) kept opaque -- full host-language
    /// execution is explicitly out of scope.
    RawBlock {
        text: String,
    },

    /// A synthesized field produced by `resolver::schema` from
    /// `nextflow_schema.json`. Always `synthetic == true`.
    SchemaField {
        name: String,
        ty: SchemaFieldType,
        description: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFieldType {
    Bool,
    I64,
    F64,
    Str,
    Dynamic,
}

#[derive(Debug, Clone)]
pub struct IncludeVariable {
    pub name: String,
    pub alias: Option<String>,
    pub span: Span,
}

impl IncludeVariable {
    pub fn effective_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl Node {
    pub fn new(span: Span, kind: NodeKind) -> Self {
        Self {
            span,
            doc_comment: None,
            synthetic: false,
            kind,
        }
    }

    pub fn synthetic(span: Span, kind: NodeKind) -> Self {
        Self {
            span,
            doc_comment: None,
            synthetic: true,
            kind,
        }
    }

    pub fn with_doc(mut self, doc: Option<String>) -> Self {
        self.doc_comment = doc;
        self
    }

    /// Children of this node for traversal purposes, in source order.
    /// Parent Index & Node Registry relies solely on this.
    pub fn children(&self) -> Vec<NodeId> {
        match &self.kind {
            NodeKind::Script {
                feature_flags,
                includes,
                params,
                functions,
                processes,
                workflows,
                output,
                ..
            } => {
                let mut out = Vec::new();
                out.extend(includes.iter().copied());
                out.extend(feature_flags.iter().copied());
                out.extend(params.iter().copied());
                out.extend(functions.iter().copied());
                out.extend(processes.iter().copied());
                out.extend(workflows.iter().copied());
                out.extend(output.iter().copied());
                out
            }
            NodeKind::Include { .. } => vec![],
            NodeKind::ConfigFile { items } => items.clone(),
            NodeKind::Process {
                directives,
                inputs,
                outputs,
                when_expr,
                exec,
                stub,
                ..
            } => {
                let mut out = Vec::new();
                out.extend(inputs.iter().copied());
                out.extend(outputs.iter().copied());
                out.extend(when_expr.iter().copied());
                out.extend(directives.iter().copied());
                out.extend(exec.iter().copied());
                out.extend(stub.iter().copied());
                out
            }
            NodeKind::ProcessOutput { .. } | NodeKind::ProcessInput => vec![],
            NodeKind::Workflow {
                takes,
                emits,
                publishers,
                main,
                ..
            } => {
                let mut out = Vec::new();
                out.extend(takes.iter().copied());
                out.extend(main.iter().copied());
                out.extend(emits.iter().copied());
                out.extend(publishers.iter().copied());
                out
            }
            NodeKind::WorkflowTake { .. } | NodeKind::WorkflowPublish { .. } => vec![],
            NodeKind::WorkflowEmit { value, .. } => value.iter().copied().collect(),
            NodeKind::Function { body, .. } => body.clone(),
            NodeKind::Output { body } => body.clone(),
            NodeKind::FeatureFlag { value, .. } => vec![*value],
            NodeKind::Param { target, value } => vec![*target, *value],
            NodeKind::ConfigAssignment { value, .. } => vec![*value],
            NodeKind::ConfigBlock { body, .. } => body.clone(),
            NodeKind::ConfigInclude { .. } => vec![],
            NodeKind::Ident { .. } => vec![],
            NodeKind::PropertyAccess { target, .. } => vec![*target],
            NodeKind::Call { callee, args } => {
                let mut out = vec![*callee];
                out.extend(args.iter().copied());
                out
            }
            NodeKind::UnaryNeg { expr } => vec![*expr],
            NodeKind::StringLiteral { .. }
            | NodeKind::NumberLiteral { .. }
            | NodeKind::BoolLiteral { .. }
            | NodeKind::NullLiteral
            | NodeKind::RawBlock { .. }
            | NodeKind::SchemaField { .. } => vec![],
        }
    }

    pub fn is_entry_workflow(&self) -> bool {
        matches!(&self.kind, NodeKind::Workflow { name: None, .. })
    }
}
