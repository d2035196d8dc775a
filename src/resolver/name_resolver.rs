//! Name Resolver: resolves identifiers in expressions
//! against the lexical scope chain, declared functions/processes/
//! workflows, imported include variables (by name -- the include resolver
//! fills in the actual targets in a later phase), and the built-in DSL
//! surface.

use std::collections::HashMap;
use std::path::Path;

use crate::builtins::BUILTINS;
use crate::diagnostics::{Diagnostic, DiagnosticPhase};
use crate::file_cache::FileCache;
use crate::parser::span_to_range;
use crate::resolver::schema::{ParamSchema, SchemaLoader};
use crate::resolver::scope::{ScopeKind, ScopeStack};
use crate::syntax::{Node, NodeId, NodeKind, SchemaFieldType, SyntaxTree};
use crate::uri::DocumentUri;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Bound to a local variable / parameter / `take:` name introduced in
    /// an enclosing scope.
    Local(NodeId),
    /// Bound to a function/process/workflow declared in this script.
    Declaration(NodeId),
    /// Bound to an include variable by name; `Include Resolver` (phase 3)
    /// fills in the concrete target.
    Import { include_node: NodeId, var_index: usize },
    /// Bound to a synthesized `params.<name>` schema field.
    SchemaField(NodeId),
    /// Bound to a built-in operator/feature-flag/directive name.
    Builtin,
}

#[derive(Debug, Default, Clone)]
pub struct NameResolution {
    /// Resolution results keyed by the `Ident`/`PropertyAccess` node that
    /// was resolved.
    pub references: HashMap<NodeId, Resolution>,
    pub diagnostics: Vec<Diagnostic>,
    /// A single parse warning for a malformed schema file, attached to
    /// the entry workflow.
    pub schema_warning: Option<Diagnostic>,
    pub schema: ParamSchema,
}

pub struct NameResolver<'a> {
    tree: &'a mut SyntaxTree,
    scopes: ScopeStack,
}

impl<'a> NameResolver<'a> {
    pub fn new(tree: &'a mut SyntaxTree) -> Self {
        Self {
            tree,
            scopes: ScopeStack::new(),
        }
    }

    /// Runs resolution over the whole file and synthesizes the parameter
    /// schema's virtual fields if `nextflow_schema.json` exists adjacent
    /// to `script_path`.
    pub fn resolve(
        &mut self,
        script_path: Option<&Path>,
        file_cache: &FileCache,
    ) -> NameResolution {
        let mut result = NameResolution::default();

        if let Some(path) = script_path {
            self.load_schema(path, file_cache, &mut result);
        }

        let Some(root) = self.tree.root() else {
            return result;
        };
        let Some(NodeKind::Script {
            functions,
            processes,
            workflows,
            entry_workflow,
            includes,
            params,
            ..
        }) = self.tree.get(root).map(|n| n.kind.clone())
        else {
            return result;
        };

        let root_span = self.tree.get(root).unwrap().span;
        self.scopes.push(ScopeKind::Script, root_span);
        for &f in &functions {
            self.bind_decl_name(f);
        }
        for &p in &processes {
            self.bind_decl_name(p);
        }
        for &w in &workflows {
            self.bind_decl_name(w);
        }
        self.bind_includes(&includes);

        for &f in &functions {
            self.resolve_function(f, &mut result);
        }
        for &w in &workflows {
            self.resolve_workflow(w, &mut result);
        }
        for &p in &processes {
            self.resolve_process(p, &mut result);
        }
        for &param in &params {
            self.resolve_param(param, &mut result);
        }

        self.scopes.pop();

        if let Some(warning) = result.schema_warning.take() {
            // Re-attach to the entry workflow's range if one exists.
            let range = entry_workflow
                .and_then(|w| self.tree.get(w))
                .map(|n| span_to_range(n.span))
                .unwrap_or(warning.range);
            result.schema_warning = Some(Diagnostic { range, ..warning });
        }

        result
    }

    fn load_schema(&mut self, script_path: &Path, file_cache: &FileCache, result: &mut NameResolution) {
        let Some(schema_path) = SchemaLoader::adjacent_schema_path(script_path) else {
            return;
        };
        let Some(uri) = DocumentUri::from_file_path(&schema_path) else {
            return;
        };
        let text = match file_cache.read_text(&uri) {
            Ok(t) => t,
            Err(_) => return,
        };
        match SchemaLoader::load_from_str(&schema_path.to_string_lossy(), &text) {
            Ok(schema) => result.schema = schema,
            Err(e) => {
                result.schema_warning = Some(Diagnostic::warning(
                    DiagnosticPhase::Schema,
                    tower_lsp::lsp_types::Range::default(),
                    e.to_string(),
                ));
            }
        }
    }

    fn bind_decl_name(&mut self, decl: NodeId) {
        let name = self.tree.get(decl).and_then(|n| match &n.kind {
            NodeKind::Function { name, .. } => Some(name.clone()),
            NodeKind::Process { name, .. } => Some(name.clone()),
            NodeKind::Workflow { name: Some(n), .. } => Some(n.clone()),
            _ => None,
        });
        if let Some(name) = name {
            if let Some(scope) = self.scopes.current_mut() {
                scope.bind(name, decl);
            }
        }
    }

    fn bind_includes(&mut self, includes: &[NodeId]) {
        for &include in includes {
            let Some(NodeKind::Include { variables, .. }) = self.tree.get(include).map(|n| n.kind.clone()) else {
                continue;
            };
            for (i, var) in variables.iter().enumerate() {
                if let Some(scope) = self.scopes.current_mut() {
                    // Bindings keyed by include node + index are
                    // recovered later via `Resolution::Import`; the scope
                    // binding itself just needs *a* node id placeholder
                    // (the include node) to prove "this name is known".
                    scope.bind(var.effective_name().to_string(), include);
                }
                let _ = i;
            }
        }
    }

    fn resolve_function(&mut self, func: NodeId, result: &mut NameResolution) {
        let Some(NodeKind::Function { params, .. }) = self.tree.get(func).map(|n| n.kind.clone()) else {
            return;
        };
        let span = self.tree.get(func).unwrap().span;
        self.scopes.push(ScopeKind::Function, span);
        for p in &params {
            if let Some(scope) = self.scopes.current_mut() {
                scope.bind(p.clone(), func);
            }
        }
        self.scopes.pop();
        let _ = result;
    }

    fn resolve_workflow(&mut self, workflow: NodeId, result: &mut NameResolution) {
        let Some(NodeKind::Workflow { takes, main, emits, .. }) = self.tree.get(workflow).map(|n| n.kind.clone())
        else {
            return;
        };
        let span = self.tree.get(workflow).unwrap().span;
        self.scopes.push(ScopeKind::Workflow, span);
        for &t in &takes {
            if let Some(NodeKind::WorkflowTake { name }) = self.tree.get(t).map(|n| n.kind.clone()) {
                if let Some(scope) = self.scopes.current_mut() {
                    scope.bind(name, t);
                }
            }
        }
        for &stmt in &main {
            self.resolve_expr(stmt, result);
        }
        for &e in &emits {
            if let Some(NodeKind::WorkflowEmit { value: Some(v), .. }) = self.tree.get(e).map(|n| n.kind.clone()) {
                self.resolve_expr(v, result);
            }
        }
        self.scopes.pop();
    }

    fn resolve_process(&mut self, process: NodeId, result: &mut NameResolution) {
        let Some(NodeKind::Process {
            directives,
            when_expr,
            ..
        }) = self.tree.get(process).map(|n| n.kind.clone())
        else {
            return;
        };
        let span = self.tree.get(process).unwrap().span;
        self.scopes.push(ScopeKind::Process, span);
        for &d in &directives {
            self.resolve_expr(d, result);
        }
        if let Some(w) = when_expr {
            self.resolve_expr(w, result);
        }
        self.scopes.pop();
    }

    fn resolve_param(&mut self, param: NodeId, result: &mut NameResolution) {
        let Some(NodeKind::Param { target, value }) = self.tree.get(param).map(|n| n.kind.clone()) else {
            return;
        };
        self.resolve_expr(target, result);
        self.resolve_expr(value, result);
    }

    fn resolve_expr(&mut self, node: NodeId, result: &mut NameResolution) {
        let Some(kind) = self.tree.get(node).map(|n| n.kind.clone()) else {
            return;
        };
        match kind {
            NodeKind::Ident { name } => self.resolve_ident(node, &name, result),
            NodeKind::PropertyAccess { target, name } => {
                self.resolve_property_access(node, target, &name, result);
            }
            NodeKind::Call { callee, args } => {
                self.resolve_expr(callee, result);
                for a in args {
                    self.resolve_expr(a, result);
                }
            }
            NodeKind::UnaryNeg { expr } => self.resolve_expr(expr, result),
            _ => {}
        }
    }

    fn resolve_ident(&mut self, node: NodeId, name: &str, result: &mut NameResolution) {
        if let Some(local) = self.scopes.resolve(name) {
            let resolution = if let Some(NodeKind::Include { variables, .. }) = self.tree.get(local).map(|n| n.kind.clone()) {
                let idx = variables.iter().position(|v| v.effective_name() == name).unwrap_or(0);
                Resolution::Import {
                    include_node: local,
                    var_index: idx,
                }
            } else {
                match self.tree.get(local).map(|n| &n.kind) {
                    Some(NodeKind::Function { .. }) | Some(NodeKind::Process { .. }) | Some(NodeKind::Workflow { .. }) => {
                        Resolution::Declaration(local)
                    }
                    _ => Resolution::Local(local),
                }
            };
            result.references.insert(node, resolution);
            return;
        }

        if name == "params" || BUILTINS.is_directive(name) {
            result.references.insert(node, Resolution::Builtin);
            return;
        }

        let span = self.tree.get(node).unwrap().span;
        result.diagnostics.push(Diagnostic::error(
            DiagnosticPhase::NameResolution,
            span_to_range(span),
            format!("undefined variable `{name}`"),
        ));
    }

    fn resolve_property_access(&mut self, node: NodeId, target: NodeId, name: &str, result: &mut NameResolution) {
        // `params.<name>` is checked against the synthesized schema here
        // rather than left to the generic ident path, so the diagnostic
        // gets its own specific wording.
        if let Some(NodeKind::Ident { name: base }) = self.tree.get(target).map(|n| n.kind.clone()) {
            if base == "params" {
                result.references.insert(target, Resolution::Builtin);
                // Whether `name` is actually a recognized schema field is
                // the param-schema checker's concern (`validators`), not
                // this resolver's -- it only wires up the binding when one
                // exists.
                if let Some(field) = result.schema.find(name) {
                    let field_node = self.synthesize_schema_field(field.name.clone(), field.ty, field.description.clone());
                    result.references.insert(node, Resolution::SchemaField(field_node));
                }
                return;
            }
        }
        self.resolve_expr(target, result);
    }

    fn synthesize_schema_field(&mut self, name: String, ty: SchemaFieldType, description: Option<String>) -> NodeId {
        let span = self.tree.root().and_then(|r| self.tree.get(r)).map(|n| n.span).unwrap_or(crate::lexer::token::Span::new(
            crate::lexer::token::SourcePos::new(1, 1),
            crate::lexer::token::SourcePos::new(1, 1),
        ));
        self.tree.insert(Node::synthetic(
            span,
            NodeKind::SchemaField { name, ty, description },
        ))
    }
}
