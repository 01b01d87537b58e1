//! Semantic analysis for Fish programs.
//!
//! A single pass over the AST with a stack of lexical scopes and one flat
//! function table owned by the analyzer. Findings are accumulated as
//! [`Diagnostic`]s; analysis always runs to the end of the tree. A
//! subexpression whose type cannot be determined yields `None`, which is
//! compatible with everything so one mistake is reported once.

use crate::frontend::ast::{Node, NodeKind, Type};
use crate::utils::errors::{Diagnostic, DiagnosticKind};
use log::{debug, trace};
use std::collections::HashMap;

/// Analyze a program and return every diagnostic found.
pub fn analyze(ast: &Node) -> Vec<Diagnostic> {
    SemanticAnalyzer::new().analyze(ast)
}

/// Type compatibility: equal tags, or either side unknown.
pub fn types_compatible(expected: Option<Type>, given: Option<Type>) -> bool {
    match (expected, given) {
        (Some(expected), Some(given)) => expected == given,
        _ => true,
    }
}

/// A variable or parameter binding.
#[derive(Debug, Clone)]
pub struct Symbol<'ast> {
    /// Variable name
    pub name: &'ast str,
    /// Declared type, `None` when the annotation is unusable
    pub ty: Option<Type>,
    /// The declaring node
    pub node: &'ast Node,
}

/// A function signature.
#[derive(Debug, Clone)]
pub struct FunctionSymbol<'ast> {
    /// Function name
    pub name: &'ast str,
    /// Declared return type
    pub return_type: Option<Type>,
    /// Parameters in declaration order
    pub params: Vec<Symbol<'ast>>,
    /// The `FunctionDef` node
    pub node: &'ast Node,
}

/// Variable bindings of one lexical scope.
type Scope<'ast> = HashMap<&'ast str, Symbol<'ast>>;

/// Semantic analyzer.
pub struct SemanticAnalyzer<'ast> {
    scopes: Vec<Scope<'ast>>,
    functions: HashMap<&'ast str, FunctionSymbol<'ast>>,
    diagnostics: Vec<Diagnostic>,
    current_function: Option<FunctionSymbol<'ast>>,
}

impl<'ast> Default for SemanticAnalyzer<'ast> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'ast> SemanticAnalyzer<'ast> {
    /// Create an analyzer with no scopes and an empty function table.
    pub fn new() -> Self {
        Self {
            scopes: Vec::new(),
            functions: HashMap::new(),
            diagnostics: Vec::new(),
            current_function: None,
        }
    }

    /// Walk the tree rooted at `root` and return the diagnostics.
    pub fn analyze(mut self, root: &'ast Node) -> Vec<Diagnostic> {
        self.visit(root);
        debug!("Semantic analysis found {} diagnostic(s)", self.diagnostics.len());
        self.diagnostics
    }

    /// Look up a function signature registered so far.
    pub fn lookup_function(&self, name: &str) -> Option<&FunctionSymbol<'ast>> {
        self.functions.get(name)
    }

    /// Resolve a variable, innermost scope first.
    pub fn lookup_var(&self, name: &str) -> Option<&Symbol<'ast>> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Bind a variable in the innermost scope. A redeclaration is reported
    /// and the new binding replaces the old one.
    fn declare_var(&mut self, name: &'ast str, ty: Option<Type>, node: &'ast Node) {
        if self.scopes.is_empty() {
            self.push_scope();
        }
        let redeclared = self
            .scopes
            .last()
            .map_or(false, |scope| scope.contains_key(name));
        if redeclared {
            self.error(
                DiagnosticKind::Redeclaration,
                node.line,
                format!("Variable '{}' is already declared in this scope", name),
            );
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, Symbol { name, ty, node });
        }
    }

    /// Register a function. On a name collision the first definition stays.
    fn declare_function(&mut self, function: FunctionSymbol<'ast>) {
        if self.functions.contains_key(function.name) {
            self.error(
                DiagnosticKind::DuplicateFunction,
                function.node.line,
                format!("Function '{}' is already declared", function.name),
            );
            return;
        }
        self.functions.insert(function.name, function);
    }

    fn error(&mut self, kind: DiagnosticKind, line: usize, message: String) {
        self.diagnostics.push(Diagnostic::new(kind, line, message));
    }

    /// Visit a node and return its type, if it is an expression with a
    /// known type.
    fn visit(&mut self, node: &'ast Node) -> Option<Type> {
        trace!("Visiting {} (line {})", node.kind, node.line);
        match node.kind {
            NodeKind::Program | NodeKind::Block | NodeKind::For => {
                self.push_scope();
                self.visit_children(node);
                self.pop_scope();
                None
            }
            NodeKind::FunctionDef => {
                self.visit_function_def(node);
                None
            }
            NodeKind::Declaration => {
                self.visit_declaration(node);
                None
            }
            NodeKind::Assign => {
                self.visit_assign(node);
                None
            }
            NodeKind::Return => {
                self.visit_return(node);
                None
            }
            NodeKind::Call => self.visit_call(node),
            NodeKind::BinaryOp => self.visit_binary(node),
            NodeKind::UnaryOp | NodeKind::PostfixOp => {
                node.child(0).and_then(|operand| self.visit(operand))
            }
            NodeKind::Var => self.visit_var(node),
            NodeKind::Num => {
                if node.value_str().contains('.') {
                    Some(Type::Float)
                } else {
                    Some(Type::Int)
                }
            }
            NodeKind::String => Some(Type::String),
            NodeKind::Char => Some(Type::Char),
            NodeKind::Initializer
            | NodeKind::Type
            | NodeKind::Params
            | NodeKind::Param
            | NodeKind::If
            | NodeKind::While
            | NodeKind::TryCatch
            | NodeKind::Print
            | NodeKind::Args
            | NodeKind::Empty => {
                self.visit_children(node);
                None
            }
        }
    }

    fn visit_children(&mut self, node: &'ast Node) {
        for child in &node.children {
            self.visit(child);
        }
    }

    fn visit_function_def(&mut self, node: &'ast Node) {
        let params: Vec<Symbol<'ast>> = node
            .child(0)
            .map(|params| {
                params
                    .children
                    .iter()
                    .map(|param| Symbol {
                        name: param.value_str(),
                        ty: param.child(0).and_then(Node::as_type),
                        node: param,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let signature = FunctionSymbol {
            name: node.value_str(),
            return_type: node.child(1).and_then(Node::as_type),
            params: params.clone(),
            node,
        };
        self.declare_function(signature.clone());

        // The body is checked against its own signature, even for a
        // duplicate that did not make it into the table.
        let previous = self.current_function.replace(signature);
        self.push_scope();
        for param in params {
            self.declare_var(param.name, param.ty, param.node);
        }
        if let Some(body) = node.child(2) {
            self.visit(body);
        }
        self.pop_scope();
        self.current_function = previous;
    }

    fn visit_declaration(&mut self, node: &'ast Node) {
        let name = node.value_str();
        let declared = node.child(0).and_then(Node::as_type);
        // Bound before the initializer is checked.
        self.declare_var(name, declared, node);

        if let Some(init) = node.child(1) {
            let given = init.child(0).and_then(|expr| self.visit(expr));
            if !types_compatible(declared, given) {
                self.error(
                    DiagnosticKind::TypeMismatch,
                    node.line,
                    format!(
                        "Initializer of '{}' is not compatible with type {}: found {}",
                        name,
                        type_name(declared),
                        type_name(given)
                    ),
                );
            }
        }
    }

    fn visit_assign(&mut self, node: &'ast Node) {
        let name = node.value_str();
        let target = self.lookup_var(name).map(|symbol| symbol.ty);
        let given = node.child(0).and_then(|expr| self.visit(expr));

        match target {
            None => self.error(
                DiagnosticKind::UndeclaredVariable,
                node.line,
                format!("Variable '{}' is not declared", name),
            ),
            Some(declared) if !types_compatible(declared, given) => self.error(
                DiagnosticKind::TypeMismatch,
                node.line,
                format!(
                    "Assignment to '{}' ({}) with incompatible type {}",
                    name,
                    type_name(declared),
                    type_name(given)
                ),
            ),
            Some(_) => {}
        }
    }

    fn visit_call(&mut self, node: &'ast Node) -> Option<Type> {
        let name = node.value_str();

        // Arguments are analyzed whether or not the callee exists.
        let mut arg_types = Vec::new();
        if let Some(args) = node.child(0) {
            for arg in &args.children {
                arg_types.push(self.visit(arg));
            }
        }

        let (param_types, return_type) = match self.lookup_function(name) {
            Some(function) => (
                function.params.iter().map(|p| p.ty).collect::<Vec<_>>(),
                function.return_type,
            ),
            None => {
                self.error(
                    DiagnosticKind::UndeclaredFunction,
                    node.line,
                    format!("Call to undeclared function '{}'", name),
                );
                return None;
            }
        };

        if arg_types.len() != param_types.len() {
            self.error(
                DiagnosticKind::ArityMismatch,
                node.line,
                format!(
                    "Call to '{}' with {} argument(s), expected {}",
                    name,
                    arg_types.len(),
                    param_types.len()
                ),
            );
        } else {
            for (index, (given, expected)) in arg_types.iter().zip(&param_types).enumerate() {
                if !types_compatible(*expected, *given) {
                    self.error(
                        DiagnosticKind::TypeMismatch,
                        node.line,
                        format!(
                            "Argument {} in call to '{}' is incompatible: expected {}, found {}",
                            index + 1,
                            name,
                            type_name(*expected),
                            type_name(*given)
                        ),
                    );
                }
            }
        }

        return_type
    }

    fn visit_return(&mut self, node: &'ast Node) {
        let function = self
            .current_function
            .as_ref()
            .map(|f| (f.name, f.return_type));
        if function.is_none() {
            self.error(
                DiagnosticKind::ReturnOutsideFunction,
                node.line,
                "'emerge' outside of a function".to_string(),
            );
        }

        let given = node.child(0).and_then(|expr| self.visit(expr));
        if let Some((name, expected)) = function {
            if !types_compatible(expected, given) {
                self.error(
                    DiagnosticKind::TypeMismatch,
                    node.line,
                    format!(
                        "Incompatible return type in function '{}': expected {}, found {}",
                        name,
                        type_name(expected),
                        type_name(given)
                    ),
                );
            }
        }
    }

    fn visit_binary(&mut self, node: &'ast Node) -> Option<Type> {
        let left = node.child(0).and_then(|lhs| self.visit(lhs));
        let right = node.child(1).and_then(|rhs| self.visit(rhs));
        let (left, right) = (left?, right?);

        if left != right {
            self.error(
                DiagnosticKind::TypeMismatch,
                node.line,
                format!(
                    "Binary operation '{}' between incompatible types: {} and {}",
                    node.value_str(),
                    left,
                    right
                ),
            );
            return None;
        }

        if is_comparison(node.value_str()) {
            Some(Type::Bool)
        } else {
            Some(left)
        }
    }

    fn visit_var(&mut self, node: &'ast Node) -> Option<Type> {
        let name = node.value_str();
        match self.lookup_var(name) {
            Some(symbol) => symbol.ty,
            None => {
                self.error(
                    DiagnosticKind::UndeclaredVariable,
                    node.line,
                    format!("Variable '{}' is not declared", name),
                );
                None
            }
        }
    }
}

fn is_comparison(op: &str) -> bool {
    matches!(op, "<" | ">" | "<=" | ">=" | "==" | "!=")
}

fn type_name(ty: Option<Type>) -> &'static str {
    ty.map_or("unknown", |ty| ty.name())
}
