use std::path::Path;

use swc_common::{Span, Spanned};
use swc_ecma_ast::*;
use swc_ecma_visit::{Visit, VisitWith};
use tracing::{debug, warn};

use super::record::{content_hash, Declaration, ExtractionResult, FileDescriptor, LineTable};
use crate::error::{Error, Result};
use crate::parser::{ParserOptions, SourceParser, SwcParser, SyntaxTree};

const ANONYMOUS: &str = "<anonymous>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclKind {
    Function,
    Class,
    Method,
}

impl DeclKind {
    fn as_str(self) -> &'static str {
        match self {
            DeclKind::Function => "function",
            DeclKind::Class => "class",
            DeclKind::Method => "method",
        }
    }
}

/// Collects the four catalogues in a single pre-order walk.
struct CatalogueVisitor<'a> {
    tree: &'a SyntaxTree,
    lines: &'a LineTable<'a>,
    /// Names of the classes enclosing the current node, innermost last.
    class_scope: Vec<Option<String>>,
    imports: Vec<String>,
    functions: Vec<Declaration>,
    classes: Vec<Declaration>,
    methods: Vec<Declaration>,
}

impl<'a> CatalogueVisitor<'a> {
    fn new(tree: &'a SyntaxTree, lines: &'a LineTable<'a>) -> Self {
        Self {
            tree,
            lines,
            class_scope: Vec::new(),
            imports: Vec::new(),
            functions: Vec::new(),
            classes: Vec::new(),
            methods: Vec::new(),
        }
    }

    fn push(&mut self, kind: DeclKind, name: Option<String>, params: Vec<String>, span: Span) {
        let Some((start_line, end_line)) = self.tree.line_range(span) else {
            warn!(kind = kind.as_str(), ?name, "declaration without position skipped");
            return;
        };
        // SWC also breaks lines on a lone `\r`; the slice is clipped to the
        // `\n` table rather than dropping the declaration
        let code = self.lines.slice(start_line, end_line);

        let owner = match kind {
            DeclKind::Method => self.class_scope.last().cloned().flatten(),
            DeclKind::Function | DeclKind::Class => None,
        };
        let qualified_name = match kind {
            DeclKind::Method => format!(
                "{}.{}",
                owner.as_deref().unwrap_or(ANONYMOUS),
                name.as_deref().unwrap_or(ANONYMOUS)
            ),
            DeclKind::Function | DeclKind::Class => {
                name.clone().unwrap_or_else(|| ANONYMOUS.to_string())
            }
        };

        let decl = Declaration {
            name,
            qualified_name,
            owner,
            params,
            start_line,
            end_line,
            code,
        };
        match kind {
            DeclKind::Function => self.functions.push(decl),
            DeclKind::Class => self.classes.push(decl),
            DeclKind::Method => self.methods.push(decl),
        }
    }

    fn with_class_scope(&mut self, name: Option<String>, class: &Class) {
        self.class_scope.push(name);
        class.visit_with(self);
        self.class_scope.pop();
    }

    /// Best textual name of a method key.
    fn key_name(&self, key: &PropName) -> Option<String> {
        match key {
            PropName::Ident(ident) => Some(ident.sym.to_string()),
            PropName::Str(s) => Some(s.value.to_string()),
            PropName::Computed(computed) => self
                .tree
                .snippet(computed.expr.span())
                .map(|text| format!("[{text}]")),
            // numeric and bigint keys keep their literal spelling
            _ => self.tree.snippet(key.span()),
        }
    }

    fn private_key_name(&self, key: &PrivateName) -> Option<String> {
        let text = self.tree.snippet(key.span())?;
        Some(if text.starts_with('#') {
            text
        } else {
            format!("#{text}")
        })
    }
}

fn ident_param(pat: &Pat) -> Option<String> {
    match pat {
        Pat::Ident(binding) => Some(binding.id.sym.to_string()),
        _ => None,
    }
}

fn param_names(params: &[Param]) -> Vec<String> {
    params.iter().filter_map(|p| ident_param(&p.pat)).collect()
}

fn ctor_param_names(params: &[ParamOrTsParamProp]) -> Vec<String> {
    params
        .iter()
        .filter_map(|p| match p {
            ParamOrTsParamProp::Param(param) => ident_param(&param.pat),
            ParamOrTsParamProp::TsParamProp(prop) => match &prop.param {
                TsParamPropParam::Ident(binding) => Some(binding.id.sym.to_string()),
                TsParamPropParam::Assign(assign) => ident_param(&assign.left),
            },
        })
        .collect()
}

/// `require("x")` with a string literal first argument.
fn required_module(call: &CallExpr) -> Option<String> {
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    let Expr::Ident(ident) = &**callee else {
        return None;
    };
    if ident.sym.as_ref() != "require" {
        return None;
    }
    match call.args.first() {
        Some(ExprOrSpread { spread: None, expr }) => match &**expr {
            Expr::Lit(Lit::Str(s)) => Some(s.value.to_string()),
            _ => None,
        },
        _ => None,
    }
}

impl Visit for CatalogueVisitor<'_> {
    fn visit_import_decl(&mut self, import: &ImportDecl) {
        self.imports.push(import.src.value.to_string());
    }

    fn visit_call_expr(&mut self, call: &CallExpr) {
        if let Some(module) = required_module(call) {
            self.imports.push(module);
        }
        call.visit_children_with(self);
    }

    fn visit_fn_decl(&mut self, func: &FnDecl) {
        // overload signatures and `declare function` have no body
        if func.function.body.is_some() {
            self.push(
                DeclKind::Function,
                Some(func.ident.sym.to_string()),
                param_names(&func.function.params),
                func.function.span,
            );
        }
        func.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, class: &ClassDecl) {
        let name = class.ident.sym.to_string();
        self.push(DeclKind::Class, Some(name.clone()), Vec::new(), class.class.span);
        self.with_class_scope(Some(name), &class.class);
    }

    fn visit_class_expr(&mut self, class: &ClassExpr) {
        let name = class.ident.as_ref().map(|i| i.sym.to_string());
        self.with_class_scope(name, &class.class);
    }

    fn visit_export_default_decl(&mut self, export: &ExportDefaultDecl) {
        // `export default function` / `export default class` are declarations
        // whose name is optional
        match &export.decl {
            DefaultDecl::Fn(func) if func.function.body.is_some() => {
                let name = func.ident.as_ref().map(|i| i.sym.to_string());
                self.push(
                    DeclKind::Function,
                    name,
                    param_names(&func.function.params),
                    func.function.span,
                );
            }
            DefaultDecl::Class(class) => {
                let name = class.ident.as_ref().map(|i| i.sym.to_string());
                self.push(DeclKind::Class, name, Vec::new(), class.class.span);
            }
            _ => {}
        }
        export.visit_children_with(self);
    }

    fn visit_class_member(&mut self, member: &ClassMember) {
        match member {
            ClassMember::Constructor(ctor) if ctor.body.is_some() => {
                let name = self.key_name(&ctor.key);
                self.push(DeclKind::Method, name, ctor_param_names(&ctor.params), ctor.span);
            }
            ClassMember::Method(method) if method.function.body.is_some() => {
                let name = self.key_name(&method.key);
                self.push(
                    DeclKind::Method,
                    name,
                    param_names(&method.function.params),
                    method.span,
                );
            }
            ClassMember::PrivateMethod(method) if method.function.body.is_some() => {
                let name = self.private_key_name(&method.key);
                self.push(
                    DeclKind::Method,
                    name,
                    param_names(&method.function.params),
                    method.span,
                );
            }
            // fields, static blocks, index signatures, abstract and
            // overload signatures
            _ => {}
        }
        member.visit_children_with(self);
    }
}

/// Projects a JS/TS source file into import, function, class and method
/// catalogues.
///
/// The parser is injected; [`Extractor::new`] uses SWC. Extraction never
/// fails on malformed source: the syntax error is recorded in
/// [`FileDescriptor::error`] and the catalogues are left empty.
#[derive(Debug, Clone)]
pub struct Extractor<P = SwcParser> {
    parser: P,
}

impl Extractor<SwcParser> {
    pub fn new(options: ParserOptions) -> Self {
        Self::with_parser(SwcParser::new(options))
    }
}

impl Default for Extractor<SwcParser> {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}

impl<P: SourceParser> Extractor<P> {
    pub fn with_parser(parser: P) -> Self {
        Self { parser }
    }

    pub fn extract(&self, path: &str, source: &str) -> ExtractionResult {
        let lines = LineTable::new(source);
        let hash = content_hash(source);

        let tree = match self.parser.parse(source) {
            Ok(tree) => tree,
            Err(err) => {
                warn!(path, error = %err, "parse failed, catalogues left empty");
                return ExtractionResult::failed(path, hash, source, err.0);
            }
        };

        let mut visitor = CatalogueVisitor::new(&tree, &lines);
        tree.program().visit_with(&mut visitor);
        debug!(
            path,
            imports = visitor.imports.len(),
            functions = visitor.functions.len(),
            classes = visitor.classes.len(),
            methods = visitor.methods.len(),
            "extracted"
        );

        ExtractionResult {
            file: FileDescriptor {
                path: path.to_string(),
                hash,
                error: None,
            },
            imports: visitor.imports,
            functions: visitor.functions,
            classes: visitor.classes,
            methods: visitor.methods,
            source: source.to_string(),
        }
    }

    /// Reads `path` and extracts it. Only I/O can fail.
    pub fn extract_file(&self, path: impl AsRef<Path>) -> Result<ExtractionResult> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(self.extract(&path.to_string_lossy(), &source))
    }
}
