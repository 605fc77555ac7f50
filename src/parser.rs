use serde::{Deserialize, Serialize};
use swc_common::{sync::Lrc, BytePos, FileName, SourceFile, SourceMap, SourceMapper, Span, Spanned};
use swc_ecma_ast::Program;
use swc_ecma_parser::{error::Error as SwcError, EsConfig, Parser, StringInput, Syntax, TsConfig};
use thiserror::Error;
use tracing::debug;

/// Syntax switches handed to SWC.
///
/// The defaults accept the union of what JS/TS projects use in practice:
/// type annotations, JSX, legacy decorators. Class fields, private members,
/// dynamic `import()`, optional chaining, nullish coalescing and top-level
/// await are always on in SWC and need no flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    pub typescript: bool,
    pub jsx: bool,
    pub decorators: bool,
    pub no_early_errors: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            typescript: true,
            jsx: true,
            decorators: true,
            no_early_errors: true,
        }
    }
}

impl ParserOptions {
    fn syntax(&self) -> Syntax {
        if self.typescript {
            Syntax::Typescript(TsConfig {
                tsx: self.jsx,
                decorators: self.decorators,
                dts: false,
                no_early_errors: self.no_early_errors,
                ..Default::default()
            })
        } else {
            Syntax::Es(EsConfig {
                jsx: self.jsx,
                decorators: self.decorators,
                ..Default::default()
            })
        }
    }

    fn file_name(&self) -> &'static str {
        match (self.typescript, self.jsx) {
            (true, true) => "input.tsx",
            (true, false) => "input.ts",
            (false, true) => "input.jsx",
            (false, false) => "input.js",
        }
    }
}

/// Syntax diagnostic, formatted as `message (line:column)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ParseError(pub String);

/// A parsed program together with the source map that resolves its spans.
pub struct SyntaxTree {
    program: Program,
    source_map: Lrc<SourceMap>,
}

impl SyntaxTree {
    pub fn new(program: Program, source_map: Lrc<SourceMap>) -> Self {
        Self { program, source_map }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// 1-indexed first and last line covered by `span`, or `None` for a
    /// synthesized span with no position.
    pub fn line_range(&self, span: Span) -> Option<(usize, usize)> {
        if span.is_dummy() {
            return None;
        }
        // `hi` is exclusive; the last covered byte decides the end line.
        let last = if span.hi > span.lo {
            BytePos(span.hi.0 - 1)
        } else {
            span.lo
        };
        let start = self.source_map.lookup_char_pos(span.lo).line;
        let end = self.source_map.lookup_char_pos(last).line;
        (start <= end).then_some((start, end))
    }

    /// Verbatim source text under `span`.
    pub fn snippet(&self, span: Span) -> Option<String> {
        if span.is_dummy() {
            return None;
        }
        self.source_map.span_to_snippet(span).ok()
    }
}

/// Turns source text into a [`SyntaxTree`].
pub trait SourceParser {
    fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError>;
}

#[derive(Clone, Copy, Debug)]
enum Goal {
    Program,
    Module,
}

/// [`SourceParser`] backed by `swc_ecma_parser`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwcParser {
    options: ParserOptions,
}

impl SwcParser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    /// Attempts after the first program parse fails, in order. With
    /// TypeScript on, plain ES is tried last: TS mode rejects some valid
    /// sloppy-mode JavaScript such as legacy octal literals.
    fn fallbacks(&self) -> Vec<(ParserOptions, Goal)> {
        let mut out = vec![(self.options, Goal::Module)];
        if self.options.typescript {
            let es = ParserOptions {
                typescript: false,
                ..self.options
            };
            out.push((es, Goal::Program));
            out.push((es, Goal::Module));
        }
        out
    }

    fn run(fm: &SourceFile, options: &ParserOptions, goal: Goal) -> Result<Program, SwcError> {
        let mut parser = Parser::new(options.syntax(), StringInput::from(fm), None);
        let program = match goal {
            Goal::Program => parser.parse_program()?,
            Goal::Module => Program::Module(parser.parse_module()?),
        };
        // errors SWC recovered from still make the file malformed
        match parser.take_errors().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(program),
        }
    }
}

impl SourceParser for SwcParser {
    fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError> {
        let cm: Lrc<SourceMap> = Default::default();
        let fm = cm.new_source_file(
            FileName::Custom(self.options.file_name().into()).into(),
            source.to_owned().into(),
        );

        // Module or script is decided by the presence of module syntax. A
        // script that fails may still be a module using top-level await.
        let first = match Self::run(&fm, &self.options, Goal::Program) {
            Ok(program) => return Ok(SyntaxTree::new(program, cm)),
            Err(err) => err,
        };
        for (options, goal) in self.fallbacks() {
            if let Ok(program) = Self::run(&fm, &options, goal) {
                debug!(?goal, typescript = options.typescript, "parsed on fallback");
                return Ok(SyntaxTree::new(program, cm));
            }
        }
        Err(describe(&cm, &first))
    }
}

fn describe(cm: &SourceMap, err: &SwcError) -> ParseError {
    let message = err.kind().msg();
    let span = err.span();
    if span.is_dummy() {
        return ParseError(message.into_owned());
    }
    let loc = cm.lookup_char_pos(span.lo);
    ParseError(format!("{} ({}:{})", message, loc.line, loc.col.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<SyntaxTree, ParseError> {
        SwcParser::default().parse(source)
    }

    #[test]
    fn accepts_the_default_syntax_extensions() {
        let samples = [
            "let n: number = 1;\nfunction id<T>(x: T): T { return x; }\n",
            "const el = <div className=\"a\">{value}</div>;\n",
            "class A { count = 0; #secret = 1; static total = 2; }\n",
            "@sealed\nclass Greeter { @log greet() {} }\n",
            "const mod = import('./lazy');\n",
            "const v = a?.b?.c ?? 'fallback';\n",
            "export const data = await load();\n",
        ];
        for source in samples {
            assert!(parse(source).is_ok(), "failed to parse: {source}");
        }
    }

    #[test]
    fn top_level_await_without_module_syntax_parses() {
        let tree = parse("const res = await fetch(url);\n").expect("parses as module");
        assert!(matches!(tree.program(), Program::Module(_)));
    }

    #[test]
    fn legacy_octal_in_sloppy_script_parses() {
        let tree = parse("fs.chmodSync(p, 0755);\n").expect("falls back to plain ES");
        assert!(matches!(tree.program(), Program::Script(_)));
    }

    #[test]
    fn plain_script_stays_a_script() {
        let tree = parse("var x = 1;\n").expect("parses");
        assert!(matches!(tree.program(), Program::Script(_)));
    }

    #[test]
    fn truncated_input_reports_position() {
        let err = parse("function (").err().expect("must fail");
        assert!(!err.0.is_empty());
        assert!(err.0.contains("(1:"), "missing position in {:?}", err.0);
    }

    #[test]
    fn plain_es_syntax_rejects_type_annotations() {
        let parser = SwcParser::new(ParserOptions {
            typescript: false,
            ..Default::default()
        });
        assert!(parser.parse("let n: number = 1;\n").is_err());
        assert!(parser.parse("let n = 1;\n").is_ok());
    }

    #[test]
    fn line_range_is_one_indexed_and_inclusive() {
        let tree = parse("\nfunction f() {\n}\n").expect("parses");
        let Program::Script(script) = tree.program() else {
            panic!("expected script");
        };
        let span = match &script.body[0] {
            swc_ecma_ast::Stmt::Decl(swc_ecma_ast::Decl::Fn(f)) => f.function.span,
            other => panic!("unexpected statement {other:?}"),
        };
        assert_eq!(tree.line_range(span), Some((2, 3)));
        assert_eq!(tree.snippet(span).as_deref(), Some("function f() {\n}"));
    }
}
