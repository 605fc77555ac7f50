pub mod config;
pub mod error;
pub mod parser;
pub mod analyzer {
    pub mod extract;
    pub mod index;
    pub mod record;
}

// Re-export selected API for consumers
pub use analyzer::extract::Extractor;
pub use analyzer::index::{ProjectIndex, IndexSummary};
pub use analyzer::record::{Declaration, ExtractionResult, FileDescriptor, LineTable};
pub use config::{Config, IndexConfig};
pub use error::{Error, Result};
pub use parser::{ParseError, ParserOptions, SourceParser, SwcParser, SyntaxTree};
