//! # FoxDream
//!
//! A tree-walking interpreter for a small dynamically typed language in the
//! xBase/FoxPro tradition: `local`, `do case`, `endif`, `.and.`, `?` as print.
//!
//! User's source code:
//!
//! ``` text
//! local total = price * qty if qty > 0 else 0
//! ? total
//! ```

//! ## Scanning
//!
//! Characters become tokens. The scanner walks an ordered table of regex
//! rules and takes the first one that matches, so keywords win over
//! identifiers because they come first in the table. Newlines are the
//! statement separators, runs of them collapse into one token.

//! ## Parsing
//!
//! A recursive-descent parser builds the `AST`. On a syntax error it skips to
//! the next statement and keeps going, so one pass reports every error it can
//! find. `import name` asks a [`SourceResolver`] for the module text and parses
//! it into a module declaration in place.
//!
//! ``` markdown
//! total (Statement::VarDeclaration)
//! └── if (Expression::Conditional)
//!     ├── > (Expression::Binary)
//!     ├── * (Expression::Binary)
//!     │   ├── price (Expression::Identifier)
//!     │   └── qty (Expression::Identifier)
//!     └── 0 (Expression::Literal)
//! ```

//! ## Runtime
//!
//! The interpreter walks the tree. Scopes are reference counted and chained to
//! their parent; a function value keeps the scope it was declared in alive,
//! which is all a closure needs. Names are case insensitive. `return`, `loop`
//! and `exit` unwind as signals, not errors.
//!
//! Builtins, the shared `array` prototype and the `connection` object live in
//! the global scope. Databases plug in through the [`Driver`] trait.

pub mod cli;
mod connector;
mod environment;
mod error;
mod foxdream;
mod interpreter;
mod parser;
mod resolver;
mod scanner;
mod statement;
mod utils;

pub use connector::{ConnectionSettings, Driver, MemoryDriver, Row, Session};
pub use error::{
	EXIT_SOFTWARE, EXIT_SYNTAX, EXIT_USAGE, FoxError,
	interpreter::{RuntimeError, RuntimeErrorType},
	parser::{ParseError, ParseErrorType, ParserError},
	scanner::{ScanError, ScanErrorType},
};
pub use foxdream::{Config, FoxDream};
pub use interpreter::value::Value;
pub use resolver::{FsResolver, MemoryResolver, NoImports, SourceResolver};
