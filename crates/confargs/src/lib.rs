//! # confargs - configuration files as command lines
//!
//! `confargs` turns a configuration file into a list of command line arguments so an application can feed it
//! through the option parsing it already has. The grammar is data: a table of [Entry]s, each a property
//! pattern and an output template.
//!
//! ```text
//! Name (<any*>)                   --name=$0
//! Bell? <bool>                    --bell
//! Size width:(<digits>) height:(<digits>)    --size=$0x$1
//! !Include <any*>                 $*
//! ```
//!
//! ```text
//! # app.conf
//! Name   Johnny Doe
//! bell = no
//! size: width:10 height:20
//! ```
//!
//! becomes `["app", "--name=Johnny Doe", "--size=10x20"]`.
//!
//! ## Introduction for developers
//!
//! ### Compiling
//!
//! see [pattern::compile] and [driver::compile_entries]
//!
//! Every build starts by compiling the entry table. A pattern is split into
//! - an optional `!` marking a special entry
//! - the property name
//! - an optional `?` marking a boolean gate
//! - the body, which becomes a list of [pattern::Token]s
//!
//! Templates are parsed alongside ([template::Template]) and checked against the number of capture groups the
//! pattern declares. Any problem here fails the build before a single line is read.
//!
//! ### Matching
//!
//! see [matcher::match_line]
//!
//! A line first has its comment stripped. Its leading identifier has to equal the property name (ignoring case),
//! optionally followed by `:` or `=`. The rest of the line is the value region (`$*`) and has to be consumed
//! completely by the body tokens. Character classes ([class::ClassKind]) are tried longest first and the matcher
//! backtracks into shorter runs when a later token fails.
//!
//! Entries are tried in declaration order and the first match wins. A gated entry whose `<bool>` is false
//! still counts as the match for that line, it just produces no argument.
//!
//! ### Output
//!
//! A normal entry expands its template and appends the result to the [ArgumentList]. A special entry hands the
//! expansion to the configured [handler::SpecialHandler]. Returning [handler::Directive::Include] makes the
//! driver process another source right there, so its arguments end up at the position of the include line.
//!
//! Includes are bounded by [driver::BuildConfig::max_include_depth] and a source that is already being
//! processed cannot be included again.
//!
//! ### Sources
//!
//! Reading text is left to a [source::SourceProvider]. [source::FsSources] reads files and resolves includes
//! relative to the including file, [source::MemorySources] is handy for tests and embedded defaults.
//!
pub mod args;
pub mod class;
pub mod driver;
pub mod grammar;
pub mod handler;
pub mod matcher;
pub mod pattern;
pub mod source;
pub mod template;
mod util;

pub use args::ArgumentList;
pub use driver::{build_command_line, BuildConfig, BuildError};
pub use grammar::{Entry, Grammar};
