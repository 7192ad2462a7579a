//! Drive a configuration source through the compiled entry table
use crate::args::ArgumentList;
use crate::grammar::Entry;
use crate::handler::{dispatch, CallSite, Directive, HandlerError, SpecialHandler};
use crate::matcher::{match_into, CaptureSet};
use crate::pattern::{compile, CompileError, CompiledPattern};
use crate::source::{SourceError, SourceProvider};
use crate::template::{ExpandError, Template};
use crate::util::strip_comment;
use std::io::{BufRead, Read};

pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 16;
pub const DEFAULT_MAX_LINE_LENGTH: usize = 4096;

/// Options for [build_command_line]
pub struct BuildConfig<'h> {
    /// unmatched lines are errors instead of being skipped
    pub strict: bool,
    /// nesting limit for included sources, the root source is depth 0
    pub max_include_depth: usize,
    /// in bytes, without the line terminator
    pub max_line_length: usize,
    handler: Option<&'h mut dyn SpecialHandler>,
}

impl Default for BuildConfig<'_> {
    fn default() -> Self {
        Self {
            strict: false,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            handler: None,
        }
    }
}

impl<'h> BuildConfig<'h> {
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    pub fn max_line_length(mut self, length: usize) -> Self {
        self.max_line_length = length;
        self
    }

    /// Handler for special (`!`) entries
    pub fn with_handler(mut self, handler: &'h mut dyn SpecialHandler) -> Self {
        self.handler = Some(handler);
        self
    }
}

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("Entry {index} `{pattern}` has an invalid pattern")]
    Compile {
        index: usize,
        pattern: String,
        #[source]
        source: CompileError,
    },
    #[error("Entry {index} has an invalid template `{template}`")]
    Template {
        index: usize,
        template: String,
        #[source]
        source: ExpandError,
    },
    #[error("Entry {index} `{pattern}` is special but no handler is configured")]
    MissingHandler { index: usize, pattern: String },
    #[error("{source_id}:{line}: unable to expand template")]
    Expand {
        source_id: String,
        line: usize,
        #[source]
        source: ExpandError,
    },
    #[error("{source_id}:{line}: unrecognized directive `{text}`")]
    UnrecognizedDirective {
        source_id: String,
        line: usize,
        text: String,
    },
    #[error("{source_id}:{line}: special handler failed")]
    Handler {
        source_id: String,
        line: usize,
        #[source]
        source: HandlerError,
    },
    #[error("{source_id}:{line}: line is longer than {limit} bytes")]
    LineTooLong {
        source_id: String,
        line: usize,
        limit: usize,
    },
    #[error("{source_id}:{line}: including `{reference}` exceeds the include depth of {limit}")]
    IncludeTooDeep {
        source_id: String,
        line: usize,
        reference: String,
        limit: usize,
    },
    #[error("{source_id}:{line}: include loop detected at {included}")]
    IncludeCycle {
        source_id: String,
        line: usize,
        included: String,
    },
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("Out of memory while growing the argument list")]
    OutOfMemory(#[from] std::collections::TryReserveError),
}

/// An entry ready for matching
#[derive(Debug)]
pub struct CompiledEntry {
    pub pattern: CompiledPattern,
    pub template: Template,
}

/// Compile every entry, checking templates against the declared capture groups
pub fn compile_entries(
    entries: &[Entry],
    has_handler: bool,
) -> Result<Vec<CompiledEntry>, BuildError> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let pattern = compile(&entry.pattern, index).map_err(|source| BuildError::Compile {
                index,
                pattern: entry.pattern.clone(),
                source,
            })?;

            let template = Template::parse(&entry.template);
            template
                .check(pattern.captures)
                .map_err(|source| BuildError::Template {
                    index,
                    template: entry.template.clone(),
                    source,
                })?;

            if pattern.special && !has_handler {
                return Err(BuildError::MissingHandler {
                    index,
                    pattern: entry.pattern.clone(),
                });
            }

            Ok(CompiledEntry { pattern, template })
        })
        .collect()
}

/// Translate the configuration source `source` into an argument list
///
/// `config` may be omitted when the entry table has no special entries. The first error aborts the
/// build and the partially built list is dropped.
#[tracing::instrument(level = "debug", skip(config, entries, sources))]
pub fn build_command_line(
    source: &str,
    config: Option<BuildConfig<'_>>,
    entries: &[Entry],
    app_name: &str,
    sources: &dyn SourceProvider,
) -> Result<ArgumentList, BuildError> {
    let config = config.unwrap_or_default();
    let compiled = compile_entries(entries, config.handler.is_some())?;
    tracing::debug!(entries = compiled.len(), "entries compiled");

    let mut driver = Driver {
        entries: &compiled,
        config,
        sources,
        args: ArgumentList::new(app_name),
        captures: CaptureSet::default(),
        stack: vec![],
    };
    driver.process(source, None)?;

    tracing::debug!(args = driver.args.len(), "command line built");
    Ok(driver.args)
}

/// Position within the source being processed
#[derive(derive_new::new, Debug)]
struct ParseContext {
    source_id: String,
    #[new(default)]
    line: usize,
}

struct Driver<'e, 'h> {
    entries: &'e [CompiledEntry],
    config: BuildConfig<'h>,
    sources: &'e dyn SourceProvider,
    args: ArgumentList,
    /// scratch space, overwritten for every line
    captures: CaptureSet,
    /// identifiers of the sources currently being processed, outermost first
    stack: Vec<String>,
}

impl Driver<'_, '_> {
    /// Process `reference` completely, `parent` is the location of the include directive
    fn process(&mut self, reference: &str, parent: Option<&ParseContext>) -> Result<(), BuildError> {
        if let Some(parent) = parent {
            if self.stack.len() > self.config.max_include_depth {
                return Err(BuildError::IncludeTooDeep {
                    source_id: parent.source_id.clone(),
                    line: parent.line,
                    reference: reference.to_string(),
                    limit: self.config.max_include_depth,
                });
            }
        }

        let mut source = self
            .sources
            .open(reference, parent.map(|parent| parent.source_id.as_str()))?;

        if let Some(parent) = parent {
            if self.stack.contains(&source.id) {
                return Err(BuildError::IncludeCycle {
                    source_id: parent.source_id.clone(),
                    line: parent.line,
                    included: source.id,
                });
            }
        }

        let _span = tracing::debug_span!("source", id = %source.id, depth = self.stack.len()).entered();
        self.stack.push(source.id.clone());

        let mut ctx = ParseContext::new(source.id);
        // room for the longest allowed line, a `\r\n` terminator and one byte to detect overflow
        let cap = self.config.max_line_length.saturating_add(3);
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            let read = (&mut source.reader)
                .take(cap as u64)
                .read_until(b'\n', &mut buffer)
                .map_err(|error| SourceError::Read {
                    id: ctx.source_id.clone(),
                    source: error,
                })?;
            if read == 0 {
                break;
            }
            ctx.line += 1;

            let too_long = || BuildError::LineTooLong {
                source_id: ctx.source_id.clone(),
                line: ctx.line,
                limit: self.config.max_line_length,
            };
            if read == cap && buffer.last() != Some(&b'\n') {
                return Err(too_long());
            }

            let line = std::str::from_utf8(&buffer).map_err(|error| SourceError::Read {
                id: ctx.source_id.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, error),
            })?;
            let line = line.trim_end_matches(['\n', '\r']);
            if line.len() > self.config.max_line_length {
                return Err(too_long());
            }

            let content = strip_comment(line);
            if content.is_empty() {
                continue;
            }

            self.apply(content, &ctx)?;
        }

        self.stack.pop();
        Ok(())
    }

    /// Apply the first matching entry to a content line
    fn apply(&mut self, line: &str, ctx: &ParseContext) -> Result<(), BuildError> {
        let entries = self.entries;
        let Some(entry) = entries
            .iter()
            .find(|entry| match_into(&entry.pattern, line, &mut self.captures))
        else {
            if self.config.strict {
                return Err(BuildError::UnrecognizedDirective {
                    source_id: ctx.source_id.clone(),
                    line: ctx.line,
                    text: line.to_string(),
                });
            }
            tracing::trace!(line = ctx.line, text = line, "no entry matches, skipping");
            return Ok(());
        };

        let pattern = &entry.pattern;
        tracing::debug!(line = ctx.line, entry = pattern.index, "matched");

        if !pattern.fires(self.captures.truth()) {
            tracing::debug!(line = ctx.line, entry = pattern.index, "boolean gate closed");
            return Ok(());
        }

        let expanded = entry
            .template
            .expand(&self.captures)
            .map_err(|source| BuildError::Expand {
                source_id: ctx.source_id.clone(),
                line: ctx.line,
                source,
            })?;

        if !pattern.special {
            if !expanded.is_empty() {
                self.args.push(expanded)?;
            }
            return Ok(());
        }

        // compile_entries rejects special entries when no handler is configured
        let Some(handler) = self.config.handler.as_deref_mut() else {
            return Ok(());
        };
        let site = CallSite::new(pattern.name.clone(), ctx.source_id.clone(), ctx.line);

        let directive = dispatch(handler, &expanded, &site).map_err(|source| BuildError::Handler {
            source_id: ctx.source_id.clone(),
            line: ctx.line,
            source,
        })?;

        match directive {
            Directive::Next => Ok(()),
            Directive::Include(reference) => self.process(&reference, Some(ctx)),
        }
    }
}
