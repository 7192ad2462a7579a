//! special handlers for `!` entries
//!
//! A special entry does not produce an argument. Its expanded template is passed to a [SpecialHandler]
//! that decides what happens next, for example including another configuration source.
//!
//! ```
//! # use confargs::handler::{CallSite, Directive, HandlerResult};
//! let mut include = |argument: &str, site: &CallSite| -> HandlerResult {
//!     if site.property.eq_ignore_ascii_case("include") {
//!         Ok(Directive::Include(argument.to_string()))
//!     } else {
//!         Err(format!("unsupported directive {}", site.property).into())
//!     }
//! };
//! # let _: &mut dyn confargs::handler::SpecialHandler = &mut include;
//! ```

/// Error reported by a handler
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

pub type HandlerResult = Result<Directive, HandlerError>;

/// What the driver does after a special entry was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// continue with the next line
    Next,
    /// process the referenced source in place, then continue
    Include(String),
}

/// Where a special entry matched
#[derive(derive_new::new, Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// property name as declared in the entry
    pub property: String,
    /// identifier of the source being processed
    pub source: String,
    /// 1-based line number
    pub line: usize,
}

pub trait SpecialHandler {
    fn handle(&mut self, argument: &str, site: &CallSite) -> HandlerResult;
}

// blanket impl for FnMut
impl<F> SpecialHandler for F
where
    F: FnMut(&str, &CallSite) -> HandlerResult,
{
    fn handle(&mut self, argument: &str, site: &CallSite) -> HandlerResult {
        self(argument, site)
    }
}

#[tracing::instrument(level = "debug", skip(handler))]
pub(crate) fn dispatch(
    handler: &mut dyn SpecialHandler,
    argument: &str,
    site: &CallSite,
) -> HandlerResult {
    let directive = handler.handle(argument, site);
    tracing::debug!(?directive, "handled");
    directive
}
