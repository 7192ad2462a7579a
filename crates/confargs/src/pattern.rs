//! Compile property patterns into [Token] sequences
//!
//! ```text
//! !Include <any*>                       special entry, handled by the SpecialHandler
//! Bell? <bool>                          only emitted when the value is true
//! Size width:(<digits>) height:(<digits>)
//! ^^^^ ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^
//! name body
//! ```
//!
//! Inside the body
//! - `(` and `)` delimit a capture group (at most [MAX_CAPTURES], no nesting)
//! - `<keyword>` is a [ClassKind]
//! - a run of spaces/tabs matches any amount of whitespace, including none
//! - everything else is literal text, letters compare case-insensitively
use crate::class::ClassKind;
use crate::util::is_property_char;
use std::iter::Peekable;
use std::str::Chars;

/// Maximum number of capture groups in one pattern (`$0` to `$9`)
pub const MAX_CAPTURES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(String),
    /// zero or more whitespace characters
    Space,
    Class(ClassKind),
    CaptureStart(usize),
    CaptureEnd(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    /// position of the entry in the caller's table
    pub index: usize,
    pub name: String,
    /// `!` prefix
    pub special: bool,
    /// `?` suffix
    pub gated: bool,
    /// number of declared capture groups
    pub captures: usize,
    pub tokens: Vec<Token>,
}

impl CompiledPattern {
    /// Whether a line with this name belongs to the pattern (case-insensitive)
    pub fn is_property(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Whether a match results in output, which for gated patterns depends on the matched `<bool>`
    pub fn fires(&self, truth: Option<bool>) -> bool {
        !self.gated || truth == Some(true)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("More than {MAX_CAPTURES} capture groups")]
    TooManyCaptures,
    #[error("Unknown character class <{0}>")]
    UnknownClass(String),
    #[error("<any*> must be the last token of a pattern")]
    MisplacedGreedyAny,
    #[error("Malformed pattern: {0}")]
    MalformedPattern(&'static str),
}

/// Compile the pattern of entry `index`
pub fn compile(pattern: &str, index: usize) -> Result<CompiledPattern, CompileError> {
    Compiler {
        chars: pattern.chars().peekable(),
        tokens: vec![],
        captures: 0,
        open: None,
    }
    .compile(index)
}

struct Compiler<'a> {
    chars: Peekable<Chars<'a>>,
    tokens: Vec<Token>,
    captures: usize,
    open: Option<usize>,
}

impl Compiler<'_> {
    fn compile(mut self, index: usize) -> Result<CompiledPattern, CompileError> {
        let special = self.chars.next_if_eq(&'!').is_some();

        let mut name = String::new();
        while let Some(c) = self.chars.next_if(|c| is_property_char(*c)) {
            name.push(c);
        }
        if name.is_empty() {
            return Err(CompileError::MalformedPattern("missing property name"));
        }

        let gated = self.chars.next_if_eq(&'?').is_some();

        match self.chars.peek().copied() {
            None => {}
            Some(c) if c.is_whitespace() || matches!(c, ':' | '=') => self.skip_separator(),
            Some(_) => {
                return Err(CompileError::MalformedPattern(
                    "property name must be followed by whitespace, ':' or '='",
                ))
            }
        }

        while let Some(c) = self.chars.next() {
            match c {
                ' ' | '\t' => {
                    while self.chars.next_if(|c| matches!(*c, ' ' | '\t')).is_some() {}
                    self.tokens.push(Token::Space);
                }
                '(' => self.open_capture()?,
                ')' => {
                    let slot = self
                        .open
                        .take()
                        .ok_or(CompileError::MalformedPattern("unbalanced ')'"))?;
                    self.tokens.push(Token::CaptureEnd(slot));
                }
                '<' => {
                    let kind = self.parse_class()?;
                    self.tokens.push(Token::Class(kind));
                }
                c => self.push_literal(c),
            }
        }

        if self.open.is_some() {
            return Err(CompileError::MalformedPattern("unclosed capture group"));
        }

        if self.tokens.last() == Some(&Token::Space) {
            self.tokens.pop();
        }

        self.check_greedy_any()?;

        if gated && !self.tokens.contains(&Token::Class(ClassKind::Bool)) {
            return Err(CompileError::MalformedPattern(
                "a '?' gated pattern needs a <bool> class",
            ));
        }

        Ok(CompiledPattern {
            index,
            name,
            special,
            gated,
            captures: self.captures,
            tokens: self.tokens,
        })
    }

    /// Skip whitespace around an optional `:` or `=` between name and body
    fn skip_separator(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
        if self.chars.next_if(|c| matches!(*c, ':' | '=')).is_some() {
            while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
        }
    }

    fn open_capture(&mut self) -> Result<(), CompileError> {
        if self.open.is_some() {
            return Err(CompileError::MalformedPattern("nested capture group"));
        }
        if self.captures == MAX_CAPTURES {
            return Err(CompileError::TooManyCaptures);
        }

        self.tokens.push(Token::CaptureStart(self.captures));
        self.open = Some(self.captures);
        self.captures += 1;
        Ok(())
    }

    /// Parse `keyword>` (the opening `<` has already been consumed)
    fn parse_class(&mut self) -> Result<ClassKind, CompileError> {
        let mut keyword = String::new();
        loop {
            match self.chars.next() {
                Some('>') => break,
                Some(c) => keyword.push(c),
                None => {
                    return Err(CompileError::MalformedPattern(
                        "unterminated character class",
                    ))
                }
            }
        }

        ClassKind::from_keyword(keyword.trim()).ok_or(CompileError::UnknownClass(keyword))
    }

    fn push_literal(&mut self, c: char) {
        if let Some(Token::Literal(text)) = self.tokens.last_mut() {
            text.push(c);
        } else {
            self.tokens.push(Token::Literal(c.to_string()));
        }
    }

    /// `<any*>` may only be followed by the end of its capture group
    fn check_greedy_any(&self) -> Result<(), CompileError> {
        let Some(position) = self
            .tokens
            .iter()
            .position(|token| token == &Token::Class(ClassKind::AnyGreedy))
        else {
            return Ok(());
        };

        let trailing_ok = self.tokens[position + 1..]
            .iter()
            .all(|token| matches!(token, Token::CaptureEnd(_)));

        if trailing_ok {
            Ok(())
        } else {
            Err(CompileError::MisplacedGreedyAny)
        }
    }
}
