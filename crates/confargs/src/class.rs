//! built-in character classes (`<alpha>`, `<digits>`, `<bool>`, ...)
//!
//! All positions are **byte** offsets into the value region of a line and always fall on char boundaries.
use std::ops::Range;

/// Keywords recognized as a true `<bool>`
pub const TRUE_WORDS: [&str; 4] = ["yes", "on", "true", "1"];

/// Keywords recognized as a false `<bool>`
pub const FALSE_WORDS: [&str; 4] = ["no", "off", "false", "0"];

/// A character class that can appear as `<keyword>` in a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Alpha,
    Alnum,
    Digits,
    XDigits,
    NoSpace,
    /// a quoted string or a run of non-whitespace
    Any,
    /// `any*`: the rest of the line verbatim
    AnyGreedy,
    Bool,
}

impl ClassKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "alpha" => ClassKind::Alpha,
            "alnum" => ClassKind::Alnum,
            "digits" => ClassKind::Digits,
            "xdigits" => ClassKind::XDigits,
            "nospace" => ClassKind::NoSpace,
            "any" => ClassKind::Any,
            "any*" => ClassKind::AnyGreedy,
            "bool" => ClassKind::Bool,
            _ => return None,
        };
        Some(kind)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            ClassKind::Alpha => "alpha",
            ClassKind::Alnum => "alnum",
            ClassKind::Digits => "digits",
            ClassKind::XDigits => "xdigits",
            ClassKind::NoSpace => "nospace",
            ClassKind::Any => "any",
            ClassKind::AnyGreedy => "any*",
            ClassKind::Bool => "bool",
        }
    }

    /// Membership test for the classes that match a run of characters
    fn run_predicate(&self) -> Option<fn(char) -> bool> {
        let predicate: fn(char) -> bool = match self {
            ClassKind::Alpha => char::is_alphabetic,
            ClassKind::Alnum => char::is_alphanumeric,
            ClassKind::Digits => |c: char| c.is_ascii_digit(),
            ClassKind::XDigits => |c: char| c.is_ascii_hexdigit(),
            ClassKind::NoSpace | ClassKind::Any => |c: char| !c.is_whitespace(),
            ClassKind::AnyGreedy | ClassKind::Bool => return None,
        };
        Some(predicate)
    }
}

impl std::fmt::Display for ClassKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}>", self.keyword())
    }
}

/// A successful class match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMatch {
    /// offset just past the consumed input
    pub end: usize,
    /// the matched value, which excludes the quotes of a quoted `<any>`
    pub value: Range<usize>,
    /// semantic value of a `<bool>` match
    pub truth: Option<bool>,
}

impl ClassMatch {
    fn plain(start: usize, end: usize) -> Self {
        Self {
            end,
            value: start..end,
            truth: None,
        }
    }
}

/// Match `kind` at `pos`, consuming as much as the class allows
pub fn try_match(kind: ClassKind, input: &str, pos: usize) -> Option<ClassMatch> {
    candidates(kind, input, pos).into_iter().next()
}

/// All ways `kind` can match at `pos`, longest first
///
/// Run classes yield every shorter run down to a single character so the line matcher can backtrack
/// when a later token needs part of the run.
pub fn candidates(kind: ClassKind, input: &str, pos: usize) -> Vec<ClassMatch> {
    let rest = &input[pos..];
    if kind == ClassKind::AnyGreedy {
        // may be empty, `Name =` still matches `Name (<any*>)`
        return vec![ClassMatch::plain(pos, input.len())];
    }
    if rest.is_empty() {
        return vec![];
    }

    match kind {
        ClassKind::Bool => match_bool(rest)
            .map(|(len, truth)| ClassMatch {
                truth: Some(truth),
                ..ClassMatch::plain(pos, pos + len)
            })
            .into_iter()
            .collect(),
        ClassKind::Any if rest.starts_with(['"', '\'']) => match_quoted(rest)
            .map(|(value, len)| ClassMatch {
                end: pos + len,
                value: (pos + value.start)..(pos + value.end),
                truth: None,
            })
            .into_iter()
            .collect(),
        _ => {
            let Some(predicate) = kind.run_predicate() else {
                return vec![];
            };

            let mut ends: Vec<usize> = rest
                .char_indices()
                .take_while(|(_, c)| predicate(*c))
                .map(|(offset, c)| pos + offset + c.len_utf8())
                .collect();
            ends.reverse();
            ends.into_iter()
                .map(|end| ClassMatch::plain(pos, end))
                .collect()
        }
    }
}

/// Length of the boolean keyword at the start of `rest` and its truth
fn match_bool(rest: &str) -> Option<(usize, bool)> {
    let starts_with = |word: &str| {
        rest.get(..word.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(word))
    };

    TRUE_WORDS
        .iter()
        .map(|word| (*word, true))
        .chain(FALSE_WORDS.iter().map(|word| (*word, false)))
        .find(|&(word, _)| starts_with(word))
        .map(|(word, truth)| (word.len(), truth))
}

/// Value range (inside the quotes) and consumed length of a quoted string
fn match_quoted(rest: &str) -> Option<(Range<usize>, usize)> {
    let quote = rest.chars().next()?;
    let close = rest[1..].find(quote)? + 1;
    Some((1..close, close + 1))
}

/// Parse a boolean keyword on its own, ignoring case
pub fn parse_bool(word: &str) -> Option<bool> {
    match_bool(word)
        .filter(|(len, _)| *len == word.len())
        .map(|(_, truth)| truth)
}
