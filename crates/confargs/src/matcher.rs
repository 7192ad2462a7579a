//! Match configuration lines against a [CompiledPattern]
use crate::class::{self, ClassKind};
use crate::pattern::{CompiledPattern, Token, MAX_CAPTURES};
use crate::util::split_property;
use std::ops::Range;

/// Maximum number of backtracking steps for a single line
const MAX_STEPS: usize = 100_000;

/// Captured values of one successful match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureSet {
    slots: [Option<String>; MAX_CAPTURES],
    whole: String,
    truth: Option<bool>,
}

impl CaptureSet {
    /// Value of capture group `slot` (`$0` to `$9`)
    pub fn get(&self, slot: usize) -> Option<&str> {
        self.slots.get(slot)?.as_deref()
    }

    /// The whole value region (`$*`)
    pub fn whole(&self) -> &str {
        &self.whole
    }

    /// Semantic value of the first `<bool>` in the pattern
    pub fn truth(&self) -> Option<bool> {
        self.truth
    }

    /// Number of populated capture groups
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.whole.clear();
        self.truth = None;
    }
}

/// Match `line` (without comments) against `pattern`
///
/// The whole value region has to be consumed. The boolean gate is not applied here, see
/// [CompiledPattern::fires].
pub fn match_line(pattern: &CompiledPattern, line: &str) -> Option<CaptureSet> {
    let mut captures = CaptureSet::default();
    match_into(pattern, line, &mut captures).then_some(captures)
}

/// Like [match_line], but reuses `captures`, which is overwritten on success and cleared otherwise
pub fn match_into(pattern: &CompiledPattern, line: &str, captures: &mut CaptureSet) -> bool {
    captures.clear();

    let Some((name, value)) = split_property(line) else {
        return false;
    };
    if !pattern.is_property(name) {
        return false;
    }

    let mut state = State::new(value);
    if !state.match_tokens(&pattern.tokens, 0) {
        if state.steps > MAX_STEPS {
            tracing::debug!(pattern = pattern.index, line, "backtracking budget exhausted");
        }
        return false;
    }

    for (slot, span) in captures.slots.iter_mut().zip(state.spans) {
        *slot = span.map(|span| value[span].to_string());
    }
    captures.whole = value.to_string();
    captures.truth = state.truth;

    true
}

/// Backtracking state for one line
struct State<'l> {
    input: &'l str,
    spans: [Option<Range<usize>>; MAX_CAPTURES],
    /// start offset of each open capture group
    starts: [usize; MAX_CAPTURES],
    /// most recent class match: (start, end, value)
    last_class: Option<(usize, usize, Range<usize>)>,
    truth: Option<bool>,
    steps: usize,
}

impl<'l> State<'l> {
    fn new(input: &'l str) -> Self {
        Self {
            input,
            spans: Default::default(),
            starts: [0; MAX_CAPTURES],
            last_class: None,
            truth: None,
            steps: 0,
        }
    }

    /// Match `tokens` starting at `pos`, trying class candidates greedy-first
    fn match_tokens(&mut self, tokens: &[Token], pos: usize) -> bool {
        self.steps += 1;
        if self.steps > MAX_STEPS {
            return false;
        }

        let Some((token, rest)) = tokens.split_first() else {
            return self.input[pos..].trim().is_empty();
        };

        // whitespace is allowed between any two tokens, the value region is already trimmed
        match token {
            Token::Literal(text) => match match_literal(self.input, self.skip_space(pos), text) {
                Some(end) => self.match_tokens(rest, end),
                None => false,
            },
            Token::Space => self.match_tokens(rest, self.skip_space(pos)),
            Token::Class(kind) => self.match_class(*kind, rest, self.skip_space(pos)),
            Token::CaptureStart(slot) => {
                let pos = self.skip_space(pos);
                self.starts[*slot] = pos;
                self.match_tokens(rest, pos)
            }
            Token::CaptureEnd(slot) => {
                let start = self.starts[*slot];
                let span = match &self.last_class {
                    // a group around a single quoted value captures the text inside the quotes
                    Some((class_start, class_end, value)) if *class_start == start && *class_end == pos => {
                        value.clone()
                    }
                    _ => start..(start + self.input[start..pos].trim_end().len()),
                };

                let previous = self.spans[*slot].replace(span);
                if self.match_tokens(rest, pos) {
                    return true;
                }
                self.spans[*slot] = previous;
                false
            }
        }
    }

    fn skip_space(&self, pos: usize) -> usize {
        let rest = &self.input[pos..];
        pos + (rest.len() - rest.trim_start().len())
    }

    fn match_class(&mut self, kind: ClassKind, rest: &[Token], pos: usize) -> bool {
        for candidate in class::candidates(kind, self.input, pos) {
            let previous_class = self.last_class.replace((pos, candidate.end, candidate.value));
            let previous_truth = self.truth;
            if self.truth.is_none() {
                self.truth = candidate.truth;
            }

            if self.match_tokens(rest, candidate.end) {
                return true;
            }

            self.last_class = previous_class;
            self.truth = previous_truth;
            if self.steps > MAX_STEPS {
                break;
            }
        }
        false
    }
}

/// Match literal pattern text at `pos`; letters compare case-insensitively
fn match_literal(input: &str, pos: usize, text: &str) -> Option<usize> {
    let mut actual = input[pos..].chars();
    let mut end = pos;

    for expected in text.chars() {
        let found = actual.next()?;
        let same = if expected.is_alphabetic() {
            found.to_lowercase().eq(expected.to_lowercase())
        } else {
            found == expected
        };

        if !same {
            return None;
        }
        end += found.len_utf8();
    }

    Some(end)
}
