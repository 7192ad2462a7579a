//! Output templates: literal text with `$0`..`$9` and `$*` substitutions
//!
//! `$$` produces a single `$`. A `$` followed by anything else is kept as is.
use crate::matcher::CaptureSet;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Capture(usize),
    Whole,
}

/// A parsed output template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    parts: Vec<Part>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpandError {
    #[error("Template references ${0} but the pattern does not capture it")]
    CaptureIndexOutOfRange(usize),
}

impl Template {
    pub fn parse(template: &str) -> Self {
        let mut parts = vec![];
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                literal.push(c);
                continue;
            }

            let part = match chars.peek().copied() {
                Some('*') => Part::Whole,
                Some(digit @ '0'..='9') => Part::Capture(digit as usize - '0' as usize),
                Some('$') => {
                    chars.next();
                    literal.push('$');
                    continue;
                }
                _ => {
                    literal.push('$');
                    continue;
                }
            };
            chars.next();

            if !literal.is_empty() {
                parts.push(Part::Literal(std::mem::take(&mut literal)));
            }
            parts.push(part);
        }

        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }

        Self { parts }
    }

    /// Highest `$N` referenced by the template
    pub fn max_capture(&self) -> Option<usize> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Capture(slot) => Some(*slot),
                _ => None,
            })
            .max()
    }

    /// Ensure every `$N` refers to one of `declared` capture groups
    pub fn check(&self, declared: usize) -> Result<(), ExpandError> {
        match self.max_capture() {
            Some(slot) if slot >= declared => Err(ExpandError::CaptureIndexOutOfRange(slot)),
            _ => Ok(()),
        }
    }

    pub fn expand(&self, captures: &CaptureSet) -> Result<String, ExpandError> {
        let mut output = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => output.push_str(text),
                Part::Capture(slot) => output.push_str(
                    captures
                        .get(*slot)
                        .ok_or(ExpandError::CaptureIndexOutOfRange(*slot))?,
                ),
                Part::Whole => output.push_str(captures.whole()),
            }
        }
        Ok(output)
    }
}

/// Parse and expand `template` in one go
pub fn expand(template: &str, captures: &CaptureSet) -> Result<String, ExpandError> {
    Template::parse(template).expand(captures)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::matcher::match_line;
    use crate::pattern::compile;
    use pretty_assertions::assert_eq;

    fn captures(pattern: &str, line: &str) -> CaptureSet {
        let pattern = compile(pattern, 0).expect("pattern should compile");
        match_line(&pattern, line).expect("line should match")
    }

    #[test]
    fn substitutes_captures() {
        let set = captures("Size width:(<digits>) height:(<digits>)", "Size width:10 height:20");
        assert_eq!(expand("--size=$0x$1", &set), Ok("--size=10x20".to_string()));
        assert_eq!(expand("$1 $0", &set), Ok("20 10".to_string()));
    }

    #[test]
    fn whole_match() {
        let set = captures("Include <any*>", "include = other.conf");
        assert_eq!(expand("$*", &set), Ok("other.conf".to_string()));
    }

    #[test]
    fn literal_only() {
        let set = captures("Bell? <bool>", "Bell on");
        assert_eq!(expand("--bell", &set), Ok("--bell".to_string()));
    }

    #[test]
    fn dollar_escapes() {
        let set = captures("Price (<digits>)", "Price 5");
        assert_eq!(expand("$$$0", &set), Ok("$5".to_string()));
        assert_eq!(expand("cost$", &set), Ok("cost$".to_string()));
        assert_eq!(expand("$x", &set), Ok("$x".to_string()));
    }

    #[test]
    fn out_of_range() {
        let set = captures("Name (<any>)", "Name x");
        assert_eq!(
            expand("--a=$0 --b=$1", &set),
            Err(ExpandError::CaptureIndexOutOfRange(1))
        );
    }

    #[test]
    fn check_against_declared_captures() {
        let template = Template::parse("--size=$0x$1");
        assert_eq!(template.max_capture(), Some(1));
        assert_eq!(template.check(2), Ok(()));
        assert_eq!(template.check(1), Err(ExpandError::CaptureIndexOutOfRange(1)));
        assert_eq!(Template::parse("$*").check(0), Ok(()));
    }
}
