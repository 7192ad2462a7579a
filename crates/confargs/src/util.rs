//! line level helpers shared by the pattern compiler, the line matcher and the driver

/// Characters allowed in a property name
pub(crate) fn is_property_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Remove a trailing `#` comment and surrounding whitespace
///
/// A `#` starts a comment at the beginning of the line or after whitespace, unless it sits inside quotes.
/// `color=#fff` keeps its value. A quote only opens at the start of a token and only when it is closed
/// later on the line, so `O'Brien # surname` still loses its comment.
pub(crate) fn strip_comment(line: &str) -> &str {
    let mut quote = None;
    let mut previous = None;

    for (offset, c) in line.char_indices() {
        let token_start = previous.map_or(true, |p: char| p.is_whitespace() || matches!(p, ':' | '='));
        match (quote, c) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') if token_start && line[offset + 1..].contains(c) => quote = Some(c),
            (None, '#') if previous.map_or(true, char::is_whitespace) => {
                return line[..offset].trim();
            }
            (None, _) => {}
        }
        previous = Some(c);
    }

    line.trim()
}

/// Split a content line into its leading property name and the value region
///
/// The name may be followed by whitespace, `:` or `=` (with optional whitespace around the separator).
/// Returns `None` when the line does not start with a property name.
pub(crate) fn split_property(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_start();
    let name_len = line
        .char_indices()
        .find(|(_, c)| !is_property_char(*c))
        .map_or(line.len(), |(offset, _)| offset);

    if name_len == 0 {
        return None;
    }

    let (name, rest) = line.split_at(name_len);
    if !rest.is_empty() && !rest.starts_with(|c: char| c.is_whitespace() || c == ':' || c == '=') {
        return None;
    }

    let rest = rest.trim_start();
    let rest = rest
        .strip_prefix(':')
        .or_else(|| rest.strip_prefix('='))
        .unwrap_or(rest);

    Some((name, rest.trim()))
}
