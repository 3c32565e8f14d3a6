//! Low-level scanning shared by the header grammars.

/// A `name[=value]` item inside a delimited header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair<'a> {
    pub name: &'a str,
    pub value: Option<&'a str>,
}

/// Splits on the first occurrence of `delimiter`. The remainder is `None`
/// when the delimiter does not occur.
pub fn split_first(input: &str, delimiter: char) -> (&str, Option<&str>) {
    match input.split_once(delimiter) {
        Some((head, rest)) => (head, Some(rest)),
        None => (input, None),
    }
}

/// Splits on the first run of whitespace of any kind, dropping the run itself.
pub fn split_first_whitespace(input: &str) -> (&str, &str) {
    match input.find(char::is_whitespace) {
        Some(index) => (&input[..index], input[index..].trim_start()),
        None => (input, ""),
    }
}

/// Trims optional whitespace (space and horizontal tab).
pub fn trim(input: &str) -> &str {
    input.trim_matches(is_ows)
}

/// Splits `input` on `delimiter`, trims each element and skips empty ones.
pub fn split_list(input: &str, delimiter: char) -> impl Iterator<Item = &str> {
    input.split(delimiter).map(trim).filter(|item| {
        if item.is_empty() {
            log::debug!("skipping empty list element");
        }
        !item.is_empty()
    })
}

/// Splits an item into a trimmed name and an optional trimmed value.
pub fn split_pair(item: &str) -> Pair<'_> {
    let (name, value) = split_first(item, '=');
    Pair {
        name: trim(name),
        value: value.map(trim),
    }
}

pub fn is_quoted(input: &str, quote: char) -> bool {
    input.len() >= 2 * quote.len_utf8() && input.starts_with(quote) && input.ends_with(quote)
}

/// Strips exactly one pair of surrounding `quote` characters, if present.
pub fn unquote(input: &str, quote: char) -> &str {
    if is_quoted(input, quote) {
        &input[quote.len_utf8()..input.len() - quote.len_utf8()]
    } else {
        input
    }
}

fn is_ows(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}
