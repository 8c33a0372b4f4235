//! Decides where a space is needed so that adjacent fragments do not lex as
//! a different token stream.

/// The last two characters of already emitted text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tail {
    pub last: Option<char>,
    pub before_last: Option<char>,
}

impl Tail {
    pub fn of(text: &str) -> Self {
        let mut chars = text.chars().rev();
        let last = chars.next();
        let before_last = chars.next();
        Tail { last, before_last }
    }
}

fn is_alpha_underscore(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alnum_underscore(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether a single space must separate `tail` from text starting with `next`.
pub fn needs_separator(tail: Tail, next: Option<char>) -> bool {
    let (Some(last), Some(next)) = (tail.last, next) else {
        return false;
    };

    if is_alpha_underscore(last) {
        return is_alnum_underscore(next);
    }

    if last.is_ascii_digit() {
        // `1 ..x` and `1 e` must not fuse into a malformed numeral.
        return next != '(' && (next == '.' || is_alpha_underscore(next));
    }

    match (last, next) {
        // `--` would open a comment.
        ('-', '-') => true,
        // `1.` followed by a name would extend the numeral.
        ('.', n) if tail.before_last != Some('.') && is_alnum_underscore(n) => true,
        // `..` followed by `.5` would read as `...`.
        ('.', '.') => true,
        // `[` followed by `[` or `=` would open a long bracket.
        ('[', '[' | '=') => true,
        _ => false,
    }
}

/// Concatenate two strings, inserting a space only when required.
pub fn join(left: &str, right: &str) -> String {
    let mut out = String::with_capacity(left.len() + right.len() + 1);
    out.push_str(left);
    if needs_separator(Tail::of(left), right.chars().next()) {
        out.push(' ');
    }
    out.push_str(right);
    out
}
