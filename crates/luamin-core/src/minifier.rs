//! Short identifier assignment.
//!
//! Candidates come from an odometer over [`IDENTIFIER_ALPHABET`]. When every
//! position has rolled over the name grows by one symbol and restarts at
//! `a000…`, so a candidate never starts with a digit.

use luamin_parser::is_keyword;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

pub const IDENTIFIER_ALPHABET: &[u8; 63] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_";

/// Names that keep their spelling wherever they appear.
pub const PRESERVED_NAMES: &[&str] = &["self"];

const FIRST_LETTER: usize = 10;

/// Odometer over the identifier alphabet.
#[derive(Debug, Clone, Default)]
pub struct NameGenerator {
    digits: Vec<usize>,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step to the next candidate and return it.
    pub fn advance(&mut self) -> String {
        let max = IDENTIFIER_ALPHABET.len() - 1;
        let mut position = self.digits.len();
        let mut stepped = false;
        while position > 0 {
            position -= 1;
            if self.digits[position] < max {
                self.digits[position] += 1;
                for digit in &mut self.digits[position + 1..] {
                    *digit = 0;
                }
                stepped = true;
                break;
            }
        }
        if !stepped {
            let length = self.digits.len();
            self.digits.clear();
            self.digits.push(FIRST_LETTER);
            self.digits.resize(length + 1, 0);
        }
        self.current()
    }

    pub fn current(&self) -> String {
        self.digits
            .iter()
            .map(|&index| IDENTIFIER_ALPHABET[index] as char)
            .collect()
    }
}

/// Per-run renaming state: the reserved global names, the memoized
/// original-to-short bindings and the shared generator.
#[derive(Debug, Default)]
pub struct MinifySession {
    generator: NameGenerator,
    reserved: FxHashSet<String>,
    bindings: FxHashMap<String, String>,
    assigned: FxHashSet<String>,
}

impl MinifySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reserved<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut session = Self::new();
        session.reserve(names);
        session
    }

    /// Mark global names so they are never handed out.
    pub fn reserve<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.reserved.insert(name.as_ref().to_string());
        }
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        is_keyword(name) || self.reserved.contains(name)
    }

    /// Short name for a local identifier. The same original always maps to
    /// the same short name within a session.
    pub fn rename(&mut self, original: &str) -> String {
        if PRESERVED_NAMES.contains(&original) {
            return original.to_string();
        }
        if let Some(short) = self.bindings.get(original) {
            return short.clone();
        }
        let short = self.fresh_name();
        trace!(original, short = short.as_str(), "assigned short name");
        self.bindings.insert(original.to_string(), short.clone());
        short
    }

    /// A new name distinct from every reserved, keyword or assigned name.
    pub fn fresh_name(&mut self) -> String {
        loop {
            let candidate = self.generator.advance();
            if self.is_reserved(&candidate)
                || self.assigned.contains(&candidate)
                || PRESERVED_NAMES.contains(&candidate.as_str())
            {
                continue;
            }
            self.assigned.insert(candidate.clone());
            return candidate;
        }
    }

    pub fn binding(&self, original: &str) -> Option<&str> {
        self.bindings.get(original).map(String::as_str)
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }
}
