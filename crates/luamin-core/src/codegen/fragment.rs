//! Output tree produced by the printer.
//!
//! A [`Fragment`] is an ordered list of text leaves and nested fragments.
//! Fragments that correspond to a source construct carry an [`Origin`];
//! [`Fragment::finalize`] flattens the tree into the output text and a
//! source map in one pass.

use super::separator::{needs_separator, Tail};
use super::sourcemap::{SourceMap, SourceMapBuilder};
use luamin_parser::SourcePosition;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Where a fragment came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub module: Arc<str>,
    pub position: SourcePosition,
}

/// How a module is listed in the source map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSource {
    pub path: String,
    /// Original text, written to `sourcesContent` when present.
    pub content: Option<String>,
}

impl MapSource {
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Piece {
    Text(String),
    Node(Fragment),
}

impl From<&str> for Piece {
    fn from(text: &str) -> Self {
        Piece::Text(text.to_string())
    }
}

impl From<String> for Piece {
    fn from(text: String) -> Self {
        Piece::Text(text)
    }
}

impl From<Fragment> for Piece {
    fn from(fragment: Fragment) -> Self {
        Piece::Node(fragment)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Fragment {
    children: Vec<Piece>,
    origin: Option<Origin>,
    name: Option<String>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            children: vec![Piece::Text(text.into())],
            ..Self::default()
        }
    }

    pub fn with_origin(module: Arc<str>, position: SourcePosition) -> Self {
        Self {
            origin: Some(Origin { module, position }),
            ..Self::default()
        }
    }

    /// Original identifier name, recorded in the source map's `names`.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Append without any separator check.
    pub fn append(&mut self, piece: impl Into<Piece>) -> &mut Self {
        self.children.push(piece.into());
        self
    }

    pub fn prepend(&mut self, piece: impl Into<Piece>) -> &mut Self {
        self.children.insert(0, piece.into());
        self
    }

    /// Append, inserting a space first if the two sides would otherwise fuse
    /// into different tokens.
    pub fn join(&mut self, piece: impl Into<Piece>) -> &mut Self {
        let piece = piece.into();
        let next = match &piece {
            Piece::Text(text) => text.chars().next(),
            Piece::Node(fragment) => fragment.first_char(),
        };
        if needs_separator(self.tail(), next) {
            self.children.push(Piece::Text(" ".to_string()));
        }
        self.children.push(piece);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.first_char().is_none()
    }

    pub fn first_char(&self) -> Option<char> {
        let mut stack: Vec<std::slice::Iter<'_, Piece>> = vec![self.children.iter()];
        while let Some(iter) = stack.last_mut() {
            match iter.next() {
                None => {
                    stack.pop();
                }
                Some(Piece::Text(text)) => {
                    if let Some(c) = text.chars().next() {
                        return Some(c);
                    }
                }
                Some(Piece::Node(fragment)) => stack.push(fragment.children.iter()),
            }
        }
        None
    }

    pub fn last_char(&self) -> Option<char> {
        self.tail().last
    }

    /// The last two characters of the rendered text.
    pub fn tail(&self) -> Tail {
        let mut found: Vec<char> = Vec::with_capacity(2);
        let mut stack: Vec<std::iter::Rev<std::slice::Iter<'_, Piece>>> =
            vec![self.children.iter().rev()];
        while let Some(iter) = stack.last_mut() {
            match iter.next() {
                None => {
                    stack.pop();
                }
                Some(Piece::Text(text)) => {
                    for c in text.chars().rev() {
                        found.push(c);
                        if found.len() == 2 {
                            return Tail {
                                last: Some(found[0]),
                                before_last: Some(found[1]),
                            };
                        }
                    }
                }
                Some(Piece::Node(fragment)) => stack.push(fragment.children.iter().rev()),
            }
        }
        Tail {
            last: found.first().copied(),
            before_last: None,
        }
    }

    /// Flatten into output text and a source map. `describe` is asked once
    /// per module for its entry in the map's `sources`.
    pub fn finalize<F>(self, file: Option<&str>, describe: F) -> (String, SourceMap)
    where
        F: Fn(&str) -> MapSource,
    {
        let mut builder = SourceMapBuilder::new();
        if let Some(file) = file {
            builder.set_file(file);
        }
        let mut source_indices: FxHashMap<Arc<str>, usize> = FxHashMap::default();
        let mut output = String::new();

        let mut record = |builder: &mut SourceMapBuilder, fragment: &Fragment| {
            if let Some(origin) = &fragment.origin {
                let index = match source_indices.get(&origin.module) {
                    Some(&index) => index,
                    None => {
                        let source = describe(&origin.module);
                        let index = builder.add_source(&source.path);
                        if let Some(content) = source.content {
                            builder.set_source_content(index, content);
                        }
                        source_indices.insert(origin.module.clone(), index);
                        index
                    }
                };
                builder.add_mapping(index, origin.position, fragment.name.as_deref());
            }
        };

        record(&mut builder, &self);
        let mut stack: Vec<std::slice::Iter<'_, Piece>> = vec![self.children.iter()];
        while let Some(iter) = stack.last_mut() {
            match iter.next() {
                None => {
                    stack.pop();
                }
                Some(Piece::Text(text)) => {
                    output.push_str(text);
                    builder.advance(text);
                }
                Some(Piece::Node(fragment)) => {
                    record(&mut builder, fragment);
                    stack.push(fragment.children.iter());
                }
            }
        }

        (output, builder.build())
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack: Vec<std::slice::Iter<'_, Piece>> = vec![self.children.iter()];
        while let Some(iter) = stack.last_mut() {
            match iter.next() {
                None => {
                    stack.pop();
                }
                Some(Piece::Text(text)) => f.write_str(text)?,
                Some(Piece::Node(fragment)) => stack.push(fragment.children.iter()),
            }
        }
        Ok(())
    }
}
