pub mod expressions;
pub mod fragment;
pub mod operators;
pub mod separator;
pub mod sourcemap;
pub mod statements;

pub use fragment::{Fragment, MapSource, Origin, Piece};
pub use sourcemap::{SourceMap, SourceMapBuilder};

use crate::minifier::MinifySession;
use luamin_parser::ast::{Block, Chunk, Identifier};
use luamin_parser::SourcePosition;
use std::sync::Arc;

/// Prints one module's AST as minified Lua.
///
/// Local identifiers are renamed through the shared [`MinifySession`]; every
/// statement, expression and identifier becomes a [`Fragment`] tagged with
/// its source position in `module`.
pub struct Printer<'s> {
    session: &'s mut MinifySession,
    module: Arc<str>,
}

impl<'s> Printer<'s> {
    pub fn new(session: &'s mut MinifySession, module: impl Into<Arc<str>>) -> Self {
        Self {
            session,
            module: module.into(),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn print_chunk(&mut self, chunk: &Chunk) -> Fragment {
        let mut fragment = self.node(SourcePosition::default());
        fragment.append(self.print_block(&chunk.body));
        fragment
    }

    pub fn print_block(&mut self, block: &Block) -> Fragment {
        let mut fragment = Fragment::new();
        for statement in block {
            let printed = self.print_statement(statement);
            // `f()` followed by `(g)()` would otherwise read as one call chain.
            if !fragment.is_empty() && printed.first_char() == Some('(') {
                fragment.append(";");
            }
            fragment.join(printed);
        }
        fragment
    }

    fn node(&self, position: SourcePosition) -> Fragment {
        Fragment::with_origin(self.module.clone(), position)
    }

    fn print_identifier(&mut self, identifier: &Identifier) -> Fragment {
        let mut fragment = self.node(identifier.position);
        if identifier.is_local {
            let short = self.session.rename(&identifier.name);
            if short != identifier.name {
                fragment.set_name(identifier.name.as_str());
            }
            fragment.append(short);
        } else {
            fragment.append(identifier.name.as_str());
        }
        fragment
    }

    /// Print `items` separated by commas.
    fn print_list<T>(
        &mut self,
        items: &[T],
        mut print: impl FnMut(&mut Self, &T) -> Fragment,
    ) -> Fragment {
        let mut fragment = Fragment::new();
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                fragment.append(",");
            }
            let printed = print(self, item);
            fragment.join(printed);
        }
        fragment
    }
}
