use super::Parser;
use crate::ast::Identifier;
use crate::span::SourcePosition;

impl Parser {
    pub(super) fn push_scope(&mut self) {
        self.scopes.push(Default::default());
    }

    pub(super) fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Bring `name` into the innermost scope. Must be called only once the
    /// binding is visible, e.g. after a `local` statement's initializers.
    pub(super) fn declare(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string());
        }
    }

    fn is_local(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|scope| scope.contains(name))
    }

    /// A binding site: always local.
    pub(super) fn binding(&self, name: String, position: SourcePosition) -> Identifier {
        Identifier {
            name,
            is_local: true,
            position,
        }
    }

    /// A use site: local if any open scope declares it, global otherwise.
    pub(super) fn reference(&mut self, name: String, position: SourcePosition) -> Identifier {
        let is_local = self.is_local(&name);
        if !is_local {
            self.globals.insert(name.clone());
        }
        Identifier {
            name,
            is_local,
            position,
        }
    }
}
