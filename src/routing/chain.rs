//! Ordered middleware chains.

use crate::http::handler::{Handler, Middleware};

/// An ordered list of middleware attached to a scope.
///
/// `[m0, m1, .., mn]` finalizes a handler `h` into `m0(m1(..mn(h)))`, so
/// `m0` runs its pre-delegation logic first and its post-delegation logic last.
#[derive(Clone, Debug, Default)]
pub struct Chain {
    middlewares: Vec<Middleware>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new chain with `extra` appended in argument order.
    ///
    /// `self` is left untouched so sibling scopes never see each other's additions.
    pub fn extend<I>(&self, extra: I) -> Chain
    where
        I: IntoIterator<Item = Middleware>,
    {
        let mut middlewares = self.middlewares.clone();
        middlewares.extend(extra);
        Chain { middlewares }
    }

    /// Compose the chain around `handler`.
    pub fn finalize(&self, handler: Handler) -> Handler {
        self.middlewares
            .iter()
            .rev()
            .fold(handler, |next, middleware| middleware.wrap(next))
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl FromIterator<Middleware> for Chain {
    fn from_iter<I: IntoIterator<Item = Middleware>>(iter: I) -> Self {
        Chain {
            middlewares: iter.into_iter().collect(),
        }
    }
}
