//! Scope versioning
//!
//! Every day or department change advances a monotonic token. Fetches are
//! tagged with the token current when they were issued, and results tagged
//! with an older token are dropped instead of overwriting newer state.

use crate::domain::{FilterContext, Result, RoundsError};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeToken(u64);

impl ScopeToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScopeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A fetch issued for one filter context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeRequest {
    pub token: ScopeToken,
    pub filter: FilterContext,
}

#[derive(Debug, Default)]
pub struct ScopeTracker {
    current: u64,
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> ScopeToken {
        ScopeToken(self.current)
    }

    /// Invalidate every outstanding request
    pub fn advance(&mut self) -> ScopeToken {
        self.current += 1;
        self.current()
    }

    /// Tag a request for `filter` with the current token
    pub fn issue(&self, filter: FilterContext) -> ScopeRequest {
        ScopeRequest {
            token: self.current(),
            filter,
        }
    }

    /// Fail with [`RoundsError::StaleScope`] if `token` is no longer current
    pub fn ensure_current(&self, token: ScopeToken) -> Result<()> {
        if token.0 == self.current {
            Ok(())
        } else {
            Err(RoundsError::StaleScope {
                issued: token.0,
                current: self.current,
            })
        }
    }
}
