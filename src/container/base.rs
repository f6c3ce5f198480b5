// base.rs - Shared bookkeeping for vectorized containers.

use crate::context::{Context, Warning};
use crate::error::StriError;

/// Physical length `n`, recycled length `nrecycle` and the shallow flag.
///
/// Vectorized index `i` in `[0, nrecycle)` addresses slot `i % n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerBase {
    n: usize,
    nrecycle: usize,
    shallow: bool,
}

impl ContainerBase {
    /// `n` is the host vector length. A deep container stores
    /// `nrecycle` physical slots; a shallow one stores `n`.
    pub fn new(n: usize, nrecycle: usize, shallow: bool) -> Self {
        if n == 0 || nrecycle == 0 {
            return ContainerBase {
                n: 0,
                nrecycle: 0,
                shallow,
            };
        }
        ContainerBase {
            n: if shallow { n } else { nrecycle },
            nrecycle,
            shallow,
        }
    }

    /// Number of physically stored elements.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Logical length after recycling.
    pub fn nrecycle(&self) -> usize {
        self.nrecycle
    }

    pub fn is_shallow(&self) -> bool {
        self.shallow
    }

    /// True if elements may be modified in place.
    pub fn is_writable(&self) -> bool {
        !self.shallow && self.n == self.nrecycle
    }

    /// Physical slot for vectorized index `i`.
    pub fn slot(&self, i: usize) -> Result<usize, StriError> {
        contract!(
            i < self.nrecycle,
            "vectorized index {} out of range [0, {})",
            i,
            self.nrecycle
        );
        Ok(i % self.n.max(1))
    }

    /// Fail unless in-place writes are allowed.
    pub fn check_writable(&self, i: usize) -> Result<(), StriError> {
        if !self.is_writable() {
            return Err(StriError::Internal(format!(
                "write to element {} of a shallow or recycled container",
                i
            )));
        }
        if i >= self.n {
            return Err(StriError::Internal(format!(
                "write to element {} of a container of length {}",
                i, self.n
            )));
        }
        Ok(())
    }

    /// Vectorized indices in visiting order.
    pub fn vectorize(&self) -> Vectorize {
        Vectorize {
            next: 0,
            nrecycle: self.nrecycle,
        }
    }
}

/// Iterator over the vectorized index range, ascending.
#[derive(Debug, Clone)]
pub struct Vectorize {
    next: usize,
    nrecycle: usize,
}

impl Iterator for Vectorize {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next >= self.nrecycle {
            return None;
        }
        let i = self.next;
        self.next += 1;
        Some(i)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.nrecycle - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Vectorize {}

/// Common length of vectorized arguments.
///
/// Zero if any argument is empty, otherwise the longest length. With
/// `enable_warning`, warns when the longest is not a multiple of every
/// other length.
pub fn recycling_rule(ctx: &Context, enable_warning: bool, lengths: &[usize]) -> usize {
    if lengths.iter().any(|&len| len == 0) {
        return 0;
    }
    let nmax = lengths.iter().copied().max().unwrap_or(0);
    if enable_warning && lengths.iter().any(|&len| nmax % len != 0) {
        ctx.warn(Warning::RecyclingRule);
    }
    nmax
}
