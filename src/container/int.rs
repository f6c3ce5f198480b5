// int.rs - Recycled view over an integer host vector.

use crate::container::base::{ContainerBase, Vectorize};

/// NA-aware integer vector with recycled access. Always shallow.
#[derive(Debug, Clone, Copy)]
pub struct IntContainer<'a> {
    base: ContainerBase,
    values: &'a [Option<i32>],
}

impl<'a> IntContainer<'a> {
    pub fn new(values: &'a [Option<i32>], nrecycle: usize) -> Self {
        IntContainer {
            base: ContainerBase::new(values.len(), nrecycle, true),
            values,
        }
    }

    pub fn vectorize(&self) -> Vectorize {
        self.base.vectorize()
    }

    pub fn is_na(&self, i: usize) -> bool {
        self.get(i).is_none()
    }

    /// Element `i`, `None` for NA or out of range.
    pub fn get(&self, i: usize) -> Option<i32> {
        if i >= self.base.nrecycle() {
            return None;
        }
        self.values[i % self.base.n()]
    }
}
