// list_utf8.rs - Container over a list of host string vectors.

use crate::container::base::{ContainerBase, Vectorize};
use crate::container::utf8::Utf8Container;
use crate::context::Context;
use crate::error::StriError;
use crate::host::NativeString;

/// Host list of string vectors; `None` is an NA list element.
pub type HostList = [Option<Vec<Option<NativeString>>>];

/// One [`Utf8Container`] per list element, with recycled access over
/// the list. Each sub-container keeps its own length.
#[derive(Debug, Clone)]
pub struct ListUtf8Container<'a> {
    base: ContainerBase,
    data: Vec<Option<Utf8Container<'a>>>,
}

impl<'a> ListUtf8Container<'a> {
    pub fn new(
        ctx: &Context,
        list: &'a HostList,
        nrecycle: usize,
        shallow: bool,
    ) -> Result<Self, StriError> {
        let base = ContainerBase::new(list.len(), nrecycle, shallow);
        let mut data = Vec::with_capacity(base.n());
        for element in list.iter().take(base.n()) {
            data.push(match element {
                Some(v) => Some(Utf8Container::new(ctx, v, v.len(), shallow)?),
                None => None,
            });
        }
        for i in data.len()..base.n() {
            let copy = data[i % list.len()].clone();
            data.push(copy);
        }
        Ok(ListUtf8Container { base, data })
    }

    pub fn n(&self) -> usize {
        self.base.n()
    }

    pub fn nrecycle(&self) -> usize {
        self.base.nrecycle()
    }

    pub fn vectorize(&self) -> Vectorize {
        self.base.vectorize()
    }

    pub fn is_na(&self, i: usize) -> bool {
        if i >= self.base.nrecycle() {
            return true;
        }
        self.data[i % self.base.n()].is_none()
    }

    /// Sub-container `i`; fails for NA.
    pub fn get(&self, i: usize) -> Result<&Utf8Container<'a>, StriError> {
        let slot = self.base.slot(i)?;
        self.data
            .get(slot)
            .and_then(Option::as_ref)
            .ok_or_else(|| StriError::Internal(format!("list element {} is NA", i)))
    }

    pub fn get_writable(&mut self, i: usize) -> Result<&mut Utf8Container<'a>, StriError> {
        self.base.check_writable(i)?;
        self.data[i]
            .as_mut()
            .ok_or_else(|| StriError::Internal(format!("list element {} is NA", i)))
    }
}
