// join.rs - Joining the string vectors of a list.

use crate::container::{HostList, ListUtf8Container};
use crate::context::Context;
use crate::error::StriError;
use crate::host::NativeString;

/// Concatenate the strings of each list element, separated by `sep`.
///
/// The result is NA if the element or any of its strings is NA; an
/// empty element gives `""`.
///
/// ```
/// use strivec::join::join_list;
/// use strivec::{host_strs, host_vec, Context};
///
/// let ctx = Context::default();
/// let list = vec![Some(host_vec(&[Some("a"), Some("b")])), None];
/// let out = join_list(&ctx, &list, ", ").unwrap();
/// assert_eq!(host_strs(&out), vec![Some("a, b"), None]);
/// ```
pub fn join_list(
    ctx: &Context,
    list: &HostList,
    sep: &str,
) -> Result<Vec<Option<NativeString>>, StriError> {
    let cont = ListUtf8Container::new(ctx, list, list.len(), true)?;
    let mut ret = Vec::with_capacity(list.len());
    for i in cont.vectorize() {
        if cont.is_na(i) {
            ret.push(None);
            continue;
        }
        let strings = cont.get(i)?;
        let parts: Option<Vec<&str>> = strings
            .vectorize()
            .map(|j| {
                if strings.is_na(j) {
                    None
                } else {
                    strings.get(j).ok().map(|s| s.as_str())
                }
            })
            .collect();
        let Some(parts) = parts else {
            ret.push(None);
            continue;
        };
        ret.push(Some(NativeString::utf8(&parts.join(sep))));
    }
    Ok(ret)
}
