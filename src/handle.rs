//! Modifier handles.

use std::fmt;

/// Opaque token for one applied modifier.
///
/// Handles are minted by [`StatInstance::add_modifier`](crate::StatInstance::add_modifier)
/// and can only be presented back for removal. The default handle is
/// invalid and never matches anything.
///
/// # Examples
///
/// ```rust
/// use zzattr::ModifierHandle;
///
/// let handle = ModifierHandle::default();
/// assert!(!handle.is_valid());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModifierHandle {
    id: u64,
}

impl ModifierHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self { id }
    }

    pub(crate) fn id(self) -> u64 {
        self.id
    }

    /// `false` for the default (id 0) handle.
    pub fn is_valid(self) -> bool {
        self.id != 0
    }
}

impl fmt::Display for ModifierHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.id)
        } else {
            f.write_str("#invalid")
        }
    }
}
