//! Partial-update values for optional fields.

/// How an update treats one optional field.
///
/// `Keep` (the default) leaves the stored value alone, `Clear` stores NULL and
/// `Set` replaces it. Required fields use a plain `Option<T>` instead, where
/// `None` means keep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    /// True when the field is not mentioned by the update.
    #[must_use]
    pub const fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    /// The new column value, or `None` when the field is kept.
    ///
    /// `Some(None)` means the column is cleared.
    #[must_use]
    pub fn into_change(self) -> Option<Option<T>> {
        match self {
            Self::Keep => None,
            Self::Clear => Some(None),
            Self::Set(value) => Some(Some(value)),
        }
    }

    /// Borrow the value being set, if any.
    #[must_use]
    pub const fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            _ => None,
        }
    }

    /// Transform the value being set.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Self::Keep => Patch::Keep,
            Self::Clear => Patch::Clear,
            Self::Set(value) => Patch::Set(f(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_keep() {
        let patch: Patch<String> = Patch::default();
        assert!(patch.is_keep());
        assert_eq!(patch.into_change(), None);
    }

    #[test]
    fn test_clear_and_set_changes() {
        assert_eq!(Patch::<i32>::Clear.into_change(), Some(None));
        assert_eq!(Patch::Set(3).into_change(), Some(Some(3)));
        assert_eq!(Patch::Set(3).map(|v| v * 2), Patch::Set(6));
    }
}
