//! Failure handling policy shared by the dispatcher and the compiler passes

/// What to do when an operation cannot be applied or converted
///
/// `BestEffort` only ever covers "this operation has no usable effect or
/// rewrite". Shape, configuration and validation errors are always fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort with an error naming the operation
    #[default]
    Strict,
    /// Leave the operation untouched and continue
    BestEffort,
}

impl FailurePolicy {
    /// Whether unsupported operations should be passed over
    #[inline]
    pub fn ignores_failures(self) -> bool {
        matches!(self, Self::BestEffort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_strict() {
        assert_eq!(FailurePolicy::default(), FailurePolicy::Strict);
        assert!(!FailurePolicy::Strict.ignores_failures());
        assert!(FailurePolicy::BestEffort.ignores_failures());
    }
}
