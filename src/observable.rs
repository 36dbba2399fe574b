//! Plain observable values for view adapters.

/// A value plus a version that is bumped on every real change.
///
/// A presentation layer can remember the version it last rendered and compare,
/// instead of needing a callback mechanism from any particular toolkit.
#[derive(Clone, Debug, Default)]
pub struct Observable<T> {
    value: T,
    version: u64,
}

impl<T: PartialEq> Observable<T> {
    pub fn new(value: T) -> Self {
        Self { value, version: 0 }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Stores `value` if it differs from the current one. Returns whether it changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value != value {
            self.value = value;
            self.version += 1;
            true
        } else {
            false
        }
    }
}

impl<T: Copy> Observable<T> {
    /// Returns a copy of the value.
    pub fn value(&self) -> T {
        self.value
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn version_only_moves_on_change() {
        let mut percent = Observable::new(0.0);
        assert_eq!(percent.version(), 0);

        assert!(percent.set(12.5));
        assert!(!percent.set(12.5));
        assert_eq!(percent.version(), 1);
        assert_eq!(percent.value(), 12.5);

        assert!(percent.set(0.0));
        assert_eq!(percent.version(), 2);
    }

    #[test]
    fn works_with_owned_values() {
        let mut text = Observable::<String>::default();
        assert!(text.set("1.50 KB".to_string()));
        assert_eq!(text.get(), "1.50 KB");
    }
}
