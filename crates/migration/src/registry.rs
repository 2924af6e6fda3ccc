//! The migration registry.
//!
//! Descriptors are registered in any order (contributors add migration files
//! independently) and [`MigrationRegistry::finalize`] produces the single
//! authoritative application order: ascending by version.

use crate::{MigrationDescriptor, SchemaError};

/// Collects migration descriptors before they are handed to the
/// [`SchemaApplier`](crate::SchemaApplier).
#[derive(Clone, Debug, Default)]
pub struct MigrationRegistry {
    descriptors: Vec<MigrationDescriptor>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor. Validation is deferred to [`finalize`](Self::finalize).
    pub fn register(&mut self, descriptor: MigrationDescriptor) -> &mut Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Returns the descriptors sorted ascending by version.
    ///
    /// Fails on the first pair of descriptors sharing a version, and on any
    /// descriptor with a blank description. The registry itself is left
    /// untouched, so repeated calls return the same sequence.
    ///
    /// # Errors
    ///
    /// [`SchemaError::DuplicateVersion`] or [`SchemaError::EmptyDescription`].
    pub fn finalize(&self) -> Result<Vec<MigrationDescriptor>, SchemaError> {
        let mut ordered = self.descriptors.clone();
        ordered.sort_by_key(MigrationDescriptor::version);

        for pair in ordered.windows(2) {
            if pair[0].version() == pair[1].version() {
                return Err(SchemaError::DuplicateVersion {
                    version: pair[0].version(),
                    first: pair[0].description().to_string(),
                    second: pair[1].description().to_string(),
                });
            }
        }

        if let Some(blank) = ordered.iter().find(|d| d.description().trim().is_empty()) {
            return Err(SchemaError::EmptyDescription {
                version: blank.version(),
            });
        }

        Ok(ordered)
    }
}

impl FromIterator<MigrationDescriptor> for MigrationRegistry {
    fn from_iter<I: IntoIterator<Item = MigrationDescriptor>>(iter: I) -> Self {
        Self {
            descriptors: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MigrationVersion;

    fn descriptor(version: u64, description: &str) -> MigrationDescriptor {
        MigrationDescriptor::up(version, description, "SELECT 1;")
    }

    fn versions(descriptors: &[MigrationDescriptor]) -> Vec<u64> {
        descriptors.iter().map(|d| d.version().get()).collect()
    }

    #[test]
    fn finalize_sorts_regardless_of_registration_order() {
        let mut registry = MigrationRegistry::new();
        registry
            .register(descriptor(20250201_000001, "c"))
            .register(descriptor(20250115_000001, "a"))
            .register(descriptor(20250115_000002, "b"));

        let ordered = registry.finalize().unwrap();
        assert_eq!(
            versions(&ordered),
            vec![20250115_000001, 20250115_000002, 20250201_000001]
        );
    }

    #[test]
    fn finalize_is_repeatable() {
        let registry: MigrationRegistry = [
            descriptor(20250201_000001, "c"),
            descriptor(20250115_000001, "a"),
        ]
        .into_iter()
        .collect();

        let first = registry.finalize().unwrap();
        let second = registry.finalize().unwrap();
        assert_eq!(first, second);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn finalize_rejects_duplicate_versions() {
        let mut registry = MigrationRegistry::new();
        registry
            .register(descriptor(20250115_000001, "create accounts"))
            .register(descriptor(20250201_000001, "unrelated"))
            .register(descriptor(20250115_000001, "create budgets"));

        let err = registry.finalize().unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateVersion {
                version: MigrationVersion::new(20250115_000001),
                first: "create accounts".to_string(),
                second: "create budgets".to_string(),
            }
        );
    }

    #[test]
    fn finalize_rejects_blank_description() {
        let mut registry = MigrationRegistry::new();
        registry.register(descriptor(20250115_000001, "  "));

        let err = registry.finalize().unwrap_err();
        assert_eq!(
            err,
            SchemaError::EmptyDescription {
                version: MigrationVersion::new(20250115_000001)
            }
        );
    }

    #[test]
    fn empty_registry_finalizes_to_nothing() {
        let registry = MigrationRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.finalize().unwrap().is_empty());
    }
}
