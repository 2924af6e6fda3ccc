//! Migration descriptors: one immutable, versioned unit of forward schema change.

use std::fmt;

/// Version of a migration, `YYYYMMDD` followed by a six digit per-day sequence.
///
/// Stored as a single integer so that ordering is plain integer ordering:
/// `20250115_000002` sorts after `20250115_000001` and before `20250201_000001`.
///
/// ```rust
/// use migration::MigrationVersion;
///
/// let version = MigrationVersion::from_parts(20250115, 2);
/// assert_eq!(version.get(), 20250115_000002);
/// assert_eq!(version.to_string(), "20250115_000002");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MigrationVersion(u64);

impl MigrationVersion {
    const SEQUENCE_SPAN: u64 = 1_000_000;

    /// Creates a version from its integer encoding.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Creates a version from a `YYYYMMDD` date and a per-day sequence number.
    ///
    /// The sequence is expected to be below one million; the convention is a
    /// caller contract and is not enforced here.
    #[must_use]
    pub const fn from_parts(date: u32, sequence: u32) -> Self {
        Self(date as u64 * Self::SEQUENCE_SPAN + sequence as u64)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The `YYYYMMDD` part.
    #[must_use]
    pub const fn date(self) -> u64 {
        self.0 / Self::SEQUENCE_SPAN
    }

    /// The per-day sequence part.
    #[must_use]
    pub const fn sequence(self) -> u64 {
        self.0 % Self::SEQUENCE_SPAN
    }
}

impl fmt::Display for MigrationVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{:06}", self.date(), self.sequence())
    }
}

impl From<u64> for MigrationVersion {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Direction of a migration. Only forward migrations exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MigrationKind {
    Up,
}

impl MigrationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
        }
    }
}

/// One forward schema change.
///
/// The script is opaque to the registry: it is executed verbatim by the
/// [`SchemaApplier`](crate::SchemaApplier).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MigrationDescriptor {
    version: MigrationVersion,
    description: String,
    script: String,
    kind: MigrationKind,
}

impl MigrationDescriptor {
    /// Describes a forward migration. `version` uses the integer encoding of
    /// [`MigrationVersion`].
    pub fn up(version: u64, description: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            version: MigrationVersion::new(version),
            description: description.into(),
            script: script.into(),
            kind: MigrationKind::Up,
        }
    }

    pub fn version(&self) -> MigrationVersion {
        self.version
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn kind(&self) -> MigrationKind {
        self.kind
    }
}
