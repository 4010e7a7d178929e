//! Package identity with normalized comparison.
//!
//! The authoritative list and the mirror index spell project names
//! differently (`Foo_Bar`, `foo-bar`, `FOO.BAR`). [`PackageIdentity`] keeps
//! the raw spelling for display but compares, orders and hashes only on the
//! comparable form.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A package name compared by its normalized form.
///
/// # Examples
///
/// ```
/// use bandersnatch_audit::identity::PackageIdentity;
///
/// let a = PackageIdentity::new("Foo_Bar");
/// let b = PackageIdentity::new("foo.bar");
/// assert_eq!(a, b);
/// assert_eq!(a.comparable(), "foo-bar");
/// assert_eq!(a.to_string(), "Foo_Bar");
/// ```
#[derive(Clone)]
pub struct PackageIdentity {
    name: String,
    comparable: String,
}

impl PackageIdentity {
    /// Create an identity from a raw project name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let comparable = comparable_form(&name);
        Self { name, comparable }
    }

    /// The name as it was spelled by its source.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The lowercase, `-`-separated form used for comparison.
    #[must_use]
    pub fn comparable(&self) -> &str {
        &self.comparable
    }
}

/// Lowercase `name` and replace `_` and `.` with `-`.
fn comparable_form(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '_' | '.' => '-',
            other => other,
        })
        .collect::<String>()
        .to_lowercase()
}

impl PartialEq for PackageIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.comparable == other.comparable
    }
}

impl Eq for PackageIdentity {}

impl Hash for PackageIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.comparable.hash(state);
    }
}

impl PartialOrd for PackageIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageIdentity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.comparable.cmp(&other.comparable)
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Debug for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self.name, self.comparable)
    }
}

impl From<&str> for PackageIdentity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PackageIdentity {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
