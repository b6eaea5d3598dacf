//! The running map of winning versions, one entry per package.

use std::collections::BTreeMap;

use cpv_util::errors::CpvError;

use crate::version::ParsedVersion;

/// A versioned reference found in a document, before aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDeclaration {
    pub name: String,
    pub version: String,
    /// The element as it should appear in the manifest: renamed to the
    /// centralized tag, version attribute still present.
    pub rewritten_element: String,
}

/// The declaration currently holding the highest version for a package.
#[derive(Debug, Clone)]
pub struct AggregateEntry {
    pub element_text: String,
    pub version: ParsedVersion,
}

/// What [`Aggregate::upsert`] did with a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    /// The new version beat the stored one.
    Replaced { previous: ParsedVersion },
    /// The stored version is equal or higher and was kept.
    Kept { current: ParsedVersion },
}

/// Package name -> winning declaration.
///
/// Keys are case-sensitive and iterate in ordinal order.
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    entries: BTreeMap<String, AggregateEntry>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a declaration.
    ///
    /// A later declaration replaces the stored one only when its version is
    /// strictly greater; among equal versions the first one seen wins. A
    /// version that does not parse leaves the map untouched.
    pub fn upsert(
        &mut self,
        declaration: DependencyDeclaration,
    ) -> Result<UpsertOutcome, CpvError> {
        let version = ParsedVersion::parse(&declaration.version)?;

        match self.entries.get_mut(&declaration.name) {
            None => {
                self.entries.insert(
                    declaration.name,
                    AggregateEntry {
                        element_text: declaration.rewritten_element,
                        version,
                    },
                );
                Ok(UpsertOutcome::Inserted)
            }
            Some(entry) if version > entry.version => {
                let previous = std::mem::replace(&mut entry.version, version);
                entry.element_text = declaration.rewritten_element;
                Ok(UpsertOutcome::Replaced { previous })
            }
            Some(entry) => Ok(UpsertOutcome::Kept {
                current: entry.version.clone(),
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AggregateEntry> {
        self.entries.get(name)
    }

    /// Entries sorted by package name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AggregateEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
