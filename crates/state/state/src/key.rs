use serde::{Deserialize, Serialize};

/// The kind of entry being stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    /// A serialized file record.
    Meta,
    /// A remaining-download counter.
    Limit,
}

impl KeyKind {
    /// Return a string representation of the key kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Meta => "meta",
            Self::Limit => "limit",
        }
    }
}

impl std::fmt::Display for KeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key used to address entries in the metadata store.
///
/// Both keys for one share derive from the same reference id, so record and
/// counter always live and die together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetaKey {
    pub kind: KeyKind,
    pub id: String,
}

impl MetaKey {
    /// Key for the serialized file record of `id`.
    #[must_use]
    pub fn meta(id: impl Into<String>) -> Self {
        Self {
            kind: KeyKind::Meta,
            id: id.into(),
        }
    }

    /// Key for the remaining-download counter of `id`.
    #[must_use]
    pub fn limit(id: impl Into<String>) -> Self {
        Self {
            kind: KeyKind::Limit,
            id: id.into(),
        }
    }

    /// Return the canonical string representation: `kind:id`.
    #[must_use]
    pub fn canonical(&self) -> String {
        format!("{}:{}", self.kind, self.id)
    }
}

impl std::fmt::Display for MetaKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical())
    }
}
