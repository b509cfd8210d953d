use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The reference id failed to parse as a version-4 UUID.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed reference id")]
pub struct ParseIdError;

/// The public handle for one uploaded blob.
///
/// A random 128-bit value rendered in the standard textual UUID form,
/// version 4. Carries no information beyond identity; all store keys are
/// derived from it deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceId(Uuid);

impl ReferenceId {
    /// Generate a fresh, unguessable reference id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a reference id from its textual form.
    ///
    /// Accepts only well-formed version-4 UUIDs; anything else is rejected
    /// before any store is consulted.
    pub fn parse(input: &str) -> Result<Self, ParseIdError> {
        let uuid = Uuid::try_parse(input).map_err(|_| ParseIdError)?;
        if uuid.get_version_num() != 4 {
            return Err(ParseIdError);
        }
        Ok(Self(uuid))
    }

    /// The blob store locator for the uploaded bytes.
    #[must_use]
    pub fn blob_key(&self) -> String {
        format!("files/{}", self.0)
    }
}

impl std::fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
