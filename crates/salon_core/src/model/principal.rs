//! Opaque caller identity supplied by the hosting runtime.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const ANONYMOUS_PRINCIPAL_TEXT: &str = "2vxsx-fae";

/// Identity of the caller of one entry-point invocation.
///
/// The registry never inspects the inner text; it only compares principals
/// for ownership checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Builds a principal from its textual form.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Identity used when the host does not authenticate the caller.
    pub fn anonymous() -> Self {
        Self(ANONYMOUS_PRINCIPAL_TEXT.to_string())
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS_PRINCIPAL_TEXT
    }

    /// Identity equality used by every ownership check.
    pub fn equals(&self, other: &Principal) -> bool {
        self == other
    }

    pub fn as_text(&self) -> &str {
        &self.0
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
