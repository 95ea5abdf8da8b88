use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of one browsing visit.
///
/// Only [`VisitorId::mint`] creates new ids. [`VisitorId::parse`] recovers an
/// id a front end handed out earlier (e.g., from its own cookie); it never
/// creates registry state on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorId(Uuid);

impl VisitorId {
    pub fn mint() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim()).ok().map(Self)
    }
}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minted_ids_are_distinct() {
        assert_ne!(VisitorId::mint(), VisitorId::mint());
    }

    #[test]
    fn test_parse_roundtrip() {
        let id = VisitorId::mint();
        assert_eq!(VisitorId::parse(&id.to_string()), Some(id));
        assert_eq!(VisitorId::parse("not-a-visitor"), None);
    }
}
