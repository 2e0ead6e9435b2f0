use std::fmt;

/// Which homeserver implementation sent a report.
///
/// Decided once per request from the `User-Agent` header and never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerKind {
    Synapse,
    Dendrite,
}

impl ServerKind {
    pub const ALL: [ServerKind; 2] = [ServerKind::Synapse, ServerKind::Dendrite];

    /// Table the reports of this kind are written to.
    pub fn table(self) -> &'static str {
        match self {
            ServerKind::Synapse => "stats",
            ServerKind::Dendrite => "dendrite_stats",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServerKind::Synapse => "synapse",
            ServerKind::Dendrite => "dendrite",
        }
    }
}

impl fmt::Display for ServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a sender by its `User-Agent`.
///
/// Only a `Dendrite` prefix selects Dendrite. A missing header, an empty one,
/// or one that mentions Dendrite further in falls back to Synapse, which is
/// how every historical sender has been bucketed.
pub fn classify(user_agent: Option<&str>) -> ServerKind {
    match user_agent {
        Some(ua) if ua.starts_with("Dendrite") => ServerKind::Dendrite,
        _ => ServerKind::Synapse,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dendrite_prefix_is_dendrite() {
        assert_eq!(classify(Some("Dendrite/0.3.1")), ServerKind::Dendrite);
    }

    #[test]
    fn synapse_agent_is_synapse() {
        assert_eq!(classify(Some("Synapse/1.2")), ServerKind::Synapse);
    }

    #[test]
    fn empty_or_missing_agent_is_synapse() {
        assert_eq!(classify(Some("")), ServerKind::Synapse);
        assert_eq!(classify(None), ServerKind::Synapse);
    }

    #[test]
    fn dendrite_substring_is_not_enough() {
        assert_eq!(
            classify(Some("SomeDendriteClient/1.0")),
            ServerKind::Synapse
        );
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        assert_eq!(classify(Some("dendrite/0.13")), ServerKind::Synapse);
    }

    #[test]
    fn each_kind_has_its_own_table() {
        assert_eq!(ServerKind::Synapse.table(), "stats");
        assert_eq!(ServerKind::Dendrite.table(), "dendrite_stats");
    }
}
