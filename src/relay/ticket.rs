use std::{collections::BTreeSet, fmt};

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TicketError {
    #[error("empty project key, refusing to build a ticket pattern.")]
    EmptyProjectKey,
    #[error("could not build ticket pattern for project key '{0}'.")]
    InvalidPattern(String, #[source] regex::Error),
}

/// Backlog issue key, e.g. `PROJ-123`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TicketId(String);

impl TicketId {
    pub fn new<T: Into<String>>(value: T) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Matches ticket keys of a single project.
#[derive(Debug, Clone)]
pub struct TicketPattern {
    regex: Regex,
}

impl TicketPattern {
    pub fn new(project_key: &str, require_hyphen: bool) -> Result<Self, TicketError> {
        let project_key = project_key.trim();
        if project_key.is_empty() {
            return Err(TicketError::EmptyProjectKey);
        }

        let separator = if require_hyphen { "-" } else { "-?" };
        let pattern = format!("{}{separator}[0-9]+", regex::escape(project_key));
        let regex = Regex::new(&pattern)
            .map_err(|e| TicketError::InvalidPattern(project_key.into(), e))?;

        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn extract(&self, text: &str) -> TicketSet {
        let mut set = TicketSet::new();
        set.extend_from(self, text);
        set
    }
}

/// Deduplicated tickets referenced by one event.
///
/// Iteration is ordered by key so dispatch is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketSet(BTreeSet<TicketId>);

impl TicketSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend_from(&mut self, pattern: &TicketPattern, text: &str) {
        self.0.extend(
            pattern
                .regex
                .find_iter(text)
                .map(|m| TicketId::new(m.as_str())),
        );
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TicketId> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a TicketSet {
    type Item = &'a TicketId;
    type IntoIter = std::collections::btree_set::Iter<'a, TicketId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for TicketSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<_> = self.0.iter().map(TicketId::as_str).collect();
        write!(f, "[{}]", keys.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::{TicketError, TicketPattern, TicketSet};

    fn keys(set: &TicketSet) -> Vec<&str> {
        set.iter().map(|t| t.as_str()).collect()
    }

    #[test]
    fn test_branch_and_commit_are_merged() {
        let pattern = TicketPattern::new("PROJ", false).unwrap();
        let mut set = pattern.extract("feature/PROJ-123-fix");
        set.extend_from(&pattern, "Fix parser\n\nRefs PROJ-456");

        assert_eq!(keys(&set), vec!["PROJ-123", "PROJ-456"]);
    }

    #[test]
    fn test_duplicates_are_collapsed() {
        let pattern = TicketPattern::new("PROJ", false).unwrap();
        let mut set = pattern.extract("PROJ-1 and PROJ-1 again");
        set.extend_from(&pattern, "PROJ-1");
        set.extend_from(&pattern, "still PROJ-1, now PROJ-2");

        assert_eq!(set.len(), 2);
        assert_eq!(keys(&set), vec!["PROJ-1", "PROJ-2"]);
    }

    #[test]
    fn test_hyphen_is_optional_by_default() {
        let pattern = TicketPattern::new("PROJ", false).unwrap();
        let set = pattern.extract("PROJ12 PROJ-34");

        assert_eq!(keys(&set), vec!["PROJ-34", "PROJ12"]);
    }

    #[test]
    fn test_hyphen_can_be_required() {
        let pattern = TicketPattern::new("PROJ", true).unwrap();
        let set = pattern.extract("PROJ12 PROJ-34");

        assert_eq!(keys(&set), vec!["PROJ-34"]);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let pattern = TicketPattern::new("PROJ", false).unwrap();
        assert!(pattern.extract("proj-1 Proj-2").is_empty());
    }

    #[test]
    fn test_no_match() {
        let pattern = TicketPattern::new("PROJ", false).unwrap();
        assert!(pattern.extract("main").is_empty());
        assert!(pattern.extract("PROJ-").is_empty());
    }

    #[test]
    fn test_project_key_is_escaped() {
        let pattern = TicketPattern::new("A.B", true).unwrap();
        let set = pattern.extract("AxB-1 A.B-2");

        assert_eq!(keys(&set), vec!["A.B-2"]);
    }

    #[test]
    fn test_empty_project_key() {
        assert_matches!(TicketPattern::new("", false), Err(TicketError::EmptyProjectKey));
        assert_matches!(TicketPattern::new("  ", true), Err(TicketError::EmptyProjectKey));
    }

    #[test]
    fn test_display() {
        let pattern = TicketPattern::new("PROJ", false).unwrap();
        assert_eq!(pattern.as_str(), "PROJ-?[0-9]+");
        assert_eq!(pattern.extract("PROJ-2 PROJ-1").to_string(), "[PROJ-1, PROJ-2]");
    }
}
