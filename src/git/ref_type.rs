use std::fmt;

const BRANCH_PREFIX: &str = "refs/heads/";
const TAG_PREFIX: &str = "refs/tags/";

/// Git reference carried by a push event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefType {
    Branch(String),
    Tag(String),
    Other(String),
}

impl RefType {
    /// Name used in notifications: the bare branch name for branches, the
    /// full reference otherwise.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Branch(b) => b,
            Self::Tag(t) => t,
            Self::Other(o) => o,
        }
    }
}

impl From<&str> for RefType {
    fn from(value: &str) -> Self {
        if let Some(branch) = value.strip_prefix(BRANCH_PREFIX) {
            Self::Branch(branch.into())
        } else if value.starts_with(TAG_PREFIX) {
            Self::Tag(value.into())
        } else {
            Self::Other(value.into())
        }
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::RefType;

    #[test]
    fn test_branch_prefix_is_stripped() {
        let reference = RefType::from("refs/heads/feature/PROJ-123-fix");
        assert_eq!(reference, RefType::Branch("feature/PROJ-123-fix".into()));
        assert_eq!(reference.to_string(), "feature/PROJ-123-fix");
    }

    #[test]
    fn test_other_refs_are_kept_whole() {
        assert_eq!(RefType::from("refs/tags/v1.0").display_name(), "refs/tags/v1.0");
        assert_eq!(RefType::from("PROJ-1").display_name(), "PROJ-1");
    }
}
