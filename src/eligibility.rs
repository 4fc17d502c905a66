//! Allow/deny policy deciding which discovered items get boosted.
//!
//! Lists are lower-cased once via [`EligibilityPolicy::normalized`] when the
//! configuration is loaded, so [`is_eligible`] only lower-cases the item.

use serde::{Deserialize, Serialize};

use crate::domain::Item;

/// Items listed here are the only ones boosted (when non-empty).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AllowList {
    /// Exact resume ids
    pub ids: Vec<String>,
    /// Title substrings
    pub substrings: Vec<String>,
}

impl AllowList {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.substrings.is_empty()
    }
}

/// Items matching here are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DenyList {
    /// Exact resume ids
    pub ids: Vec<String>,
    /// Title substrings
    pub substrings: Vec<String>,
    /// Skip every public resume
    pub public: bool,
    /// Skip every private resume
    pub private: bool,
}

impl DenyList {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.substrings.is_empty() && !self.public && !self.private
    }
}

/// Snapshot of the allow/deny configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EligibilityPolicy {
    pub allowed: AllowList,
    pub ignored: DenyList,
}

impl EligibilityPolicy {
    /// Lower-case every id and substring.
    pub fn normalized(mut self) -> Self {
        lowercase_all(&mut self.allowed.ids);
        lowercase_all(&mut self.allowed.substrings);
        lowercase_all(&mut self.ignored.ids);
        lowercase_all(&mut self.ignored.substrings);
        self
    }
}

fn lowercase_all(values: &mut [String]) {
    for value in values.iter_mut() {
        *value = value.to_lowercase();
    }
}

/// Decide whether `item` should be scheduled under `policy`.
///
/// A non-empty allow-list wins outright; the deny-list is only consulted
/// when nothing is explicitly allowed.
pub fn is_eligible(item: &Item, policy: &EligibilityPolicy) -> bool {
    let id = item.id.to_lowercase();
    let title = item.title.to_lowercase();

    if !policy.allowed.is_empty() {
        return policy.allowed.ids.contains(&id)
            || policy.allowed.substrings.iter().any(|s| title.contains(s.as_str()));
    }

    let deny = &policy.ignored;
    if deny.public && item.visible {
        return false;
    }
    if deny.private && !item.visible {
        return false;
    }

    if deny.ids.contains(&id) {
        return false;
    }
    !deny.substrings.iter().any(|s| title.contains(s.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(id: &str, title: &str, visible: bool) -> Item {
        Item::new(id, title, visible, Utc::now(), "xsrf")
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_policy_allows_everything() {
        let policy = EligibilityPolicy::default();
        assert!(is_eligible(&item("r1", "Backend", true), &policy));
        assert!(is_eligible(&item("r2", "Frontend", false), &policy));
    }

    #[test]
    fn test_allow_list_by_id() {
        let policy = EligibilityPolicy {
            allowed: AllowList {
                ids: strings(&["r1"]),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(is_eligible(&item("r1", "Backend", true), &policy));
        assert!(!is_eligible(&item("r2", "Backend", true), &policy));
    }

    #[test]
    fn test_allow_list_by_substring() {
        let policy = EligibilityPolicy {
            allowed: AllowList {
                substrings: strings(&["rust"]),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(is_eligible(&item("r1", "Senior RUST Engineer", true), &policy));
        assert!(!is_eligible(&item("r2", "Go Engineer", true), &policy));
    }

    #[test]
    fn test_allow_list_takes_precedence_over_deny_list() {
        let policy = EligibilityPolicy {
            allowed: AllowList {
                ids: strings(&["r1"]),
                ..Default::default()
            },
            ignored: DenyList {
                ids: strings(&["r1"]),
                public: true,
                ..Default::default()
            },
        };
        assert!(is_eligible(&item("r1", "Backend", true), &policy));
    }

    #[test]
    fn test_deny_public() {
        let policy = EligibilityPolicy {
            ignored: DenyList {
                public: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(!is_eligible(&item("r1", "Backend", true), &policy));
        assert!(is_eligible(&item("r2", "Backend", false), &policy));
    }

    #[test]
    fn test_deny_private() {
        let policy = EligibilityPolicy {
            ignored: DenyList {
                private: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(is_eligible(&item("r1", "Backend", true), &policy));
        assert!(!is_eligible(&item("r2", "Backend", false), &policy));
    }

    #[test]
    fn test_deny_by_id_and_substring() {
        let policy = EligibilityPolicy {
            ignored: DenyList {
                ids: strings(&["r1"]),
                substrings: strings(&["intern"]),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(!is_eligible(&item("r1", "Backend", true), &policy));
        assert!(!is_eligible(&item("r2", "Summer Internship", true), &policy));
        assert!(is_eligible(&item("r3", "Backend", true), &policy));
    }

    #[test]
    fn test_id_match_is_case_insensitive() {
        let policy = EligibilityPolicy {
            ignored: DenyList {
                ids: strings(&["ABC"]),
                ..Default::default()
            },
            ..Default::default()
        }
        .normalized();
        assert!(!is_eligible(&item("aBc", "Backend", true), &policy));
    }

    #[test]
    fn test_normalized_lowercases_every_list() {
        let policy = EligibilityPolicy {
            allowed: AllowList {
                ids: strings(&["R1"]),
                substrings: strings(&["Rust"]),
            },
            ignored: DenyList {
                ids: strings(&["R2"]),
                substrings: strings(&["Go"]),
                ..Default::default()
            },
        }
        .normalized();
        assert_eq!(policy.allowed.ids, strings(&["r1"]));
        assert_eq!(policy.allowed.substrings, strings(&["rust"]));
        assert_eq!(policy.ignored.ids, strings(&["r2"]));
        assert_eq!(policy.ignored.substrings, strings(&["go"]));
    }

    #[test]
    fn test_deny_list_emptiness() {
        assert!(DenyList::default().is_empty());
        let deny = DenyList {
            private: true,
            ..Default::default()
        };
        assert!(!deny.is_empty());
    }
}
