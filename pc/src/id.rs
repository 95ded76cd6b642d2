//! Opaque ID generation and resolution
//!
//! All IDs use the format: `{8-char-hex}-{kind}` or `{8-char-hex}-{kind}-{slug}`
//! Example: `9f31c2ab-task-login-page`

use std::collections::HashMap;

/// Generate an opaque ID for the given kind, with a slug derived from `label`
///
/// The hex prefix is taken from the random tail of a UUIDv7, so two IDs
/// minted in the same millisecond with the same label still differ.
pub fn generate_id(kind: &str, label: &str) -> String {
    let uuid = uuid::Uuid::now_v7().simple().to_string();
    let hex = &uuid[uuid.len() - 8..];
    let slug = slugify(label);
    if slug.is_empty() {
        format!("{}-{}", hex, kind)
    } else {
        format!("{}-{}-{}", hex, kind, slug)
    }
}

/// Mint a fresh participant identity
pub fn new_user_id(name: &str) -> String {
    generate_id("user", name)
}

/// Mint a fresh task identity
pub fn new_task_id(title: &str) -> String {
    generate_id("task", title)
}

/// Slugify a label for use in IDs
fn slugify(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        // Strip apostrophes entirely, replace other non-alphanumeric with hyphens
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c == '\'' || c == '\u{2019}' || c == '\u{2018}' {
                None
            } else {
                Some('-')
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Session identifier keying the registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// Mint a new session ID
    pub fn generate() -> Self {
        Self(generate_id("session", ""))
    }

    /// Create from an existing ID string
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    /// Get the hex prefix (first 8 chars)
    pub fn hex_prefix(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }

    /// Get the full ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for SessionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for SessionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self(s))
    }
}

/// ID resolution for partial matches
pub struct IdResolver<'a> {
    ids: &'a HashMap<String, String>, // id -> display name
}

impl<'a> IdResolver<'a> {
    pub fn new(ids: &'a HashMap<String, String>) -> Self {
        Self { ids }
    }

    /// Resolve a partial reference to a full ID
    ///
    /// Returns:
    /// - Ok(Some(id)) if exactly one match
    /// - Ok(None) if no matches
    /// - Err with candidates if ambiguous
    ///
    /// An exact ID or an exact (case-insensitive) display name always wins
    /// over looser matches.
    pub fn resolve(&self, reference: &str) -> Result<Option<String>, Vec<String>> {
        if self.ids.contains_key(reference) {
            return Ok(Some(reference.to_string()));
        }

        let by_name: Vec<String> = self
            .ids
            .iter()
            .filter(|(_, name)| name.eq_ignore_ascii_case(reference))
            .map(|(id, _)| id.clone())
            .collect();
        if by_name.len() == 1 {
            return Ok(by_name.into_iter().next());
        }

        let mut matches: Vec<String> = self
            .ids
            .keys()
            .filter(|id| Self::matches(id, reference))
            .cloned()
            .collect();
        matches.sort();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            _ => Err(matches),
        }
    }

    /// Check if an ID matches a reference
    fn matches(id: &str, reference: &str) -> bool {
        // Hex prefix match
        if id.starts_with(reference) {
            return true;
        }

        // Kind/slug contains match
        if let Some(slug_start) = id.find('-') {
            let slug_part = &id[slug_start + 1..];
            if slug_part.contains(reference) {
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id() {
        let id = generate_id("task", "Add OAuth Authentication");
        assert!(id.len() > 10);
        assert!(id.contains("-task-"));
        assert!(id.ends_with("add-oauth-authentication"));
        assert_eq!(id.find('-'), Some(8));
    }

    #[test]
    fn test_generate_id_without_label() {
        let id = generate_id("session", "");
        assert!(id.ends_with("-session"));
        assert_eq!(id.len(), 8 + "-session".len());
    }

    #[test]
    fn test_generate_id_is_unique_for_same_label() {
        let a = new_task_id("Story 1");
        let b = new_task_id("Story 1");
        assert_ne!(a, b);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Add OAuth!"), "add-oauth");
        assert_eq!(slugify("Multiple   Spaces"), "multiple-spaces");
        assert_eq!(slugify("here's a test"), "heres-a-test");
        assert_eq!(slugify("   "), "");
    }

    #[test]
    fn test_session_id_parts() {
        let id = SessionId::from_string("0a1b2c3d-session".to_string());
        assert_eq!(id.hex_prefix(), "0a1b2c3d");
        assert_eq!(id.as_str(), "0a1b2c3d-session");
        assert!(SessionId::generate().as_str().ends_with("-session"));
    }

    fn sample_ids() -> HashMap<String, String> {
        let mut ids = HashMap::new();
        ids.insert("0194a0f1-task-login-page".to_string(), "Login page".to_string());
        ids.insert("0194a0f2-task-oauth-db".to_string(), "OAuth DB".to_string());
        ids.insert("0194a0f3-task-oauth-api".to_string(), "OAuth API".to_string());
        ids
    }

    #[test]
    fn test_id_resolver_exact() {
        let ids = sample_ids();
        let resolver = IdResolver::new(&ids);
        assert_eq!(
            resolver.resolve("0194a0f1-task-login-page").unwrap(),
            Some("0194a0f1-task-login-page".to_string())
        );
    }

    #[test]
    fn test_id_resolver_hex_prefix() {
        let ids = sample_ids();
        let resolver = IdResolver::new(&ids);
        assert_eq!(
            resolver.resolve("0194a0f2").unwrap(),
            Some("0194a0f2-task-oauth-db".to_string())
        );
    }

    #[test]
    fn test_id_resolver_display_name() {
        let ids = sample_ids();
        let resolver = IdResolver::new(&ids);
        assert_eq!(
            resolver.resolve("oauth api").unwrap(),
            Some("0194a0f3-task-oauth-api".to_string())
        );
    }

    #[test]
    fn test_id_resolver_ambiguous() {
        let ids = sample_ids();
        let resolver = IdResolver::new(&ids);
        let candidates = resolver.resolve("oauth").unwrap_err();
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_id_resolver_no_match() {
        let ids = sample_ids();
        let resolver = IdResolver::new(&ids);
        assert_eq!(resolver.resolve("nonexistent").unwrap(), None);
    }
}
