use serde::Deserialize;
use std::collections::HashMap;

/// Packages exempted from failing, globally and per component
///
/// Patterns are prefixes of `"<package_name>@<package_version>"`, so
/// `"openssl"` allows every openssl version while `"openssl@1.0.1"` only
/// allows that release line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Allowlist {
    #[serde(rename = "global_allowlist", alias = "global_whitelist", default)]
    pub global_patterns: Vec<String>,
    #[serde(
        rename = "container_allowlist",
        alias = "container_whitelist",
        default
    )]
    pub component_patterns: HashMap<String, Vec<String>>,
}

impl Allowlist {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(
        global_patterns: Vec<String>,
        component_patterns: HashMap<String, Vec<String>>,
    ) -> Self {
        Self {
            global_patterns,
            component_patterns,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.global_patterns.is_empty() && self.component_patterns.values().all(Vec::is_empty)
    }

    /// Returns the first empty pattern location, if any
    ///
    /// An empty prefix would allow every package, so loaders reject it.
    pub fn find_empty_pattern(&self) -> Option<String> {
        if let Some(i) = self.global_patterns.iter().position(|p| p.trim().is_empty()) {
            return Some(format!("global_allowlist[{}]", i));
        }
        let mut components: Vec<_> = self.component_patterns.iter().collect();
        components.sort_by(|a, b| a.0.cmp(b.0));
        for (component, patterns) in components {
            if let Some(i) = patterns.iter().position(|p| p.trim().is_empty()) {
                return Some(format!("container_allowlist.{}[{}]", component, i));
            }
        }
        None
    }
}

/// Flattened allowlist for one component: global patterns first, then the component's own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowlistIndex {
    patterns: Vec<String>,
}

impl AllowlistIndex {
    pub fn for_component(allowlist: &Allowlist, component: &str) -> Self {
        let mut patterns = allowlist.global_patterns.clone();
        if let Some(component_patterns) = allowlist.component_patterns.get(component) {
            patterns.extend(component_patterns.iter().cloned());
        }
        Self { patterns }
    }

    pub fn from_patterns(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    /// First pattern, in allowlist order, that `package_key` starts with
    pub fn first_match(&self, package_key: &str) -> Option<&str> {
        self.patterns
            .iter()
            .map(String::as_str)
            .find(|pattern| package_key.starts_with(pattern))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_allowlist() -> Allowlist {
        Allowlist::new(
            vec!["openssl@1.0".to_string(), "zlib".to_string()],
            HashMap::from([
                ("nexus".to_string(), vec!["glibc@2.28".to_string()]),
                ("api".to_string(), vec!["curl".to_string()]),
            ]),
        )
    }

    #[test]
    fn test_index_is_global_then_component() {
        let index = AllowlistIndex::for_component(&sample_allowlist(), "nexus");
        assert_eq!(
            index.patterns(),
            &["openssl@1.0", "zlib", "glibc@2.28"].map(String::from)
        );
    }

    #[test]
    fn test_index_unknown_component_uses_global_only() {
        let index = AllowlistIndex::for_component(&sample_allowlist(), "unknown");
        assert_eq!(index.patterns().len(), 2);
    }

    #[test]
    fn test_first_match_wins() {
        let index = AllowlistIndex::from_patterns(vec![
            "openssl".to_string(),
            "openssl@1.0.1".to_string(),
        ]);
        assert_eq!(index.first_match("openssl@1.0.1"), Some("openssl"));

        let reversed = AllowlistIndex::from_patterns(vec![
            "openssl@1.0.1".to_string(),
            "openssl".to_string(),
        ]);
        assert_eq!(reversed.first_match("openssl@1.0.1"), Some("openssl@1.0.1"));
    }

    #[test]
    fn test_first_match_is_prefix_not_substring() {
        let index = AllowlistIndex::from_patterns(vec!["ssl".to_string()]);
        assert_eq!(index.first_match("openssl@1.0.1"), None);
    }

    #[test]
    fn test_deserialize_allowlist_yaml() {
        let yaml = r#"
global_allowlist:
  - openssl@1.0
container_allowlist:
  nexus:
    - glibc
"#;
        let allowlist: Allowlist = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(allowlist.global_patterns, vec!["openssl@1.0"]);
        assert_eq!(allowlist.component_patterns["nexus"], vec!["glibc"]);
    }

    #[test]
    fn test_deserialize_legacy_whitelist_keys() {
        let yaml = r#"
global_whitelist: [bash]
container_whitelist:
  api: [curl@7]
"#;
        let allowlist: Allowlist = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(allowlist.global_patterns, vec!["bash"]);
        assert_eq!(allowlist.component_patterns["api"], vec!["curl@7"]);
    }

    #[test]
    fn test_deserialize_rejects_unknown_keys() {
        let yaml = "global_allowlist: []\nextra: true\n";
        assert!(serde_yaml_ng::from_str::<Allowlist>(yaml).is_err());
    }

    #[test]
    fn test_find_empty_pattern() {
        assert_eq!(sample_allowlist().find_empty_pattern(), None);
        let allowlist = Allowlist::new(
            vec![],
            HashMap::from([("nexus".to_string(), vec!["a".to_string(), " ".to_string()])]),
        );
        assert_eq!(
            allowlist.find_empty_pattern().as_deref(),
            Some("container_allowlist.nexus[1]")
        );
    }

    #[test]
    fn test_is_empty() {
        assert!(Allowlist::empty().is_empty());
        assert!(!sample_allowlist().is_empty());
    }
}
