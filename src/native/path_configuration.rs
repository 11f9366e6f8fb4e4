//! Path configuration document for native shells.
//!
//! The shells fetch this document and evaluate the rules themselves; the
//! server never matches paths against the patterns.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::Serialize;

/// One pattern set and the presentation hints applied to matching URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathConfigurationRule {
    pub patterns: Vec<&'static str>,
    pub properties: BTreeMap<&'static str, &'static str>,
}

impl PathConfigurationRule {
    fn modal(patterns: &[&'static str]) -> Self {
        Self {
            patterns: patterns.to_vec(),
            properties: BTreeMap::from([("presentation", "modal")]),
        }
    }
}

/// The complete document served to native shells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathConfiguration {
    /// App-level settings; currently none.
    pub settings: BTreeMap<&'static str, &'static str>,
    pub rules: Vec<PathConfigurationRule>,
}

impl PathConfiguration {
    /// The fixed document. Built once.
    pub fn get() -> &'static PathConfiguration {
        static DOCUMENT: OnceLock<PathConfiguration> = OnceLock::new();
        DOCUMENT.get_or_init(|| PathConfiguration {
            settings: BTreeMap::new(),
            rules: vec![
                PathConfigurationRule::modal(&["/new$", "/edit$"]),
                PathConfigurationRule::modal(&["/signup$", "/login$"]),
            ],
        })
    }

    /// First rule listing `pattern` verbatim.
    #[cfg(test)]
    fn rule_for_pattern(&self, pattern: &str) -> Option<&PathConfigurationRule> {
        self.rules.iter().find(|r| r.patterns.iter().any(|p| *p == pattern))
    }
}
