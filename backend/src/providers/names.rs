//! Area-name reconciliation between the planning database and provider data.
//!
//! Each provider ships a fixed list of known spelling and punctuation
//! differences. Names not on the list pass through unchanged; there is no
//! fuzzy matching.

use std::collections::HashMap;

/// Bidirectional alias table: canonical name <-> provider name.
#[derive(Debug, Clone, Default)]
pub struct AreaAliases {
    to_provider: HashMap<String, String>,
    to_canonical: HashMap<String, String>,
}

impl AreaAliases {
    /// Build from `(canonical, provider)` pairs.
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        let mut aliases = Self::default();
        for (canonical, provider) in pairs {
            aliases
                .to_provider
                .insert((*canonical).to_string(), (*provider).to_string());
            aliases
                .to_canonical
                .insert((*provider).to_string(), (*canonical).to_string());
        }
        aliases
    }

    /// Name the provider's data uses for a canonical area name.
    pub fn provider_name<'a>(&'a self, canonical: &'a str) -> &'a str {
        self.to_provider
            .get(canonical)
            .map(String::as_str)
            .unwrap_or(canonical)
    }

    /// Canonical name for a name found in the provider's data.
    pub fn canonical_name<'a>(&'a self, provider: &'a str) -> &'a str {
        self.to_canonical
            .get(provider)
            .map(String::as_str)
            .unwrap_or(provider)
    }
}
