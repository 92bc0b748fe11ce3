//! Include/exclude path filters for candidate meshes.

/// One filter entry: matches when every substring is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEntry {
    parts: Vec<String>,
}

impl FilterEntry {
    /// Parse a comma-separated substring list. Returns `None` when the list
    /// holds no non-empty substring.
    pub fn parse(entry: &str) -> Option<Self> {
        let parts: Vec<String> = entry
            .split(',')
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        (!parts.is_empty()).then_some(Self { parts })
    }

    fn matches(&self, lowered_path: &str) -> bool {
        self.parts.iter().all(|p| lowered_path.contains(p.as_str()))
    }
}

/// Blacklist and whitelist over asset paths, case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    blacklist: Vec<FilterEntry>,
    whitelist: Vec<FilterEntry>,
}

impl PathFilter {
    pub fn new<S: AsRef<str>>(blacklist: &[S], whitelist: &[S]) -> Self {
        let parse = |specs: &[S]| -> Vec<FilterEntry> {
            specs
                .iter()
                .filter_map(|s| FilterEntry::parse(s.as_ref()))
                .collect()
        };
        Self {
            blacklist: parse(blacklist),
            whitelist: parse(whitelist),
        }
    }

    /// Rejected if any blacklist entry matches; otherwise accepted when the
    /// whitelist is empty or any whitelist entry matches.
    pub fn accepts(&self, path: &str) -> bool {
        let lowered = path.to_lowercase();
        if self.blacklist.iter().any(|e| e.matches(&lowered)) {
            return false;
        }
        self.whitelist.is_empty() || self.whitelist.iter().any(|e| e.matches(&lowered))
    }
}
