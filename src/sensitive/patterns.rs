use std::collections::BTreeMap;

/// Built-in sensitivity categories and their lowercase trigger substrings.
pub const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    ("password", &["password", "passwd", "pwd", "secret"]),
    ("email", &["email", "mail", "username", "user"]),
    ("credit_card", &["card", "credit", "ccv", "cvv", "expiry"]),
    ("phone", &["phone", "mobile", "tel", "cell"]),
    ("ssn", &["ssn", "social", "security"]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveCategory {
    pub name: String,
    pub patterns: Vec<String>,
}

/// Category table matched by case-folded substring containment, with no
/// word-boundary check ("username" and "usernames" both hit `email`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitivePatterns {
    categories: Vec<SensitiveCategory>,
}

impl Default for SensitivePatterns {
    fn default() -> Self {
        let categories = DEFAULT_CATEGORIES
            .iter()
            .map(|(name, patterns)| SensitiveCategory {
                name: name.to_string(),
                patterns: patterns.iter().map(|p| p.to_string()).collect(),
            })
            .collect();
        Self { categories }
    }
}

impl SensitivePatterns {
    /// Built-in table extended with extra category patterns. Extra patterns
    /// are lower-cased; existing categories keep their built-in substrings.
    pub fn with_extra(extra: &BTreeMap<String, Vec<String>>) -> Self {
        let mut table = Self::default();
        for (name, patterns) in extra {
            table.extend(name, patterns.iter().map(String::as_str));
        }
        table
    }

    pub fn extend<'p>(&mut self, category: &str, patterns: impl IntoIterator<Item = &'p str>) {
        let idx = match self.categories.iter().position(|c| c.name == category) {
            Some(idx) => idx,
            None => {
                self.categories.push(SensitiveCategory {
                    name: category.to_string(),
                    patterns: Vec::new(),
                });
                self.categories.len() - 1
            }
        };

        let entry = &mut self.categories[idx];
        for pattern in patterns {
            let pattern = pattern.trim().to_lowercase();
            // An empty pattern would match every string.
            if !pattern.is_empty() && !entry.patterns.contains(&pattern) {
                entry.patterns.push(pattern);
            }
        }
    }

    pub fn categories(&self) -> &[SensitiveCategory] {
        &self.categories
    }

    /// First category with a pattern contained in `text`, case-insensitively.
    pub fn matching_category(&self, text: &str) -> Option<&str> {
        let folded = text.to_lowercase();
        self.categories
            .iter()
            .find(|c| c.patterns.iter().any(|p| folded.contains(p.as_str())))
            .map(|c| c.name.as_str())
    }

    pub fn is_sensitive(&self, text: &str) -> bool {
        self.matching_category(text).is_some()
    }
}
