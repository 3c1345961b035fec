// ABOUTME: Configuration for detection weights, normalization limits and mapping validation policy.
// ABOUTME: Defaults reproduce the tuned behaviour; fluent setters allow per-call overrides.

/// Weights and thresholds of the collection detector.
///
/// The defaults are empirically tuned. Changing any of them is a tuning
/// decision and shifts which list wins on real payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    /// Dict items sampled per list for key statistics, and array elements descended into.
    pub max_sample_items: usize,
    /// Below this share of dict elements a list is penalized.
    pub min_dict_density: f64,
    pub density_penalty_multiplier: f64,
    /// List length at which the size signal saturates.
    pub max_size_score: usize,
    pub size_weight: f64,
    pub density_weight: f64,
    pub consistency_weight: f64,
    pub avg_size_weight: f64,
    pub good_key_bonus: f64,
    pub good_key_cap: usize,
    pub meta_name_penalty: f64,
    pub metaish_key_penalty: f64,
    pub metaish_key_cap: usize,
    pub path_index_penalty: f64,
    pub path_length_penalty: f64,
    pub path_length_threshold: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            max_sample_items: 6,
            min_dict_density: 0.55,
            density_penalty_multiplier: 6.0,
            max_size_score: 500,
            size_weight: 2.2,
            density_weight: 1.8,
            consistency_weight: 2.0,
            avg_size_weight: 0.25,
            good_key_bonus: 0.35,
            good_key_cap: 6,
            meta_name_penalty: 1.6,
            metaish_key_penalty: 0.25,
            metaish_key_cap: 4,
            path_index_penalty: 1.25,
            path_length_penalty: 0.15,
            path_length_threshold: 6,
        }
    }
}

/// Options for item normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Maximum number of items produced.
    pub limit: usize,
    /// Only use explicitly mapped keys, no fallback names.
    pub strict: bool,
    pub title_max_len: usize,
    pub description_max_len: usize,
    pub id_max_len: usize,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            limit: 20,
            strict: false,
            title_max_len: 140,
            description_max_len: 520,
            id_max_len: 80,
        }
    }
}

impl NormalizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of items.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Enable or disable strict mode.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Override the title and description length caps.
    pub fn text_limits(mut self, title_max_len: usize, description_max_len: usize) -> Self {
        self.title_max_len = title_max_len;
        self.description_max_len = description_max_len;
        self
    }
}

/// Role sets steering mapping validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Roles that must be mapped to a non-empty key.
    pub required_roles: Vec<String>,
    /// Roles that must never share a key with each other (error).
    pub prevent_duplicates_in: Vec<String>,
    /// Roles for which sharing a key is fine (silent).
    pub allow_duplicate_in: Vec<String>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            required_roles: owned(&["title"]),
            prevent_duplicates_in: owned(&["title", "description", "subtitle", "content", "author"]),
            allow_duplicate_in: owned(&["id", "link", "date", "category", "tags"]),
        }
    }
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the required roles.
    pub fn required_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the roles that must not share keys.
    pub fn prevent_duplicates_in<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prevent_duplicates_in = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the roles allowed to share keys.
    pub fn allow_duplicate_in<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_duplicate_in = roles.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn prevents(&self, role: &str) -> bool {
        self.prevent_duplicates_in.iter().any(|r| r == role)
    }

    pub(crate) fn allows(&self, role: &str) -> bool {
        self.allow_duplicate_in.iter().any(|r| r == role)
    }
}

fn owned(roles: &[&str]) -> Vec<String> {
    roles.iter().map(|r| r.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_options_fluent_setters() {
        let opts = NormalizeOptions::new().limit(5).strict(true).text_limits(10, 20);
        assert_eq!(opts.limit, 5);
        assert!(opts.strict);
        assert_eq!(opts.title_max_len, 10);
        assert_eq!(opts.description_max_len, 20);
        assert_eq!(opts.id_max_len, 80);
    }

    #[test]
    fn validation_defaults() {
        let opts = ValidationOptions::default();
        assert_eq!(opts.required_roles, vec!["title".to_string()]);
        assert!(opts.prevents("description"));
        assert!(opts.allows("link"));
        assert!(!opts.allows("title"));
    }

    #[test]
    fn validation_setters_replace_sets() {
        let opts = ValidationOptions::new()
            .required_roles(Vec::<String>::new())
            .prevent_duplicates_in(["title", "description"]);
        assert!(opts.required_roles.is_empty());
        assert!(!opts.prevents("content"));
    }
}
