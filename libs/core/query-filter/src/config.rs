use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroU64;

use crate::predicate::FieldKind;

pub const DEFAULT_PAGE_SIZE: NonZeroU64 = match NonZeroU64::new(6) {
    Some(size) => size,
    None => panic!("default page size must be non-zero"),
};

/// Controls how a [`RawQuery`](crate::RawQuery) is translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorConfig {
    /// Records per page, fixed by the caller rather than the client.
    pub page_size: NonZeroU64,
    /// Parameter carrying the free-text search term.
    pub search_key: String,
    /// Parameter carrying the 1-based page number.
    pub page_key: String,
    /// Further parameters that never become field filters.
    pub reserved_keys: BTreeSet<String>,
    /// Field the search term is matched against.
    pub search_field: String,
    /// Declared kinds for typed fields; anything else is text.
    pub field_kinds: BTreeMap<String, FieldKind>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_key: "search".to_string(),
            page_key: "page".to_string(),
            reserved_keys: BTreeSet::from(["limit".to_string()]),
            search_field: "name".to_string(),
            field_kinds: BTreeMap::new(),
        }
    }
}

impl TranslatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: NonZeroU64) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_search_field(mut self, field: impl Into<String>) -> Self {
        self.search_field = field.into();
        self
    }

    pub fn with_field_kind(mut self, field: impl Into<String>, kind: FieldKind) -> Self {
        self.field_kinds.insert(field.into(), kind);
        self
    }

    pub fn with_reserved_key(mut self, key: impl Into<String>) -> Self {
        self.reserved_keys.insert(key.into());
        self
    }

    /// Whether `key` is a control parameter rather than a field.
    pub fn is_reserved(&self, key: &str) -> bool {
        key == self.search_key || key == self.page_key || self.reserved_keys.contains(key)
    }

    pub fn field_kind(&self, field: &str) -> FieldKind {
        self.field_kinds.get(field).copied().unwrap_or_default()
    }
}

#[cfg(feature = "config")]
mod env {
    use super::*;
    use core_config::{ConfigError, env_or_default, env_parse_or};

    impl TranslatorConfig {
        /// Overlay `{PREFIX}_PAGE_SIZE` and `{PREFIX}_SEARCH_FIELD` on `self`.
        pub fn with_env_overrides(self, prefix: &str) -> Result<Self, ConfigError> {
            let page_size = env_parse_or(&format!("{prefix}_PAGE_SIZE"), self.page_size)?;

            let search_field = env_or_default(&format!("{prefix}_SEARCH_FIELD"), &self.search_field);

            Ok(self.with_page_size(page_size).with_search_field(search_field))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_defaults_without_env() {
            temp_env::with_vars(
                [
                    ("PRODUCTS_PAGE_SIZE", None::<&str>),
                    ("PRODUCTS_SEARCH_FIELD", None::<&str>),
                ],
                || {
                    let config = TranslatorConfig::new()
                        .with_env_overrides("PRODUCTS")
                        .unwrap();
                    assert_eq!(config.page_size.get(), 6);
                    assert_eq!(config.search_field, "name");
                },
            );
        }

        #[test]
        fn test_env_overrides() {
            temp_env::with_vars(
                [
                    ("PRODUCTS_PAGE_SIZE", Some("12")),
                    ("PRODUCTS_SEARCH_FIELD", Some("brand")),
                ],
                || {
                    let config = TranslatorConfig::new()
                        .with_env_overrides("PRODUCTS")
                        .unwrap();
                    assert_eq!(config.page_size.get(), 12);
                    assert_eq!(config.search_field, "brand");
                },
            );
        }

        #[test]
        fn test_zero_page_size_is_rejected() {
            temp_env::with_var("PRODUCTS_PAGE_SIZE", Some("0"), || {
                let err = TranslatorConfig::new()
                    .with_env_overrides("PRODUCTS")
                    .unwrap_err();
                assert!(err.to_string().contains("PRODUCTS_PAGE_SIZE"));
            });
        }
    }
}
