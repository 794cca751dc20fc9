//! Test fixtures for the storefront crates.
//!
//! [`TestMongo`] (feature `mongo`, on by default) starts a throwaway MongoDB
//! container. [`TestDataBuilder`] derives ids, names, prices and database
//! names from a seed so a test sees the same data on every run, and
//! [`assertions`] holds the checks listing tests keep repeating.
//!
//! ```rust,no_run
//! use test_utils::{TestDataBuilder, TestMongo};
//!
//! # async fn example() {
//! let mongo = TestMongo::new().await;
//! let builder = TestDataBuilder::from_test_name("listing_pages");
//! let db = mongo.database(&builder.database_name());
//! # }
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

#[cfg(feature = "mongo")]
mod mongo;

#[cfg(feature = "mongo")]
pub use mongo::TestMongo;

/// Seeded source of fixture values.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from the test's name, so two tests never share a database.
    pub fn from_test_name(name: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// The acting user for this test.
    pub fn user_id(&self) -> Uuid {
        let bytes = self.seed.to_le_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..].copy_from_slice(&bytes);
        Uuid::from_bytes(uuid_bytes)
    }

    /// Another user, distinct from [`Self::user_id`] and from every other `index`.
    pub fn other_user_id(&self, index: u64) -> Uuid {
        Self::new(self.seed.wrapping_add(index.wrapping_add(1))).user_id()
    }

    /// `test-{kind}-{seed}-{label}`, e.g. a photo id or a brand.
    pub fn name(&self, kind: &str, label: &str) -> String {
        format!("test-{}-{}-{}", kind, self.seed, label)
    }

    /// Database name for this test. Hex keeps it short and free of `.`,
    /// which MongoDB rejects in database names.
    pub fn database_name(&self) -> String {
        format!("test_{:016x}", self.seed)
    }

    /// Integer price in `min..=max`, varying with `index`.
    pub fn price(&self, index: u64, min: i64, max: i64) -> i64 {
        let span = (max - min).max(0) as u64 + 1;
        let mixed = self.seed.rotate_left((index % 64) as u32) ^ index.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        min + (mixed % span) as i64
    }
}

pub mod assertions {
    use std::collections::HashSet;
    use std::fmt::Debug;
    use std::hash::Hash;
    use uuid::Uuid;

    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(actual, expected, "{context}: expected UUID {expected}, got {actual}");
    }

    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{context}: expected Some, got None"))
    }

    /// Two pages of the same listing must not repeat a record.
    pub fn assert_disjoint_pages<T, K, F>(first: &[T], second: &[T], key: F)
    where
        K: Eq + Hash + Debug,
        F: Fn(&T) -> K,
    {
        let seen: HashSet<K> = first.iter().map(&key).collect();
        if let Some(repeated) = second.iter().map(&key).find(|k| seen.contains(k)) {
            panic!("record {repeated:?} appears on both pages");
        }
    }

    /// `values` must be non-increasing, as in a newest-first listing.
    pub fn assert_descending<T: PartialOrd + Debug>(values: &[T], context: &str) {
        if let Some(pair) = values.windows(2).find(|pair| pair[0] < pair[1]) {
            panic!("{context}: {:?} comes before {:?}", pair[0], pair[1]);
        }
    }
}
