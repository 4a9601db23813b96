//! Shared utilities and strongly-typed common values for workspace crates.
//!
//! ```rust
//! use rcommon::{GenerationOptions, MetadataMap, OrderedRegistry, SessionId, TraceId};
//!
//! let session = SessionId::from("session-1");
//! let trace = TraceId::new("trace-1");
//! let mut metadata = MetadataMap::new();
//! metadata.insert("tenant".to_string(), "acme".to_string());
//!
//! let mut registry = OrderedRegistry::new();
//! registry.try_insert("first".to_string(), 1_u8).expect("fresh key");
//!
//! let options = GenerationOptions::default().with_temperature(0.3);
//! assert_eq!(session.as_str(), "session-1");
//! assert_eq!(trace.to_string(), "trace-1");
//! assert_eq!(options.temperature, Some(0.3));
//! assert_eq!(registry.len(), 1);
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use rcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Shared metadata and cross-crate identifier newtypes.

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};

    pub type MetadataMap = HashMap<String, String>;

    macro_rules! string_id {
        ($(#[$attr:meta])* $name:ident) => {
            $(#[$attr])*
            #[derive(Debug, Clone, PartialEq, Eq, Hash)]
            pub struct $name(String);

            impl $name {
                pub fn new(value: impl Into<String>) -> Self {
                    Self(value.into())
                }

                pub fn as_str(&self) -> &str {
                    self.0.as_str()
                }
            }

            impl Display for $name {
                fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<String> for $name {
                fn from(value: String) -> Self {
                    Self(value)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }
        };
    }

    string_id! {
        /// One orchestration session; also tags every dispatch made for it.
        SessionId
    }

    string_id! {
        /// Correlates a dispatch call across process boundaries.
        TraceId
    }
}

pub mod model {
    //! Shared generation settings used by request types.
    //!
    //! ```rust
    //! use rcommon::GenerationOptions;
    //!
    //! let options = GenerationOptions::default()
    //!     .with_temperature(0.2)
    //!     .with_max_tokens(128);
    //!
    //! assert_eq!(options.temperature, Some(0.2));
    //! assert_eq!(options.max_tokens, Some(128));
    //! ```

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct GenerationOptions {
        pub temperature: Option<f32>,
        pub max_tokens: Option<u32>,
    }

    impl GenerationOptions {
        pub fn with_temperature(mut self, temperature: f32) -> Self {
            self.temperature = Some(temperature);
            self
        }

        pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
            self.max_tokens = Some(max_tokens);
            self
        }
    }
}

pub mod registry {
    //! Insertion-ordered registry used by catalogs that are presented verbatim.
    //!
    //! Iteration always follows insertion order, so anything rendered from a
    //! registry (prompts, catalogs) is reproducible across runs.
    //!
    //! ```rust
    //! use rcommon::OrderedRegistry;
    //!
    //! let mut registry = OrderedRegistry::new();
    //! registry.try_insert("beta".to_string(), 2_u32).expect("fresh key");
    //! registry.try_insert("alpha".to_string(), 1_u32).expect("fresh key");
    //!
    //! let keys: Vec<_> = registry.keys().cloned().collect();
    //! assert_eq!(keys, vec!["beta".to_string(), "alpha".to_string()]);
    //! assert!(registry.try_insert("beta".to_string(), 3).is_err());
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct OrderedRegistry<K, V> {
        index: HashMap<K, usize>,
        entries: Vec<(K, V)>,
    }

    impl<K, V> Default for OrderedRegistry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                index: HashMap::new(),
                entries: Vec::new(),
            }
        }
    }

    impl<K, V> OrderedRegistry<K, V>
    where
        K: Eq + Hash + Clone,
    {
        pub fn new() -> Self {
            Self::default()
        }

        /// Inserts a new entry, handing the value back if the key is taken.
        pub fn try_insert(&mut self, key: K, value: V) -> Result<(), V> {
            if self.index.contains_key(&key) {
                return Err(value);
            }

            self.index.insert(key.clone(), self.entries.len());
            self.entries.push((key, value));
            Ok(())
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.index
                .get(key)
                .and_then(|position| self.entries.get(*position))
                .map(|(_, value)| value)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.index.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.entries.iter().map(|(key, _)| key)
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.entries.iter().map(|(_, value)| value)
        }

        pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
            self.entries.iter().map(|(key, value)| (key, value))
        }

        pub fn len(&self) -> usize {
            self.entries.len()
        }

        pub fn is_empty(&self) -> bool {
            self.entries.is_empty()
        }
    }
}

pub mod retry {
    //! Retry and backoff policy shared by model and tool call paths.
    //!
    //! ```rust
    //! use std::time::Duration;
    //! use rcommon::RetryPolicy;
    //!
    //! let policy = RetryPolicy::new(3);
    //! assert!(policy.should_retry(1, true));
    //! assert!(!policy.should_retry(3, true));
    //! assert!(!policy.should_retry(1, false));
    //! assert_eq!(policy.backoff_for_attempt(1), Duration::from_millis(200));
    //! ```

    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    pub struct RetryPolicy {
        pub max_attempts: u32,
        pub initial_backoff: Duration,
        pub max_backoff: Duration,
        pub backoff_multiplier: f64,
    }

    impl Default for RetryPolicy {
        fn default() -> Self {
            Self {
                max_attempts: 3,
                initial_backoff: Duration::from_millis(200),
                max_backoff: Duration::from_secs(5),
                backoff_multiplier: 2.0,
            }
        }
    }

    impl RetryPolicy {
        pub fn new(max_attempts: u32) -> Self {
            Self {
                max_attempts: max_attempts.max(1),
                ..Self::default()
            }
        }

        /// A policy that runs every operation exactly once.
        pub fn no_retry() -> Self {
            Self::new(1)
        }

        pub fn should_retry(&self, attempt: u32, retryable: bool) -> bool {
            retryable && attempt < self.max_attempts
        }

        pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
            let exponent = (attempt.saturating_sub(1)) as i32;
            let unbounded =
                self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);
            Duration::from_secs_f64(unbounded.min(self.max_backoff.as_secs_f64()).max(0.0))
        }
    }
}

pub use context::{MetadataMap, SessionId, TraceId};
pub use future::BoxFuture;
pub use model::GenerationOptions;
pub use registry::OrderedRegistry;
pub use retry::RetryPolicy;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{GenerationOptions, OrderedRegistry, RetryPolicy, SessionId, TraceId};

    #[test]
    fn id_newtypes_round_trip_strings() {
        let session = SessionId::new("session-1");
        let trace = TraceId::from("trace-1");

        assert_eq!(session.as_str(), "session-1");
        assert_eq!(trace.as_str(), "trace-1");
        assert_eq!(session.to_string(), "session-1");
        assert_eq!(trace.to_string(), "trace-1");
    }

    #[test]
    fn generation_options_builder_helpers_set_values() {
        let options = GenerationOptions::default()
            .with_temperature(0.3)
            .with_max_tokens(123);

        assert_eq!(options.temperature, Some(0.3));
        assert_eq!(options.max_tokens, Some(123));
    }

    #[test]
    fn negative_multiplier_never_yields_negative_backoff() {
        let policy = RetryPolicy {
            backoff_multiplier: -2.0,
            ..RetryPolicy::new(4)
        };

        assert_eq!(policy.backoff_for_attempt(1), Duration::from_millis(200));
        assert_eq!(policy.backoff_for_attempt(2), Duration::ZERO);
        assert_eq!(policy.backoff_for_attempt(3), Duration::from_millis(800));
    }

    #[test]
    fn ordered_registry_keeps_insertion_order_and_rejects_duplicates() {
        let mut registry = OrderedRegistry::new();
        assert!(registry.is_empty());

        registry.try_insert("zeta".to_string(), 1_u32).expect("insert zeta");
        registry.try_insert("alpha".to_string(), 2_u32).expect("insert alpha");
        registry.try_insert("mid".to_string(), 3_u32).expect("insert mid");

        let rejected = registry.try_insert("alpha".to_string(), 9_u32);
        assert_eq!(rejected, Err(9));
        assert_eq!(registry.get("alpha"), Some(&2));
        assert!(registry.contains_key("mid"));
        assert_eq!(registry.len(), 3);

        let order: Vec<_> = registry.values().copied().collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn ordered_registry_iteration_is_restartable() {
        let mut registry = OrderedRegistry::new();
        registry.try_insert("a".to_string(), 'a').expect("insert a");
        registry.try_insert("b".to_string(), 'b').expect("insert b");

        let first: Vec<_> = registry.iter().map(|(key, _)| key.clone()).collect();
        let second: Vec<_> = registry.iter().map(|(key, _)| key.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn retry_policy_uses_retryable_flag_and_attempt_limit() {
        let policy = RetryPolicy::new(3);

        assert!(policy.should_retry(1, true));
        assert!(policy.should_retry(2, true));
        assert!(!policy.should_retry(3, true));
        assert!(!policy.should_retry(1, false));
        assert!(!RetryPolicy::no_retry().should_retry(1, true));
    }

    #[test]
    fn retry_policy_backoff_grows_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(250),
            backoff_multiplier: 2.0,
        };

        assert_eq!(policy.backoff_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for_attempt(3), Duration::from_millis(250));
        assert_eq!(policy.backoff_for_attempt(4), Duration::from_millis(250));
    }
}
