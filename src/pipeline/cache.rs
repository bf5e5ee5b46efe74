use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::ReferenceUtterance;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ReferenceKey {
    language: String,
    text: String,
    tokens: Vec<String>,
}

/// Shared store of built references, keyed by language, text and tokens.
///
/// Builders run outside the lock. When two threads race on the same key both
/// may build, and the first insert wins.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    entries: RwLock<HashMap<ReferenceKey, Arc<ReferenceUtterance>>>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &self,
        language: &str,
        text: &str,
        tokens: &[String],
    ) -> Option<Arc<ReferenceUtterance>> {
        self.entries.read().get(&key(language, text, tokens)).cloned()
    }

    pub fn get_or_try_insert_with<F, E>(
        &self,
        language: &str,
        text: &str,
        tokens: &[String],
        build: F,
    ) -> Result<Arc<ReferenceUtterance>, E>
    where
        F: FnOnce() -> Result<ReferenceUtterance, E>,
    {
        let key = key(language, text, tokens);
        if let Some(hit) = self.entries.read().get(&key).cloned() {
            tracing::debug!(language, text, "reference cache: hit");
            return Ok(hit);
        }

        tracing::debug!(language, text, "reference cache: miss");
        let built = Arc::new(build()?);
        let mut entries = self.entries.write();
        Ok(Arc::clone(entries.entry(key).or_insert(built)))
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

fn key(language: &str, text: &str, tokens: &[String]) -> ReferenceKey {
    ReferenceKey {
        language: language.to_string(),
        text: text.to_string(),
        tokens: tokens.iter().map(|t| t.trim().to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::word_spans::build_reference;
    use crate::error::AssessmentError;

    fn build(text: &str) -> Result<ReferenceUtterance, AssessmentError> {
        build_reference(text, &[], "en", |w| Ok(w.to_string()))
    }

    #[test]
    fn second_lookup_hits_without_building() {
        let cache = ReferenceCache::new();
        let first = cache
            .get_or_try_insert_with("en", "ab cd", &[], || build("ab cd"))
            .expect("build");
        let second = cache
            .get_or_try_insert_with("en", "ab cd", &[], || -> Result<_, AssessmentError> {
                panic!("must not rebuild")
            })
            .expect("hit");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn key_includes_language_and_tokens() {
        let cache = ReferenceCache::new();
        cache
            .get_or_try_insert_with("en", "ab", &[], || build("ab"))
            .expect("build");
        assert!(cache.get("fr", "ab", &[]).is_none());
        assert!(cache.get("en", "ab", &["ab".to_string()]).is_none());
        assert!(cache.get("en", "ab", &[]).is_some());
    }

    #[test]
    fn token_padding_does_not_split_entries() {
        let cache = ReferenceCache::new();
        let padded = vec!["ab ".to_string(), " cd".to_string()];
        let trimmed = vec!["ab".to_string(), "cd".to_string()];
        cache
            .get_or_try_insert_with("en", "ab cd", &padded, || build("ab cd"))
            .expect("build");
        assert!(cache.get("en", "ab cd", &trimmed).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_build_is_not_cached() {
        let cache = ReferenceCache::new();
        let result = cache.get_or_try_insert_with("en", "  ", &[], || build("  "));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = ReferenceCache::new();
        cache
            .get_or_try_insert_with("en", "ab", &[], || build("ab"))
            .expect("build");
        cache.clear();
        assert!(cache.is_empty());
    }
}
