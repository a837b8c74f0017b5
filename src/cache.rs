use crate::error::SpecificationError;
use crate::loader;
use crate::validator::OpenApiPayloadValidator;
use dashmap::{DashMap, Entry, VacantEntry};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::hash::Hash;
use std::path::Path;
use std::sync::{Arc, OnceLock};

static GLOBAL_CACHE: OnceLock<ValidatorCollection<String>> = OnceLock::new();

/// Process-wide collection, typically keyed by API prefix.
pub fn global_validator_cache() -> &'static ValidatorCollection<String> {
    GLOBAL_CACHE.get_or_init(ValidatorCollection::new)
}

/// Error types for cache operations
#[derive(Debug)]
pub enum CacheError {
    /// The validator with the specified ID was not found in the cache
    ValidatorNotFound,
    /// The validator with the specified ID already exists in the cache
    ValidatorAlreadyExists,
    /// Attempted to create a new validator but failed.
    FailedToCreateValidator(SpecificationError),
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::ValidatorNotFound => write!(f, "Validator not found in cache"),
            CacheError::ValidatorAlreadyExists => write!(f, "Validator already exists in cache"),
            CacheError::FailedToCreateValidator(err) => {
                write!(f, "Failed to create new validator: {}", err)
            }
        }
    }
}

impl std::error::Error for CacheError {}

impl From<SpecificationError> for CacheError {
    fn from(value: SpecificationError) -> Self {
        CacheError::FailedToCreateValidator(value)
    }
}

/// Thread-safe registry of validators, one per key.
pub struct ValidatorCollection<K> {
    cache: DashMap<K, Arc<OpenApiPayloadValidator>>,
}

impl<K> Default for ValidatorCollection<K>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> ValidatorCollection<K>
where
    K: Hash + Eq,
{
    pub fn new() -> Self {
        ValidatorCollection {
            cache: DashMap::new(),
        }
    }

    /// Loads a YAML or JSON document and registers a validator for it under `id`.
    pub fn insert_from_file_path<P>(
        &self,
        id: K,
        file_path: P,
    ) -> Result<Arc<OpenApiPayloadValidator>, CacheError>
    where
        P: AsRef<Path>,
    {
        match self.cache.entry(id) {
            Entry::Occupied(_) => Err(CacheError::ValidatorAlreadyExists),
            Entry::Vacant(entry) => {
                let document = loader::load_from_path(file_path)?;
                Self::create_validator(entry, document)
            }
        }
    }

    pub fn insert<V>(&self, id: K, spec: V) -> Result<Arc<OpenApiPayloadValidator>, CacheError>
    where
        V: serde::Serialize,
    {
        match self.cache.entry(id) {
            Entry::Occupied(_) => Err(CacheError::ValidatorAlreadyExists),
            Entry::Vacant(entry) => {
                let document = match serde_json::to_value(spec) {
                    Ok(document) => document,
                    Err(e) => {
                        return Err(CacheError::FailedToCreateValidator(
                            SpecificationError::UnableToParse(e.to_string()),
                        ));
                    }
                };
                Self::create_validator(entry, document)
            }
        }
    }

    fn create_validator(
        entry: VacantEntry<K, Arc<OpenApiPayloadValidator>>,
        document: Value,
    ) -> Result<Arc<OpenApiPayloadValidator>, CacheError> {
        let validator = Arc::new(OpenApiPayloadValidator::new(document)?);
        entry.insert(validator.clone());
        Ok(validator)
    }

    pub fn get(&self, id: &K) -> Result<Arc<OpenApiPayloadValidator>, CacheError> {
        match self.cache.get(id) {
            Some(validator) => Ok(Arc::clone(validator.value())),
            None => Err(CacheError::ValidatorNotFound),
        }
    }

    pub fn remove(&self, id: &K) -> Result<(), CacheError> {
        if self.cache.remove(id).is_none() {
            return Err(CacheError::ValidatorNotFound);
        }
        Ok(())
    }

    pub fn contains(&self, id: &K) -> bool {
        self.cache.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&self) {
        self.cache.clear();
        log::debug!("Cleared validator cache");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec() -> Value {
        json!({
            "openapi": "3.1.0",
            "paths": {
                "/": { "get": { "responses": { "200": { "description": "OK" } } } }
            }
        })
    }

    #[test]
    fn test_cache_get_insert() {
        let cache = ValidatorCollection::new();
        assert!(matches!(
            cache.get(&"test".to_string()),
            Err(CacheError::ValidatorNotFound)
        ));
        let validator = cache.insert("test".to_string(), spec()).unwrap();
        assert!(!cache.is_empty());
        assert_eq!(cache.len(), 1);
        let cached = cache.get(&"test".to_string()).unwrap();
        assert!(Arc::ptr_eq(&validator, &cached));
    }

    #[test]
    fn test_cache_rejects_duplicates() {
        let cache = ValidatorCollection::new();
        cache.insert(1, spec()).unwrap();
        assert!(matches!(
            cache.insert(1, spec()),
            Err(CacheError::ValidatorAlreadyExists)
        ));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_invalid_document() {
        let cache = ValidatorCollection::new();
        let result = cache.insert("bad", json!({ "openapi": "2.0" }));
        assert!(matches!(
            result,
            Err(CacheError::FailedToCreateValidator(
                SpecificationError::UnsupportedVersion(_)
            ))
        ));
        assert!(!cache.contains(&"bad"));
    }

    #[test]
    fn test_cache_insert_from_file_path() {
        let cache = ValidatorCollection::new();
        let path = format!("{}/tests/data/petstore.yaml", env!("CARGO_MANIFEST_DIR"));
        let validator = cache.insert_from_file_path("/v1", path).unwrap();
        assert_eq!(validator.specification().operations().len(), 4);
        assert!(cache.contains(&"/v1"));

        let missing = cache.insert_from_file_path("/v2", "/no/such/file.json");
        assert!(matches!(
            missing,
            Err(CacheError::FailedToCreateValidator(
                SpecificationError::LoadFailed(_)
            ))
        ));
    }

    #[test]
    fn test_cache_remove_and_clear() {
        let cache = ValidatorCollection::new();
        cache.insert("a", spec()).unwrap();
        cache.insert("b", spec()).unwrap();
        cache.remove(&"a").unwrap();
        assert!(matches!(cache.remove(&"a"), Err(CacheError::ValidatorNotFound)));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_global_cache() {
        let cache = global_validator_cache();
        cache.insert("global_test".to_string(), spec()).unwrap();
        let same_cache = global_validator_cache();
        assert!(same_cache.get(&"global_test".to_string()).is_ok());
        same_cache.remove(&"global_test".to_string()).unwrap();
    }
}
