//! Descriptor cache keyed by schema and raw statement text.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::ParseError;
use crate::introspect::{QueryDescribe, SchemaIntrospect};
use crate::model::StatementDescriptor;
use crate::parser::StatementParser;

/// Caches parsed descriptors per `(schema, statement)` pair.
///
/// Descriptors are immutable, so entries never go stale against their own
/// statement; schema metadata changes are not watched — recreate the cache
/// when the schema moves underneath it.
#[derive(Debug, Default)]
pub struct DescriptorCache {
    inner: RwLock<HashMap<(Option<String>, String), Arc<StatementDescriptor>>>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, schema: Option<&str>, sql: &str) -> Option<Arc<StatementDescriptor>> {
        let key = (schema.map(str::to_owned), sql.trim().to_string());
        self.inner.read().get(&key).cloned()
    }

    /// Stores a descriptor under its own schema and statement, returning the
    /// shared handle.
    pub fn insert(&self, descriptor: StatementDescriptor) -> Arc<StatementDescriptor> {
        let key = (
            descriptor.schema().map(str::to_owned),
            descriptor.raw_statement().to_string(),
        );
        let descriptor = Arc::new(descriptor);
        self.inner.write().insert(key, Arc::clone(&descriptor));
        descriptor
    }

    /// Returns the cached descriptor for the parser's schema, parsing on a
    /// miss.
    pub async fn get_or_parse<C>(
        &self,
        parser: &StatementParser<'_, C>,
        sql: &str,
    ) -> Result<Arc<StatementDescriptor>, ParseError>
    where
        C: SchemaIntrospect + QueryDescribe,
    {
        if let Some(hit) = self.get(parser.schema(), sql) {
            return Ok(hit);
        }
        let parsed = parser.parse(sql).await?;
        Ok(self.insert(parsed))
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        self.inner.write().clear()
    }
}
