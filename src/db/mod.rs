use std::path::Path;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{field_matches, Product, RecordId};

pub const PRODUCTS: &str = "products";
pub const POSTS: &str = "posts";

/// In-memory collections keyed by name, in the order they appear in the
/// source document. Writes never touch disk.
#[derive(Debug, Clone, Default)]
pub struct CollectionStore {
    collections: IndexMap<String, Vec<Value>>,
    /// Set when the source document could not be loaded. Every lookup then
    /// fails with `AppError::Unavailable`.
    unavailable: Option<String>,
}

impl CollectionStore {
    /// Builds a store from a JSON object whose values are arrays of records.
    /// Non-array members are skipped.
    pub fn from_value(doc: Value) -> anyhow::Result<Self> {
        let Value::Object(members) = doc else {
            anyhow::bail!("database document must be a JSON object of collections");
        };

        let mut collections = IndexMap::with_capacity(members.len());
        for (name, value) in members {
            match value {
                Value::Array(records) => {
                    collections.insert(name, records);
                }
                other => warn!(collection = %name, kind = kind_of(&other), "Skipping non-array member"),
            }
        }

        Ok(Self {
            collections,
            unavailable: None,
        })
    }

    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        let doc: Value = serde_json::from_str(&raw)?;
        let store = Self::from_value(doc)?;
        info!(path = %path.display(), collections = store.collections.len(), "Loaded database");
        Ok(store)
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            collections: IndexMap::new(),
            unavailable: Some(reason.into()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.unavailable.is_none()
    }

    /// Collection names with their record counts, in document order.
    pub fn summary(&self) -> Vec<(&str, usize)> {
        self.collections
            .iter()
            .map(|(name, records)| (name.as_str(), records.len()))
            .collect()
    }

    fn ensure_available(&self) -> AppResult<()> {
        match &self.unavailable {
            Some(reason) => Err(AppError::Unavailable(format!(
                "collection store unavailable: {}",
                reason
            ))),
            None => Ok(()),
        }
    }

    pub fn collection(&self, name: &str) -> AppResult<&[Value]> {
        self.ensure_available()?;
        self.collections
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| AppError::NotFound(format!("Collection {} not found", name)))
    }

    fn collection_mut(&mut self, name: &str) -> AppResult<&mut Vec<Value>> {
        self.ensure_available()?;
        self.collections
            .get_mut(name)
            .ok_or_else(|| AppError::NotFound(format!("Collection {} not found", name)))
    }

    pub fn find(&self, name: &str, id: &str) -> AppResult<&Value> {
        self.collection(name)?
            .iter()
            .find(|record| field_matches(record, "id", id))
            .ok_or_else(|| not_found(name, id))
    }

    /// Typed copy of the products collection. Records that do not deserialize
    /// are logged and left out.
    pub fn products(&self) -> AppResult<Vec<Product>> {
        let records = self.collection(PRODUCTS)?;
        let mut products = Vec::with_capacity(records.len());
        for record in records {
            match serde_json::from_value::<Product>(record.clone()) {
                Ok(product) => products.push(product),
                Err(err) => {
                    let id = record.get("id").cloned().unwrap_or_default();
                    warn!(id = %id, error = %err, "Skipping malformed product");
                }
            }
        }
        Ok(products)
    }

    // ── Writes ────────────────────────────────────────────────────────────────

    /// Appends `record`, creating the collection if needed. A missing id is
    /// assigned: the next integer when every existing id is an integer, a
    /// UUID string otherwise.
    pub fn insert(&mut self, name: &str, record: Value) -> AppResult<Value> {
        self.ensure_available()?;
        let mut fields = into_object(record)?;
        let records = self.collections.entry(name.to_string()).or_default();

        let id = match fields.get("id").and_then(RecordId::from_value) {
            Some(id) => {
                let raw = id.to_string();
                if records.iter().any(|r| field_matches(r, "id", &raw)) {
                    return Err(AppError::BadRequest(format!(
                        "{} {} already exists",
                        name, raw
                    )));
                }
                id
            }
            None => next_id(records),
        };
        fields.insert("id".to_string(), id.to_value());

        let record = Value::Object(fields);
        records.push(record.clone());
        Ok(record)
    }

    /// Replaces the record wholesale. The stored id always wins over any id
    /// in the body.
    pub fn replace(&mut self, name: &str, id: &str, record: Value) -> AppResult<Value> {
        let mut fields = into_object(record)?;
        let slot = self.slot_mut(name, id)?;
        fields.insert("id".to_string(), slot["id"].clone());
        *slot = Value::Object(fields);
        Ok(slot.clone())
    }

    /// Shallow-merges `partial` into the record.
    pub fn patch(&mut self, name: &str, id: &str, partial: Value) -> AppResult<Value> {
        let fields = into_object(partial)?;
        let slot = self.slot_mut(name, id)?;
        if let Value::Object(existing) = slot {
            for (key, value) in fields {
                if key != "id" {
                    existing.insert(key, value);
                }
            }
        }
        Ok(slot.clone())
    }

    pub fn remove(&mut self, name: &str, id: &str) -> AppResult<Value> {
        let records = self.collection_mut(name)?;
        let index = records
            .iter()
            .position(|record| field_matches(record, "id", id))
            .ok_or_else(|| not_found(name, id))?;
        Ok(records.remove(index))
    }

    fn slot_mut(&mut self, name: &str, id: &str) -> AppResult<&mut Value> {
        self.collection_mut(name)?
            .iter_mut()
            .find(|record| field_matches(record, "id", id))
            .ok_or_else(|| not_found(name, id))
    }
}

fn not_found(collection: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} {} not found", collection, id))
}

fn into_object(value: Value) -> AppResult<Map<String, Value>> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(AppError::BadRequest(format!(
            "record must be a JSON object, got {}",
            kind_of(&other)
        ))),
    }
}

fn next_id(records: &[Value]) -> RecordId {
    let mut max = 0_i64;
    for record in records {
        match record.get("id").and_then(RecordId::from_value) {
            Some(RecordId::Int(n)) => max = max.max(n),
            Some(RecordId::Str(_)) => return RecordId::Str(Uuid::new_v4().to_string()),
            None => {}
        }
    }
    RecordId::Int(max + 1)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
