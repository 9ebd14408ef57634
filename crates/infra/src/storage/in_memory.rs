use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use serde_json::Value as JsonValue;

use dailyround_catalog::{Category, Offering};
use dailyround_core::{OfferingGid, OwnerId};

use super::r#trait::{CatalogStorage, StorageError};

#[derive(Debug, Clone)]
struct StoredRecord {
    owner_id: OwnerId,
    payload: JsonValue,
}

/// In-memory record store.
///
/// Records are kept as serialized JSON documents, so every save and fetch is
/// a full copy and nothing is shared with the caller's values. Intended for
/// tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStorage {
    records: RwLock<HashMap<OfferingGid, StoredRecord>>,
    categories: RwLock<Vec<Category>>,
}

impl InMemoryCatalogStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(categories: Vec<Category>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            categories: RwLock::new(categories),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn decode(gid: &OfferingGid, record: &StoredRecord) -> Option<Offering> {
        match serde_json::from_value(record.payload.clone()) {
            Ok(offering) => Some(offering),
            Err(err) => {
                tracing::warn!(gid = %gid, error = %err, "skipping undecodable offering record");
                None
            }
        }
    }
}

impl CatalogStorage for InMemoryCatalogStorage {
    fn fetch_by_id(&self, gid: &OfferingGid) -> Option<Offering> {
        let records = self.records.read().ok()?;
        records.get(gid).and_then(|r| Self::decode(gid, r))
    }

    fn fetch_all(
        &self,
        owner_id: OwnerId,
        category_filter: Option<&str>,
        search_text: Option<&str>,
    ) -> Vec<Offering> {
        let records = match self.records.read() {
            Ok(r) => r,
            Err(_) => return vec![],
        };
        let needle = search_text
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut offerings: Vec<Offering> = records
            .iter()
            .filter(|(_, r)| r.owner_id == owner_id)
            .filter_map(|(gid, r)| Self::decode(gid, r))
            .filter(|o| category_filter.is_none_or(|c| o.category_key() == Some(c)))
            .filter(|o| {
                needle
                    .as_deref()
                    .is_none_or(|n| o.name.to_lowercase().contains(n))
            })
            .collect();
        // HashMap order is arbitrary; hand records back in a stable order.
        offerings.sort_by(|a, b| a.gid().cmp(b.gid()));
        offerings
    }

    fn fetch_categories(&self) -> Vec<Category> {
        let mut categories = self.categories.read().map(|c| c.clone()).unwrap_or_default();
        categories.sort_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.name.cmp(&b.name)));
        categories
    }

    fn save(&self, offering: &Offering) -> Result<(), StorageError> {
        let payload = serde_json::to_value(offering)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let mut records = self
            .records
            .write()
            .map_err(|_| StorageError::Unavailable("lock poisoned".to_string()))?;
        records.insert(
            offering.gid().clone(),
            StoredRecord {
                owner_id: offering.owner_id,
                payload,
            },
        );
        Ok(())
    }

    fn delete(&self, offering: &Offering) -> Result<(), StorageError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StorageError::Unavailable("lock poisoned".to_string()))?;
        match records.remove(offering.gid()) {
            Some(_) => Ok(()),
            None => Err(StorageError::Rejected(format!(
                "no record for gid {}",
                offering.gid()
            ))),
        }
    }

    fn distinct_category_values(&self, owner_id: OwnerId, supplier_defined: bool) -> Vec<String> {
        self.fetch_all(owner_id, None, None)
            .into_iter()
            .filter_map(|o| {
                let value = if supplier_defined {
                    o.supplier_defined_category
                } else {
                    o.category
                };
                value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
