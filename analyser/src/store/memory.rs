use super::ResultStore;
use anyhow::anyhow;
use glidecore::interface::GlideRecord;
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, GlideRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for MemoryStore {
    fn put(&self, flight_id: &str, record: &GlideRecord) -> anyhow::Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        records.insert(flight_id.to_string(), record.clone());
        Ok(())
    }

    fn get(&self, flight_id: &str) -> anyhow::Result<Option<GlideRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(records.get(flight_id).cloned())
    }

    fn flight_ids(&self) -> anyhow::Result<Vec<String>> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(records.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_replaces_previous_record() {
        let store = MemoryStore::new();
        store.put("9", &GlideRecord::new(vec![-7.0], 1.0)).unwrap();
        store.put("9", &GlideRecord::new(vec![-6.0, -6.5], 2.0)).unwrap();
        assert_eq!(store.flight_ids().unwrap(), vec!["9".to_string()]);
        assert_eq!(store.get("9").unwrap().unwrap().sampling, 2.0);
        assert!(store.get("10").unwrap().is_none());
    }
}
