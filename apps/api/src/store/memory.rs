use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{group_key, CompanyJobCount, Document, Filter, JobStore, StoreError, StoredJob};

/// In-process job store. Documents live in insertion order behind a single lock,
/// so every operation is atomic with respect to the others.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<Vec<StoredJob>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_one(&self, doc: Document) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        self.jobs.write().await.push(StoredJob { id, doc });
        Ok(id)
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<StoredJob>, StoreError> {
        let jobs = self.jobs.read().await;
        Ok(jobs.iter().find(|job| filter.matches(&job.doc)).cloned())
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<StoredJob>, StoreError> {
        let jobs = self.jobs.read().await;
        Ok(jobs
            .iter()
            .filter(|job| filter.matches(&job.doc))
            .cloned()
            .collect())
    }

    async fn replace_one(&self, filter: &Filter, doc: Document) -> Result<bool, StoreError> {
        let mut jobs = self.jobs.write().await;
        match jobs.iter_mut().find(|job| filter.matches(&job.doc)) {
            Some(job) => {
                job.doc = doc;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_one(&self, filter: &Filter) -> Result<bool, StoreError> {
        let mut jobs = self.jobs.write().await;
        match jobs.iter().position(|job| filter.matches(&job.doc)) {
            Some(index) => {
                jobs.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_by_company(&self, filter: &Filter) -> Result<Vec<CompanyJobCount>, StoreError> {
        let jobs = self.jobs.read().await;

        // Missing and null share a group, as do numerically equal names.
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, CompanyJobCount> = HashMap::new();
        for job in jobs.iter().filter(|job| filter.matches(&job.doc)) {
            let company = job.doc.get("company_name").cloned().unwrap_or(Value::Null);
            let key = group_key(&company);
            groups
                .entry(key.clone())
                .or_insert_with(|| {
                    order.push(key);
                    CompanyJobCount {
                        company_name: company,
                        job_count: 0,
                    }
                })
                .job_count += 1;
        }

        let mut counts: Vec<CompanyJobCount> = order
            .into_iter()
            .filter_map(|key| groups.remove(&key))
            .collect();
        counts.sort_by(|a, b| b.job_count.cmp(&a.job_count));
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_insert_then_find_one() {
        let store = MemoryJobStore::new();
        let id = store
            .insert_one(doc(json!({ "id": 1, "title": "Engineer" })))
            .await
            .unwrap();

        let found = store.find_one(&Filter::eq("id", 1)).await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.doc["title"], json!("Engineer"));
        assert!(store.find_one(&Filter::eq("id", 2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_keeps_insertion_order() {
        let store = MemoryJobStore::new();
        for title in ["a", "b", "c"] {
            store
                .insert_one(doc(json!({ "title": title, "industry": "Tech" })))
                .await
                .unwrap();
        }
        let titles: Vec<_> = store
            .find(&Filter::eq("industry", "Tech"))
            .await
            .unwrap()
            .into_iter()
            .map(|job| job.doc["title"].clone())
            .collect();
        assert_eq!(titles, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[tokio::test]
    async fn test_replace_and_delete_touch_only_first_match() {
        let store = MemoryJobStore::new();
        store.insert_one(doc(json!({ "title": "dup", "n": 1 }))).await.unwrap();
        store.insert_one(doc(json!({ "title": "dup", "n": 2 }))).await.unwrap();

        let by_title = Filter::eq("title", "dup");
        assert!(store
            .replace_one(&by_title, doc(json!({ "title": "dup", "n": 10 })))
            .await
            .unwrap());
        let all = store.find(&by_title).await.unwrap();
        assert_eq!(all[0].doc["n"], json!(10));
        assert_eq!(all[1].doc["n"], json!(2));

        assert!(store.delete_one(&by_title).await.unwrap());
        let remaining = store.find(&by_title).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].doc["n"], json!(2));

        assert!(!store
            .delete_one(&Filter::eq("title", "missing"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_count_by_company_groups_equal_numbers() {
        let store = MemoryJobStore::new();
        for company in [json!(5), json!(5.0), json!(6)] {
            store
                .insert_one(doc(json!({ "company_name": company, "industry": "Tech" })))
                .await
                .unwrap();
        }
        let counts = store
            .count_by_company(&Filter::eq("industry", "Tech"))
            .await
            .unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].company_name, json!(5));
        assert_eq!(counts[0].job_count, 2);
    }

    #[tokio::test]
    async fn test_count_by_company_sorted_descending() {
        let store = MemoryJobStore::new();
        let rows = [
            ("Acme", "Tech"),
            ("Globex", "Tech"),
            ("Globex", "Tech"),
            ("Initech", "Finance"),
            ("Globex", "Finance"),
        ];
        for (company, industry) in rows {
            store
                .insert_one(doc(json!({ "company_name": company, "industry": industry })))
                .await
                .unwrap();
        }
        store.insert_one(doc(json!({ "industry": "Tech" }))).await.unwrap();

        let counts = store
            .count_by_company(&Filter::eq("industry", "Tech"))
            .await
            .unwrap();
        assert_eq!(counts.len(), 3);
        assert_eq!(counts[0].company_name, json!("Globex"));
        assert_eq!(counts[0].job_count, 2);
        assert!(counts[1..].iter().all(|c| c.job_count == 1));
        assert!(counts.iter().any(|c| c.company_name.is_null()));
    }
}
