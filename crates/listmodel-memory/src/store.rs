//! The in-memory list store.

use asupersync::{Cx, Outcome};
use listmodel_core::{
    Error, FieldValues, Filter, ListStore, NotFoundError, Record, RecordId,
};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Interior state, guarded by the store mutex.
#[derive(Debug, Default)]
struct MemoryInner {
    /// Records in insertion order. Lists stay small enough that linear id
    /// scans beat maintaining a second index.
    records: Vec<Record>,
    /// Monotonic id counter.
    next_id: u64,
}

impl MemoryInner {
    fn position(&self, id: &RecordId) -> Option<usize> {
        self.records.iter().position(|r| &r.id == id)
    }
}

/// An in-memory storage adapter for one list.
#[derive(Debug)]
pub struct MemoryStore {
    /// The list this store serves; used for error reporting and logging.
    list: String,
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    /// Create an empty store for the named list.
    pub fn new(list: impl Into<String>) -> Self {
        Self {
            list: list.into(),
            inner: Mutex::new(MemoryInner::default()),
        }
    }

    /// The list this store serves.
    pub fn list(&self) -> &str {
        &self.list
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    // A poisoned lock only means another thread panicked mid-operation;
    // the map itself is still structurally sound, so recover the guard.
    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ListStore for MemoryStore {
    fn create(
        &self,
        cx: &Cx,
        values: FieldValues,
    ) -> impl Future<Output = Outcome<Record, Error>> + Send {
        let _ = cx;
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = RecordId::new(format!("{}-{}", self.list, inner.next_id));
        let record = Record::new(id, values);
        inner.records.push(record.clone());
        tracing::trace!(list = %self.list, id = %record.id, "created record");
        async move { Outcome::Ok(record) }
    }

    fn find_by_id(
        &self,
        cx: &Cx,
        id: &RecordId,
    ) -> impl Future<Output = Outcome<Option<Record>, Error>> + Send {
        let _ = cx;
        let inner = self.lock();
        let found = inner.position(id).map(|i| inner.records[i].clone());
        async move { Outcome::Ok(found) }
    }

    fn update(
        &self,
        cx: &Cx,
        id: &RecordId,
        values: FieldValues,
    ) -> impl Future<Output = Outcome<Record, Error>> + Send {
        let _ = cx;
        let mut inner = self.lock();
        let result = match inner.position(id) {
            Some(index) => {
                let record = &mut inner.records[index];
                for (field, value) in values {
                    record.set(field, value);
                }
                tracing::trace!(list = %self.list, id = %record.id, "updated record");
                Ok(record.clone())
            }
            None => Err(Error::NotFound(NotFoundError::new(&self.list, id.clone()))),
        };
        async move { result.map_or_else(Outcome::Err, Outcome::Ok) }
    }

    fn delete(&self, cx: &Cx, id: &RecordId) -> impl Future<Output = Outcome<(), Error>> + Send {
        let _ = cx;
        let mut inner = self.lock();
        let result = match inner.position(id) {
            Some(index) => {
                inner.records.remove(index);
                tracing::trace!(list = %self.list, id = %id, "deleted record");
                Ok(())
            }
            None => Err(Error::NotFound(NotFoundError::new(&self.list, id.clone()))),
        };
        async move { result.map_or_else(Outcome::Err, Outcome::Ok) }
    }

    fn find_all(
        &self,
        cx: &Cx,
        filter: &Filter,
    ) -> impl Future<Output = Outcome<Vec<Record>, Error>> + Send {
        let _ = cx;
        let inner = self.lock();
        let matched: Vec<Record> = inner
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        async move { Outcome::Ok(matched) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asupersync::runtime::RuntimeBuilder;
    use listmodel_core::Value;

    fn values(pairs: &[(&str, Value)]) -> FieldValues {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn run<F, T>(f: F) -> T
    where
        F: Future<Output = T>,
    {
        let rt = RuntimeBuilder::current_thread()
            .build()
            .expect("create asupersync runtime");
        rt.block_on(f)
    }

    #[test]
    fn create_assigns_unique_ids_in_order() {
        let store = MemoryStore::new("Student");
        let cx = Cx::for_testing();

        run(async {
            let a = match store.create(&cx, values(&[("name", Value::from("A"))])).await {
                Outcome::Ok(r) => r,
                other => panic!("unexpected outcome: {other:?}"),
            };
            let b = match store.create(&cx, values(&[("name", Value::from("B"))])).await {
                Outcome::Ok(r) => r,
                other => panic!("unexpected outcome: {other:?}"),
            };
            assert_ne!(a.id, b.id);
            assert_eq!(store.len(), 2);

            let all = match store.find_all(&cx, &Filter::All).await {
                Outcome::Ok(r) => r,
                other => panic!("unexpected outcome: {other:?}"),
            };
            assert_eq!(all[0].id, a.id);
            assert_eq!(all[1].id, b.id);
        });
    }

    #[test]
    fn find_by_id_absent_is_none() {
        let store = MemoryStore::new("Student");
        let cx = Cx::for_testing();

        run(async {
            let found = match store.find_by_id(&cx, &RecordId::new("nope")).await {
                Outcome::Ok(r) => r,
                other => panic!("unexpected outcome: {other:?}"),
            };
            assert!(found.is_none());
        });
    }

    #[test]
    fn update_merges_fields() {
        let store = MemoryStore::new("Student");
        let cx = Cx::for_testing();

        run(async {
            let rec = match store
                .create(&cx, values(&[("name", Value::from("A")), ("age", Value::from(7_i64))]))
                .await
            {
                Outcome::Ok(r) => r,
                other => panic!("unexpected outcome: {other:?}"),
            };

            let updated = match store
                .update(&cx, &rec.id, values(&[("name", Value::from("B"))]))
                .await
            {
                Outcome::Ok(r) => r,
                other => panic!("unexpected outcome: {other:?}"),
            };
            assert_eq!(updated.get("name"), Some(&Value::from("B")));
            // untouched fields survive the merge
            assert_eq!(updated.get("age"), Some(&Value::from(7_i64)));
        });
    }

    #[test]
    fn update_and_delete_absent_are_not_found() {
        let store = MemoryStore::new("Student");
        let cx = Cx::for_testing();

        run(async {
            let id = RecordId::new("ghost");
            match store.update(&cx, &id, FieldValues::new()).await {
                Outcome::Err(e) => assert!(e.is_not_found()),
                other => panic!("unexpected outcome: {other:?}"),
            }
            match store.delete(&cx, &id).await {
                Outcome::Err(e) => assert!(e.is_not_found()),
                other => panic!("unexpected outcome: {other:?}"),
            }
        });
    }

    #[test]
    fn delete_removes_record() {
        let store = MemoryStore::new("Student");
        let cx = Cx::for_testing();

        run(async {
            let rec = match store.create(&cx, FieldValues::new()).await {
                Outcome::Ok(r) => r,
                other => panic!("unexpected outcome: {other:?}"),
            };
            match store.delete(&cx, &rec.id).await {
                Outcome::Ok(()) => {}
                other => panic!("unexpected outcome: {other:?}"),
            }
            assert!(store.is_empty());
            let found = match store.find_by_id(&cx, &rec.id).await {
                Outcome::Ok(r) => r,
                other => panic!("unexpected outcome: {other:?}"),
            };
            assert!(found.is_none());
        });
    }

    #[test]
    fn find_all_applies_reference_filter() {
        let store = MemoryStore::new("Teacher");
        let cx = Cx::for_testing();

        run(async {
            let s1 = RecordId::new("s1");
            let s2 = RecordId::new("s2");
            let t1 = match store
                .create(
                    &cx,
                    values(&[("students", Value::IdList(vec![s1.clone(), s2.clone()]))]),
                )
                .await
            {
                Outcome::Ok(r) => r,
                other => panic!("unexpected outcome: {other:?}"),
            };
            let _t2 = match store
                .create(&cx, values(&[("students", Value::IdList(vec![s2.clone()]))]))
                .await
            {
                Outcome::Ok(r) => r,
                other => panic!("unexpected outcome: {other:?}"),
            };

            let referencing_s1 = match store
                .find_all(&cx, &Filter::field_references("students", s1.clone()))
                .await
            {
                Outcome::Ok(r) => r,
                other => panic!("unexpected outcome: {other:?}"),
            };
            assert_eq!(referencing_s1.len(), 1);
            assert_eq!(referencing_s1[0].id, t1.id);

            let referencing_s2 = match store
                .find_all(&cx, &Filter::field_references("students", s2))
                .await
            {
                Outcome::Ok(r) => r,
                other => panic!("unexpected outcome: {other:?}"),
            };
            assert_eq!(referencing_s2.len(), 2);
        });
    }
}
