#![allow(clippy::unwrap_used)]
// In-memory resource collection for reconciler tests.

use std::sync::Mutex;

use npmctl_api::{Error, RemoteItem};
use serde::Serialize;
use serde_json::{Value, json};

use super::ResourceApi;

/// Per-operation call counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Calls {
    pub search: usize,
    pub create: usize,
    pub update: usize,
    pub delete: usize,
}

impl Calls {
    pub fn mutations(self) -> usize {
        self.create + self.update + self.delete
    }
}

/// A collection that behaves like the server: create assigns ids and
/// stores the payload, update replaces it, delete removes it.
#[derive(Debug, Default)]
pub(crate) struct StubApi {
    items: Mutex<Vec<Value>>,
    calls: Mutex<Calls>,
    search_failure: Option<(u16, String)>,
    mutation_failure: Option<(u16, String)>,
}

impl StubApi {
    pub fn with_items(items: Vec<Value>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Self::default()
        }
    }

    pub fn failing_search(status: u16, body: &str) -> Self {
        Self {
            search_failure: Some((status, body.to_owned())),
            ..Self::default()
        }
    }

    pub fn rejecting_mutations(mut self, status: u16, body: &str) -> Self {
        self.mutation_failure = Some((status, body.to_owned()));
        self
    }

    pub fn calls(&self) -> Calls {
        *self.calls.lock().unwrap()
    }

    pub fn items(&self) -> Vec<Value> {
        self.items.lock().unwrap().clone()
    }

    fn count(&self, f: impl FnOnce(&mut Calls)) {
        f(&mut self.calls.lock().unwrap());
    }

    fn fail_mutation(&self) -> Result<(), Error> {
        match &self.mutation_failure {
            Some((status, body)) => Err(Error::UnexpectedStatus {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(()),
        }
    }

    fn next_id(items: &[Value]) -> i64 {
        items
            .iter()
            .filter_map(|item| item.get("id").and_then(Value::as_i64))
            .max()
            .unwrap_or(0)
            + 1
    }
}

impl ResourceApi for StubApi {
    async fn search(&self, domain: &str) -> Result<Option<RemoteItem>, Error> {
        self.count(|c| c.search += 1);
        if let Some((status, body)) = &self.search_failure {
            return Err(Error::UnexpectedStatus {
                status: *status,
                body: body.clone(),
            });
        }
        let items = self.items();
        items
            .into_iter()
            .find(|item| {
                item.get("domain_names")
                    .and_then(Value::as_array)
                    .is_some_and(|names| names.iter().any(|n| n.as_str() == Some(domain)))
            })
            .map(RemoteItem::try_from)
            .transpose()
    }

    async fn create<B: Serialize + Sync>(&self, payload: &B) -> Result<RemoteItem, Error> {
        self.count(|c| c.create += 1);
        self.fail_mutation()?;
        let mut item = serde_json::to_value(payload).unwrap();
        let mut items = self.items.lock().unwrap();
        item["id"] = json!(Self::next_id(&items));
        items.push(item.clone());
        RemoteItem::try_from(item)
    }

    async fn update<B: Serialize + Sync>(&self, id: i64, payload: &B) -> Result<RemoteItem, Error> {
        self.count(|c| c.update += 1);
        self.fail_mutation()?;
        let mut item = serde_json::to_value(payload).unwrap();
        item["id"] = json!(id);
        let mut items = self.items.lock().unwrap();
        let slot = items
            .iter_mut()
            .find(|existing| existing.get("id").and_then(Value::as_i64) == Some(id))
            .ok_or_else(|| Error::UnexpectedStatus {
                status: 404,
                body: "Not Found".into(),
            })?;
        *slot = item.clone();
        RemoteItem::try_from(item)
    }

    async fn delete(&self, id: i64) -> Result<Value, Error> {
        self.count(|c| c.delete += 1);
        self.fail_mutation()?;
        self.items
            .lock()
            .unwrap()
            .retain(|existing| existing.get("id").and_then(Value::as_i64) != Some(id));
        Ok(json!(true))
    }
}
