// ── Remote item ──
//
// The server's representation of a certificate or proxy host. Kept as the
// raw JSON object so it round-trips untouched; `id` and `domain_names`
// are lifted out because search and mutation paths need them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// A certificate or proxy host as returned by the management API.
///
/// Read-only evidence: fetched at the start of a reconciliation and then
/// left alone, replaced, or deleted on the remote side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct RemoteItem {
    pub id: i64,
    pub domain_names: Vec<String>,
    /// The complete object, `id` and `domain_names` included.
    fields: Map<String, Value>,
}

impl RemoteItem {
    /// All fields of the remote object, keyed by their wire names.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The opaque server object.
    pub fn raw(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Identity check used by search: does this item serve `domain`?
    pub fn serves(&self, domain: &str) -> bool {
        self.domain_names.iter().any(|d| d == domain)
    }
}

/// `domain_names` of a listing entry, or an empty list if it has none.
pub(crate) fn domain_names_of(value: &Value) -> Vec<String> {
    value
        .get("domain_names")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

impl TryFrom<Value> for RemoteItem {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let domain_names = domain_names_of(&value);
        let Value::Object(fields) = value else {
            return Err(Error::Deserialization {
                message: "expected a JSON object".into(),
                body: value.to_string(),
            });
        };
        let id = fields
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::Deserialization {
                message: "item without an integer `id`".into(),
                body: Value::Object(fields.clone()).to_string(),
            })?;
        Ok(Self {
            id,
            domain_names,
            fields,
        })
    }
}

impl From<RemoteItem> for Value {
    fn from(item: RemoteItem) -> Self {
        Value::Object(item.fields)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn lifts_id_and_domain_names() {
        let item = RemoteItem::try_from(json!({
            "id": 7,
            "domain_names": ["some.domain", "*.some.domain"],
            "provider": "letsencrypt"
        }))
        .unwrap();

        assert_eq!(item.id, 7);
        assert!(item.serves("*.some.domain"));
        assert!(!item.serves("other.domain"));
        assert_eq!(item.get("provider"), Some(&json!("letsencrypt")));
    }

    #[test]
    fn serializes_back_to_the_server_object() {
        let raw = json!({"id": 3, "domain_names": ["a.b"], "forward_port": 81});
        let item: RemoteItem = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&item).unwrap(), raw);
    }

    #[test]
    fn missing_domain_names_is_an_empty_list() {
        let item = RemoteItem::try_from(json!({"id": 1})).unwrap();
        assert!(item.domain_names.is_empty());
    }

    #[test]
    fn rejects_item_without_id() {
        let err = RemoteItem::try_from(json!({"domain_names": ["a.b"]})).unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
    }
}
