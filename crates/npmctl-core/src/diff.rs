// ── Field-level comparison ──
//
// Decides whether an existing remote item already satisfies a desired
// field set. Pure: no I/O, no defaults. A key missing on either side
// makes the two sides not equivalent.

use serde_json::{Map, Value};

/// The proxy host fields a caller controls, in wire names.
pub const PROXY_HOST_KEYS: [&str; 9] = [
    "domain_names",
    "forward_scheme",
    "forward_host",
    "forward_port",
    "caching_enabled",
    "allow_websocket_upgrade",
    "certificate_id",
    "ssl_forced",
    "http2_support",
];

/// `true` if every key in `keys` is present on both sides with equal values.
pub fn equivalent(desired: &Map<String, Value>, existing: &Map<String, Value>, keys: &[&str]) -> bool {
    differing_keys(desired, existing, keys).is_empty()
}

/// The keys, in `keys` order, that are missing on either side or differ.
pub fn differing_keys<'k>(
    desired: &Map<String, Value>,
    existing: &Map<String, Value>,
    keys: &[&'k str],
) -> Vec<&'k str> {
    keys.iter()
        .copied()
        .filter(|key| match (desired.get(*key), existing.get(*key)) {
            (Some(want), Some(have)) => !same_value(want, have),
            _ => true,
        })
        .collect()
}

/// Structural equality with numbers compared by value, so `81` and `81.0`
/// agree. Booleans never equal numbers.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_value(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| same_value(x, y)))
        }
        _ => a == b,
    }
}
