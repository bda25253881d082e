//! Pre-built records for common testing scenarios.

use crate::table::Record;
use serde_json::{json, Value};

/// Build a [`Record`] from a JSON object literal.
///
/// Anything other than an object yields an empty record.
///
/// # Example
///
/// ```
/// use postflow::testing::record;
/// use serde_json::json;
///
/// let r = record(json!({"id": 1, "title": "t"}));
/// assert_eq!(r.len(), 2);
/// ```
#[must_use]
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

/// Build one post in the shape the JSON API returns.
#[must_use]
pub fn post(user_id: i64, id: i64, title: &str, body: &str) -> Record {
    record(json!({
        "userId": user_id,
        "id": id,
        "title": title,
        "body": body,
    }))
}

/// A small, messy batch of posts.
///
/// Contains untrimmed titles, multi-line bodies, one blank title (id 3), one
/// non-text body (id 4), one record with no body key (id 5), and a repeated
/// id (6). Transforming it with the default settings keeps ids 1, 2 and 7.
#[must_use]
pub fn sample_posts() -> Vec<Record> {
    vec![
        post(1, 1, "  sunt aut facere  ", "quia et suscipit\nsuscipit recusandae"),
        post(1, 2, "qui est esse", "est rerum tempore vitae\n\nsequi sint nihil"),
        post(1, 3, "   ", "ea molestias quasi exercitationem"),
        record(json!({"userId": 2, "id": 4, "title": "eum et est", "body": 42})),
        record(json!({"userId": 2, "id": 5, "title": "nesciunt quas odio"})),
        post(2, 6, "dolorem eum magni", "ut aspernatur corporis"),
        post(3, 6, "magnam facilis autem", "dolore placeat quibusdam"),
        post(3, 7, "dolorem dolore est ipsam", "dignissimos aperiam\tdolorem qui eum"),
    ]
}
