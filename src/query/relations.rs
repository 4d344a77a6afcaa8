use serde_json::Value;

use crate::models::field_matches;

/// Plurals whose singular is not derivable from the suffix rules below.
const IRREGULAR: &[(&str, &str)] = &[
    ("movies", "movie"),
    ("cookies", "cookie"),
    ("series", "series"),
    ("people", "person"),
];

fn singularize(plural: &str) -> String {
    if let Some((_, singular)) = IRREGULAR.iter().find(|(p, _)| *p == plural) {
        return singular.to_string();
    }
    match plural {
        s if s.ends_with("ies") && s.len() > 3 => format!("{}y", &s[..s.len() - 3]),
        s if s.len() > 3
            && (s.ends_with("ses")
                || s.ends_with("shes")
                || s.ends_with("ches")
                || s.ends_with("xes")) =>
        {
            s[..s.len() - 2].to_string()
        }
        s if s.ends_with('s') && s.len() > 1 => s[..s.len() - 1].to_string(),
        s => s.to_string(),
    }
}

/// Field that links a child record to a parent collection, e.g.
/// `users` → `userId`, `categories` → `categoryId`.
pub fn foreign_key_for(parent: &str) -> String {
    format!("{}Id", singularize(parent))
}

/// Records whose `foreign_key` field equals `parent_id`, in collection order.
pub fn related(records: &[Value], foreign_key: &str, parent_id: &str) -> Vec<Value> {
    records
        .iter()
        .filter(|record| field_matches(record, foreign_key, parent_id))
        .cloned()
        .collect()
}

/// Posts owned by `user_id`, in collection order.
pub fn posts_by_user(posts: &[Value], user_id: &str) -> Vec<Value> {
    related(posts, "userId", user_id)
}
