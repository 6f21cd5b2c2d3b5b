//! Nested `{ entities: [...] }` connections

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
struct Connection<T> {
    entities: Option<Vec<T>>,
}

/// Deserialize a nested connection into its entities.
///
/// A null or missing connection, or null `entities`, yields an empty list.
pub fn entities<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let connection: Option<Connection<T>> = Option::deserialize(deserializer)?;
    Ok(connection.and_then(|c| c.entities).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Parent {
        #[serde(default, deserialize_with = "entities")]
        children: Vec<i64>,
    }

    #[test]
    fn test_connection_unwraps_entities() {
        let parent: Parent = serde_json::from_value(json!({"children": {"entities": [1, 2]}})).unwrap();
        assert_eq!(parent.children, vec![1, 2]);
    }

    #[test]
    fn test_null_connection_is_empty() {
        let parent: Parent = serde_json::from_value(json!({"children": null})).unwrap();
        assert!(parent.children.is_empty());

        let parent: Parent = serde_json::from_value(json!({"children": {"entities": null}})).unwrap();
        assert!(parent.children.is_empty());

        let parent: Parent = serde_json::from_value(json!({})).unwrap();
        assert!(parent.children.is_empty());
    }

    #[test]
    fn test_connection_without_entities_key() {
        let parent: Parent = serde_json::from_value(json!({"children": {}})).unwrap();
        assert!(parent.children.is_empty());
    }

    #[derive(Debug, Deserialize)]
    struct Reply {
        id: i64,
    }

    #[derive(Debug, Deserialize)]
    struct Thread {
        #[serde(default, deserialize_with = "entities")]
        replies: Vec<Reply>,
    }

    #[test]
    fn test_connection_of_non_default_entities() {
        let thread: Thread =
            serde_json::from_value(json!({"replies": {"entities": [{"id": 3}, {"id": 4}]}})).unwrap();
        assert_eq!(thread.replies.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 4]);
    }
}
