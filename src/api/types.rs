//! Zotero API request and response types.
//!
//! These types model the parts of the Zotero Web API v3 responses the client
//! reads. Unknown fields are preserved so the literal payload is never lost.

use std::collections::HashMap;
use std::fmt;

use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One page of a paginated list response.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// The decoded JSON array of this page.
    pub items: Vec<T>,
    /// Every relation from the `Link` header, resolved to absolute URLs.
    pub links: HashMap<String, Url>,
    /// Where the following page lives, if there is one.
    pub next: Option<Url>,
}

impl<T> Page<T> {
    /// Whether another page can be fetched.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Response of `GET keys/{key}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyInfo {
    /// The user the key belongs to.
    #[serde(rename = "userID", deserialize_with = "string_or_number")]
    pub user_id: String,
    /// The Zotero username, when the server sends it.
    #[serde(default)]
    pub username: Option<String>,
    /// Access rights granted to the key.
    #[serde(default)]
    pub access: Option<Value>,
}

/// A group returned by `GET users/{id}/groups`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// The group id.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Group metadata.
    #[serde(default)]
    pub data: Option<GroupData>,
}

impl Group {
    /// Get the group name, if known.
    pub fn name(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.name.as_deref())
    }
}

/// Metadata of a group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupData {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Group type, e.g. `Private`.
    #[serde(default, rename = "type")]
    pub group_type: Option<String>,
}

/// A library item.
///
/// Returned by `GET users/{id}/items` and `GET groups/{id}/items`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    /// The item key, e.g. `ABCD2345`.
    #[serde(default)]
    pub key: String,
    /// Library version of the item.
    #[serde(default)]
    pub version: u64,
    /// The item fields.
    #[serde(default)]
    pub data: ItemData,
    /// Everything else in the payload (`library`, `links`, `meta`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// Get the item title.
    pub fn title(&self) -> &str {
        self.data.title.as_deref().unwrap_or("")
    }

    /// Get the item type, e.g. `journalArticle`.
    pub fn item_type(&self) -> &str {
        &self.data.item_type
    }

    /// Creator names formatted as `Last, First`, in order.
    pub fn creator_names(&self) -> Vec<String> {
        self.data.creators.iter().map(Creator::display_name).collect()
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.key, self.title())?;
        if let Some(date) = self.data.date.as_deref().filter(|d| !d.is_empty()) {
            write!(f, " ({})", date)?;
        }
        Ok(())
    }
}

/// Fields of an item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemData {
    /// The item type.
    #[serde(default)]
    pub item_type: String,
    /// The title, absent for notes and attachments.
    #[serde(default)]
    pub title: Option<String>,
    /// Authors, editors and other creators.
    #[serde(default)]
    pub creators: Vec<Creator>,
    /// Free-form publication date.
    #[serde(default)]
    pub date: Option<String>,
    /// Remaining type-specific fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A creator of an item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    /// Role, e.g. `author`.
    #[serde(default)]
    pub creator_type: String,
    /// Given name (two-field mode).
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name (two-field mode).
    #[serde(default)]
    pub last_name: Option<String>,
    /// Full name (single-field mode).
    #[serde(default)]
    pub name: Option<String>,
}

impl Creator {
    /// Format the creator for display.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        match (self.last_name.as_deref(), self.first_name.as_deref()) {
            (Some(last), Some(first)) if !first.is_empty() => format!("{}, {}", last, first),
            (Some(last), _) => last.to_string(),
            (None, Some(first)) => first.to_string(),
            (None, None) => String::new(),
        }
    }
}

/// Accept an id sent either as a JSON string or a JSON number.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Num(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Str(s) => s,
        Id::Num(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_info_numeric_user_id() {
        let info: KeyInfo =
            serde_json::from_str(r#"{"key":"k","userID":475425,"username":"someone"}"#).unwrap();
        assert_eq!(info.user_id, "475425");
        assert_eq!(info.username.as_deref(), Some("someone"));
    }

    #[test]
    fn test_key_info_string_user_id() {
        let info: KeyInfo = serde_json::from_str(r#"{"userID":"42"}"#).unwrap();
        assert_eq!(info.user_id, "42");
    }

    #[test]
    fn test_key_info_missing_user_id_fails() {
        assert!(serde_json::from_str::<KeyInfo>(r#"{"key":"k"}"#).is_err());
    }

    #[test]
    fn test_group_parsing() {
        let group: Group = serde_json::from_str(
            r#"{"id":123,"version":4,"data":{"id":123,"name":"Lab","type":"Private"}}"#,
        )
        .unwrap();
        assert_eq!(group.id, "123");
        assert_eq!(group.name(), Some("Lab"));
    }

    #[test]
    fn test_item_parsing_preserves_extra_fields() {
        let item: Item = serde_json::from_str(
            r#"{
                "key": "ABCD2345",
                "version": 12,
                "library": {"type": "user", "id": 7},
                "data": {
                    "key": "ABCD2345",
                    "itemType": "journalArticle",
                    "title": "On Things",
                    "creators": [
                        {"creatorType": "author", "firstName": "Ada", "lastName": "Lovelace"},
                        {"creatorType": "editor", "name": "The Committee"}
                    ],
                    "date": "1843",
                    "DOI": "10.1000/xyz"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(item.key, "ABCD2345");
        assert_eq!(item.version, 12);
        assert_eq!(item.item_type(), "journalArticle");
        assert_eq!(item.title(), "On Things");
        assert_eq!(item.creator_names(), vec!["Lovelace, Ada", "The Committee"]);
        assert!(item.extra.contains_key("library"));
        assert_eq!(item.data.extra["DOI"], "10.1000/xyz");
        assert_eq!(item.to_string(), "ABCD2345  On Things (1843)");
    }

    #[test]
    fn test_item_parsing_minimal() {
        let item: Item = serde_json::from_str("{}").unwrap();
        assert_eq!(item.key, "");
        assert_eq!(item.title(), "");
        assert_eq!(item.to_string(), "  ");
    }

    #[test]
    fn test_page_helpers() {
        let page: Page<Item> = Page {
            items: vec![Item::default()],
            links: HashMap::new(),
            next: None,
        };
        assert_eq!(page.len(), 1);
        assert!(!page.is_empty());
        assert!(!page.has_next());
    }
}
