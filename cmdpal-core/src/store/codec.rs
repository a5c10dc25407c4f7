//! Row encoding for the SQLite tables
//!
//! Tags are stored as a comma-joined string and variations as a JSON blob.
//! This is the only place either representation is produced or parsed.

use sqlx::FromRow;

use crate::entry::{split_tags, CatalogEntry, CustomEntry, Variation};
use crate::error::{StoreError, StoreResult};

/// Join tags with commas. Lossy for tags that contain a comma, carry
/// padding or are blank: they decode split, trimmed or dropped.
pub fn encode_tags(tags: &[String]) -> String {
    tags.join(",")
}

pub fn decode_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(split_tags).unwrap_or_default()
}

pub fn encode_variations(id: &str, variations: &[Variation]) -> StoreResult<String> {
    serde_json::to_string(variations).map_err(|source| StoreError::Encode {
        id: id.to_string(),
        source,
    })
}

pub fn decode_variations(id: &str, raw: Option<&str>) -> StoreResult<Vec<Variation>> {
    match raw {
        None => Ok(Vec::new()),
        Some(json) => serde_json::from_str(json).map_err(|source| StoreError::CorruptRow {
            id: id.to_string(),
            source,
        }),
    }
}

/// A row of the `commands` table
#[derive(Debug, FromRow)]
pub struct CatalogRow {
    pub id: String,
    pub name: Option<String>,
    pub platform: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub variations_json: Option<String>,
    pub version: Option<i64>,
}

impl CatalogRow {
    pub fn into_entry(self) -> StoreResult<CatalogEntry> {
        let variations = decode_variations(&self.id, self.variations_json.as_deref())?;
        Ok(CatalogEntry {
            tags: decode_tags(self.tags.as_deref()),
            variations,
            name: self.name.unwrap_or_default(),
            platform: self.platform.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            version: self
                .version
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or_default(),
            id: self.id,
        })
    }
}

/// A row of the `custom_commands` table
#[derive(Debug, FromRow)]
pub struct CustomRow {
    pub id: String,
    pub name: Option<String>,
    pub platform: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub variations_json: Option<String>,
    pub created_at: Option<i64>,
}

impl CustomRow {
    pub fn into_entry(self) -> StoreResult<CustomEntry> {
        let variations = decode_variations(&self.id, self.variations_json.as_deref())?;
        Ok(CustomEntry {
            tags: decode_tags(self.tags.as_deref()),
            variations,
            name: self.name.unwrap_or_default(),
            platform: self.platform.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            created_at: self.created_at.unwrap_or_default(),
            id: self.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tags_round_trip() {
        let tags = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let encoded = encode_tags(&tags);
        assert_eq!(encoded, "a,b,c");
        assert_eq!(decode_tags(Some(&encoded)), tags);
    }

    #[test]
    fn test_tags_are_normalized_on_decode() {
        let tags = vec!["a,b".to_string(), " padded ".to_string(), String::new()];
        assert_eq!(decode_tags(Some(&encode_tags(&tags))), vec!["a", "b", "padded"]);
    }

    #[test]
    fn test_empty_tags_column() {
        assert!(decode_tags(Some("")).is_empty());
        assert!(decode_tags(None).is_empty());
    }

    #[test]
    fn test_corrupt_variations_blob() {
        let err = decode_variations("ls", Some("{not json")).unwrap_err();
        assert!(matches!(err, StoreError::CorruptRow { ref id, .. } if id == "ls"));
    }

    #[test]
    fn test_catalog_row_into_entry() {
        let row = CatalogRow {
            id: "grep".to_string(),
            name: Some("grep".to_string()),
            platform: Some("Linux".to_string()),
            category: None,
            tags: Some("search,text".to_string()),
            variations_json: Some(
                r#"[{"syntax":"grep -rn foo .","description":"Recursive","isPrimary":true}]"#
                    .to_string(),
            ),
            version: Some(4),
        };

        let entry = row.into_entry().unwrap();
        assert_eq!(entry.category, "");
        assert_eq!(entry.tags, vec!["search", "text"]);
        assert_eq!(entry.version, 4);
        assert_eq!(
            entry.variations,
            vec![Variation::new("grep -rn foo .", "Recursive").primary()]
        );
    }
}
