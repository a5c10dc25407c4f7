//! Command catalog data model
//!
//! Catalog entries come from the remote snapshot and carry a version.
//! Custom entries are authored locally and are never version-tracked.

use serde::{Deserialize, Deserializer, Serialize};

/// Version reported for entries that never take part in catalog sync
pub const LOCAL_ONLY_VERSION: u32 = 0;

/// Version assigned to snapshot entries that omit one
pub const DEFAULT_ENTRY_VERSION: u32 = 1;

/// Id prefix reserved for user-authored entries
pub const CUSTOM_ID_PREFIX: &str = "custom-";

/// Platform and category given to entries built with [`NewCustomEntry::new`]
pub const CUSTOM_PLATFORM: &str = "custom";
pub const CUSTOM_CATEGORY: &str = "Custom";

const DEFAULT_CUSTOM_DESCRIPTION: &str = "Custom command";

/// One alternative syntax form of a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    pub syntax: String,

    #[serde(default)]
    pub description: String,

    /// Flags the default form shown first
    #[serde(default)]
    pub is_primary: bool,
}

impl Variation {
    pub fn new(syntax: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            syntax: syntax.into(),
            description: description.into(),
            is_primary: false,
        }
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }
}

/// A versioned entry of the remote command catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Stable primary key
    pub id: String,

    /// Display name, not unique across platforms
    pub name: String,

    #[serde(default)]
    pub platform: String,

    #[serde(default)]
    pub category: String,

    /// Accepts either a JSON array or a comma-separated string.
    ///
    /// Stored comma-joined, so a tag containing a comma comes back split,
    /// padding is trimmed and blank tags are dropped.
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,

    #[serde(default)]
    pub variations: Vec<Variation>,

    #[serde(default = "default_entry_version")]
    pub version: u32,
}

fn default_entry_version() -> u32 {
    DEFAULT_ENTRY_VERSION
}

impl CatalogEntry {
    /// The variation flagged primary, falling back to the first one
    pub fn primary_variation(&self) -> Option<&Variation> {
        primary_of(&self.variations)
    }

    /// Version as written to storage; a missing or zero version counts as 1
    pub fn effective_version(&self) -> u32 {
        self.version.max(DEFAULT_ENTRY_VERSION)
    }
}

/// A user-authored entry as stored in the custom table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomEntry {
    pub id: String,
    pub name: String,
    pub platform: String,
    pub category: String,
    pub tags: Vec<String>,
    pub variations: Vec<Variation>,

    /// Insertion time in Unix milliseconds
    pub created_at: i64,
}

impl CustomEntry {
    pub fn primary_variation(&self) -> Option<&Variation> {
        primary_of(&self.variations)
    }
}

/// A custom entry that has not been inserted yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomEntry {
    #[serde(default = "generate_custom_id")]
    pub id: String,

    pub name: String,

    #[serde(default = "default_custom_platform")]
    pub platform: String,

    #[serde(default = "default_custom_category")]
    pub category: String,

    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,

    pub variations: Vec<Variation>,
}

fn default_custom_platform() -> String {
    CUSTOM_PLATFORM.to_string()
}

fn default_custom_category() -> String {
    CUSTOM_CATEGORY.to_string()
}

/// Generate an id in the custom namespace
pub fn generate_custom_id() -> String {
    format!("{CUSTOM_ID_PREFIX}{}", uuid::Uuid::now_v7())
}

impl NewCustomEntry {
    /// Build a single-variation entry with a generated id
    pub fn new(name: &str, syntax: &str) -> Self {
        Self {
            id: generate_custom_id(),
            name: name.trim().to_string(),
            platform: default_custom_platform(),
            category: default_custom_category(),
            tags: Vec::new(),
            variations: vec![Variation::new(syntax.trim(), DEFAULT_CUSTOM_DESCRIPTION).primary()],
        }
    }

    /// Replace the description of the primary variation (blank keeps the default)
    pub fn with_description(mut self, description: &str) -> Self {
        let description = description.trim();
        if description.is_empty() {
            return self;
        }
        if let Some(variation) = self.variations.first_mut() {
            variation.description = description.to_string();
        }
        self
    }

    /// Set tags from user input such as `"script, custom, automation"`
    pub fn with_tags(mut self, tags: &str) -> Self {
        self.tags = split_tags(tags);
        self
    }

    /// Check the fields a stored entry must have
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("id must not be empty".to_string());
        }
        match self.id.strip_prefix(CUSTOM_ID_PREFIX) {
            Some(rest) if !rest.trim().is_empty() => {}
            _ => {
                return Err(format!(
                    "id '{}' must start with '{CUSTOM_ID_PREFIX}'",
                    self.id
                ))
            }
        }
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        if let Some(tag) = self.tags.iter().find(|t| t.contains(',')) {
            return Err(format!("tag '{tag}' must not contain a comma"));
        }
        if self.variations.is_empty() {
            return Err("at least one variation is required".to_string());
        }
        if self.variations.iter().any(|v| v.syntax.trim().is_empty()) {
            return Err("variation syntax must not be empty".to_string());
        }
        Ok(())
    }
}

/// Where a command in the merged view came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Catalog,
    Custom,
}

/// A row of the merged catalog + custom view handed to the UI layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub id: String,
    pub name: String,
    pub platform: String,
    pub category: String,
    pub tags: Vec<String>,
    pub variations: Vec<Variation>,
    pub version: u32,

    /// Serialized as the `isCustom` flag the UI keys on
    #[serde(rename = "isCustom", serialize_with = "serialize_is_custom")]
    pub origin: Origin,
}

fn serialize_is_custom<S>(origin: &Origin, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_bool(*origin == Origin::Custom)
}

impl Command {
    pub fn is_custom(&self) -> bool {
        self.origin == Origin::Custom
    }

    pub fn primary_variation(&self) -> Option<&Variation> {
        primary_of(&self.variations)
    }
}

impl From<CatalogEntry> for Command {
    fn from(entry: CatalogEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            platform: entry.platform,
            category: entry.category,
            tags: entry.tags,
            variations: entry.variations,
            version: entry.version,
            origin: Origin::Catalog,
        }
    }
}

impl From<CustomEntry> for Command {
    fn from(entry: CustomEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            platform: entry.platform,
            category: entry.category,
            tags: entry.tags,
            variations: entry.variations,
            version: LOCAL_ONLY_VERSION,
            origin: Origin::Custom,
        }
    }
}

/// Remote pointer to the newest catalog snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteVersionDescriptor {
    pub latest_version: u32,
    pub data_url: String,
}

fn primary_of(variations: &[Variation]) -> Option<&Variation> {
    variations
        .iter()
        .find(|v| v.is_primary)
        .or_else(|| variations.first())
}

/// Split a comma-separated tag string, dropping blank segments
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Deserialize tags from either `["a", "b"]` or `"a,b"`
fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};

    struct TagsVisitor;

    impl<'de> Visitor<'de> for TagsVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("an array of strings or a comma-separated string")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(split_tags(value))
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut tags = Vec::new();
            while let Some(tag) = seq.next_element::<String>()? {
                tags.push(tag);
            }
            Ok(tags)
        }
    }

    deserializer.deserialize_any(TagsVisitor)
}
