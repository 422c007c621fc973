use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `type` tag of a feature record
pub const FEATURE_TYPE: &str = "Feature";

/// `type` tag of the per-collection metadata document
pub const METADATA_TYPE: &str = "Metadata";

/// Feature represents one segmented object stored as a GeoJSON-like point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "default_feature_type")]
    pub kind: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: FeatureProperties,
}

fn default_feature_type() -> String {
    FEATURE_TYPE.to_string()
}

/// Geometry holds the pixel position and z-layer of a feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type", default = "default_geometry_type")]
    pub kind: String,
    /// `[x, y, z_layer]`
    pub coordinates: [i64; 3],
}

fn default_geometry_type() -> String {
    "Point".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    #[serde(default)]
    pub area: u64,
    #[serde(default)]
    pub perimeter: u64,
    /// Run-length encoded mask
    #[serde(default)]
    pub rle: String,
}

impl Feature {
    pub fn point(x: i64, y: i64, z_layer: i64, properties: FeatureProperties) -> Self {
        Self {
            kind: default_feature_type(),
            geometry: Geometry {
                kind: default_geometry_type(),
                coordinates: [x, y, z_layer],
            },
            properties,
        }
    }

    pub fn x(&self) -> i64 {
        self.geometry.coordinates[0]
    }

    pub fn y(&self) -> i64 {
        self.geometry.coordinates[1]
    }

    pub fn z_layer(&self) -> i64 {
        self.geometry.coordinates[2]
    }
}

/// MetadataDocument is the envelope a collection's metadata is stored in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataDocument {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: Value,
}

impl MetadataDocument {
    pub fn wrap(content: Value) -> Self {
        Self {
            kind: METADATA_TYPE.to_string(),
            content,
        }
    }
}

/// CollectionMetadata describes where the features of a collection came from
///
/// Only the fields the imaging pipeline writes are named here; anything else
/// is carried in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segmentation_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deduplication_method: Option<String>,
    /// Region of interest size as `[width, height]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi_size: Option<[i64; 2]>,
    /// Region of interest offset as `[x, y]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi_offset: Option<[i64; 2]>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// QueryResponse is the body of a SODA `action=query` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub items: Vec<QueryItem>,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// QueryItem is one matched document together with its store bookkeeping
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub etag: Option<String>,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub value: Value,
}

/// QueryPage is one page of a paginated query, already unwrapped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPage {
    /// Offset the page was requested at
    pub offset: usize,
    /// Number of documents the store reported for this page
    pub count: usize,
    pub has_more: bool,
    pub items: Vec<Value>,
}

impl QueryResponse {
    pub fn into_page(self, offset: usize) -> QueryPage {
        QueryPage {
            offset,
            count: self.count,
            has_more: self.has_more,
            items: self.items.into_iter().map(|item| item.value).collect(),
        }
    }
}

impl QueryPage {
    /// Offset of the page that follows this one
    pub fn next_offset(&self) -> usize {
        self.offset + self.count
    }

    /// Whether another page should be requested
    ///
    /// An empty page ends pagination even when the store claims there is more,
    /// otherwise the offset would never advance.
    pub fn has_next(&self) -> bool {
        self.has_more && self.count > 0
    }
}

/// CollectionListing is the body of a `GET <user>/soda/latest` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionListing {
    #[serde(default)]
    pub items: Vec<CollectionInfo>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    #[serde(default)]
    pub properties: Value,
}

impl CollectionListing {
    pub fn names(&self) -> Vec<String> {
        self.items.iter().map(|c| c.name.clone()).collect()
    }
}
