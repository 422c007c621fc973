//! Query predicates in the SODA query-by-example format.
//!
//! A predicate maps a field path such as `geometry.coordinates[2]` to a
//! comparator, and is sent as the body of an `action=query` request:
//!
//! ```json
//! {
//!   "geometry.coordinates[0]": {"$between": [0, 255]},
//!   "geometry.coordinates[1]": {"$between": [0, 255]},
//!   "geometry.coordinates[2]": {"$eq": 0}
//! }
//! ```

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::models::METADATA_TYPE;

/// Edge length of a tile when the caller does not pick one.
pub const DEFAULT_TILE_SIZE: i64 = 256;

pub const FIELD_TYPE: &str = "type";
pub const FIELD_X: &str = "geometry.coordinates[0]";
pub const FIELD_Y: &str = "geometry.coordinates[1]";
pub const FIELD_Z: &str = "geometry.coordinates[2]";

/// Comparison applied to a single field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Comparator {
    #[serde(rename = "$eq")]
    Eq(Value),
    /// Inclusive on both ends.
    #[serde(rename = "$between")]
    Between(Value, Value),
}

/// A conjunction of field comparisons.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Predicate {
    fields: BTreeMap<String, Comparator>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality comparison on `field`
    pub fn equals(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), Comparator::Eq(value.into()));
        self
    }

    /// Add an inclusive range comparison on `field`
    pub fn between(
        mut self,
        field: impl Into<String>,
        lo: impl Into<Value>,
        hi: impl Into<Value>,
    ) -> Self {
        self.fields
            .insert(field.into(), Comparator::Between(lo.into(), hi.into()));
        self
    }

    /// Matches the metadata document of a collection
    pub fn metadata() -> Self {
        Self::new().equals(FIELD_TYPE, METADATA_TYPE)
    }

    /// Matches every feature stored at `z_layer`
    pub fn layer(z_layer: i64) -> Self {
        Self::new().equals(FIELD_Z, z_layer)
    }

    /// Matches features at `z_layer` inside `region`
    pub fn region(z_layer: i64, region: Region) -> Self {
        Self::layer(z_layer)
            .between(FIELD_X, region.x0, region.xf)
            .between(FIELD_Y, region.y0, region.yf)
    }

    /// Matches features at `z_layer` inside the square tile with origin (x0, y0)
    pub fn tile(z_layer: i64, x0: i64, y0: i64, tile_size: i64) -> Self {
        Self::region(z_layer, Region::tile(x0, y0, tile_size))
    }

    pub fn get(&self, field: &str) -> Option<&Comparator> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Inclusive bounding box in pixel coordinates.
///
/// (x0, y0) is the top left corner and (xf, yf) the bottom right one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x0: i64,
    pub y0: i64,
    pub xf: i64,
    pub yf: i64,
}

impl Region {
    pub fn new(x0: i64, y0: i64, xf: i64, yf: i64) -> Self {
        Self { x0, y0, xf, yf }
    }

    pub fn tile(x0: i64, y0: i64, tile_size: i64) -> Self {
        Self {
            x0,
            y0,
            xf: x0.saturating_add(tile_size.saturating_sub(1)),
            yf: y0.saturating_add(tile_size.saturating_sub(1)),
        }
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        (self.x0..=self.xf).contains(&x) && (self.y0..=self.yf).contains(&y)
    }
}
