//! Default "unknown" rows
//!
//! Photos without a recognised place, country, camera or lens point at these
//! placeholder rows, so they must exist after every migration. Each constructor
//! inserts its row only when it is absent.

use anyhow::Result;

use crate::database::core::{SchemaStore, SeedRow};

/// Id and slug shared by the unknown place, country, camera and lens
pub const UNKNOWN_SLUG: &str = "zz";

/// Display name of every unknown placeholder
pub const UNKNOWN_NAME: &str = "Unknown";

/// Primary key of the unknown camera and lens
pub const UNKNOWN_ID: i64 = 1;

pub fn unknown_place() -> SeedRow {
    SeedRow::new("places", "id")
        .with("id", UNKNOWN_SLUG.to_string())
        .with("loc_label", UNKNOWN_NAME.to_string())
        .with("loc_city", UNKNOWN_NAME.to_string())
        .with("loc_state", UNKNOWN_NAME.to_string())
        .with("loc_country", UNKNOWN_SLUG.to_string())
}

pub fn unknown_country() -> SeedRow {
    SeedRow::new("countries", "id")
        .with("id", UNKNOWN_SLUG.to_string())
        .with("country_slug", UNKNOWN_SLUG.to_string())
        .with("country_name", UNKNOWN_NAME.to_string())
}

pub fn unknown_camera() -> SeedRow {
    SeedRow::new("cameras", "camera_slug")
        .with("id", UNKNOWN_ID)
        .with("camera_slug", UNKNOWN_SLUG.to_string())
        .with("camera_model", UNKNOWN_NAME.to_string())
        .with("camera_make", String::new())
}

pub fn unknown_lens() -> SeedRow {
    SeedRow::new("lenses", "lens_slug")
        .with("id", UNKNOWN_ID)
        .with("lens_slug", UNKNOWN_SLUG.to_string())
        .with("lens_model", UNKNOWN_NAME.to_string())
        .with("lens_make", String::new())
}

/// Every default row, in insertion order
pub fn default_rows() -> Vec<SeedRow> {
    vec![
        unknown_place(),
        unknown_country(),
        unknown_camera(),
        unknown_lens(),
    ]
}

pub fn create_unknown_place<S: SchemaStore + ?Sized>(store: &S) -> Result<bool> {
    store.insert_if_absent(&unknown_place())
}

pub fn create_unknown_country<S: SchemaStore + ?Sized>(store: &S) -> Result<bool> {
    store.insert_if_absent(&unknown_country())
}

pub fn create_unknown_camera<S: SchemaStore + ?Sized>(store: &S) -> Result<bool> {
    store.insert_if_absent(&unknown_camera())
}

pub fn create_unknown_lens<S: SchemaStore + ?Sized>(store: &S) -> Result<bool> {
    store.insert_if_absent(&unknown_lens())
}
