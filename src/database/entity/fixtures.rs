//! Test fixtures
//!
//! A small, fixed photo library: cameras, lenses, places, photos with files and
//! descriptions, albums, labels, keywords, an account and a share link. Rows are
//! inserted only when absent, so populating twice leaves the data unchanged.

use anyhow::{anyhow, Result};
use chrono::DateTime;
use rusqlite::types::Value;
use tracing::info;

use crate::database::core::{SchemaStore, SeedRow};

/// 2020-01-01T00:00:00Z, the creation time of every fixture row
const FIXTURE_EPOCH: i64 = 1_577_836_800;

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn timestamp(offset_secs: i64) -> Result<Value> {
    let ts = DateTime::from_timestamp(FIXTURE_EPOCH + offset_secs, 0)
        .ok_or_else(|| anyhow!("Invalid fixture timestamp offset {}", offset_secs))?;
    Ok(Value::Text(ts.to_rfc3339()))
}

fn camera(id: i64, slug: &str, make: &str, model: &str) -> Result<SeedRow> {
    Ok(SeedRow::new("cameras", "camera_slug")
        .with("id", id)
        .with("camera_slug", text(slug))
        .with("camera_make", text(make))
        .with("camera_model", text(model))
        .with("created_at", timestamp(0)?))
}

fn lens(id: i64, slug: &str, make: &str, model: &str) -> Result<SeedRow> {
    Ok(SeedRow::new("lenses", "lens_slug")
        .with("id", id)
        .with("lens_slug", text(slug))
        .with("lens_make", text(make))
        .with("lens_model", text(model))
        .with("created_at", timestamp(0)?))
}

struct PhotoFixture<'a> {
    id: i64,
    uuid: &'a str,
    title: &'a str,
    camera_id: i64,
    lens_id: i64,
    place: &'a str,
    country: &'a str,
}

fn photo(p: PhotoFixture<'_>) -> Result<SeedRow> {
    let PhotoFixture {
        id,
        uuid,
        title,
        camera_id,
        lens_id,
        place,
        country,
    } = p;
    let taken = timestamp((id % 1_000) * 86_400)?;
    Ok(SeedRow::new("photos", "photo_uuid")
        .with("id", id)
        .with("photo_uuid", text(uuid))
        .with("photo_title", text(title))
        .with("taken_at", taken.clone())
        .with("taken_at_local", taken)
        .with("taken_src", text("meta"))
        .with("photo_path", text("2020/01"))
        .with("photo_name", text(&format!("IMG_{:04}", id)))
        .with("camera_id", camera_id)
        .with("lens_id", lens_id)
        .with("place_id", text(place))
        .with("photo_country", text(country))
        .with("photo_year", 2020i64)
        .with("photo_month", 1i64)
        .with("created_at", timestamp(0)?))
}

fn file(id: i64, photo_id: i64, photo_uuid: &str, name: &str, primary: bool) -> Result<SeedRow> {
    Ok(SeedRow::new("files", "file_uuid")
        .with("id", id)
        .with("photo_id", photo_id)
        .with("photo_uuid", text(photo_uuid))
        .with("file_uuid", text(&format!("ft{:014}", id)))
        .with("file_name", text(name))
        .with("file_hash", text(&format!("{:040x}", id)))
        .with("file_size", 4_194_304i64)
        .with("file_type", text("jpg"))
        .with("file_mime", text("image/jpeg"))
        .with("file_primary", primary)
        .with("file_width", 4000i64)
        .with("file_height", 3000i64)
        .with("file_orientation", 1i64)
        .with("created_at", timestamp(0)?))
}

fn label(id: i64, uuid: &str, slug: &str, name: &str, priority: i64) -> Result<SeedRow> {
    Ok(SeedRow::new("labels", "label_slug")
        .with("id", id)
        .with("label_uuid", text(uuid))
        .with("label_slug", text(slug))
        .with("custom_slug", text(slug))
        .with("label_name", text(name))
        .with("label_priority", priority)
        .with("created_at", timestamp(0)?))
}

fn album(id: i64, uuid: &str, slug: &str, name: &str) -> Result<SeedRow> {
    Ok(SeedRow::new("albums", "album_uuid")
        .with("id", id)
        .with("album_uuid", text(uuid))
        .with("album_slug", text(slug))
        .with("album_name", text(name))
        .with("album_type", text("album"))
        .with("album_order", text("oldest"))
        .with("created_at", timestamp(0)?))
}

fn keyword(id: i64, word: &str) -> SeedRow {
    SeedRow::new("keywords", "keyword")
        .with("id", id)
        .with("keyword", text(word))
}

/// Row of a link table, identified by both of its columns
fn link(table: &'static str, a: (&'static str, Value), b: (&'static str, Value)) -> SeedRow {
    SeedRow::composite(table, &[a.0, b.0])
        .with(a.0, a.1)
        .with(b.0, b.1)
}

/// Every fixture row, in insertion order
pub fn fixture_rows() -> Result<Vec<SeedRow>> {
    let rows = vec![
        camera(1_000_000, "apple-iphone-se", "Apple", "iPhone SE")?,
        camera(1_000_001, "canon-eos-6d", "Canon", "EOS 6D")?,
        lens(
            1_000_000,
            "apple-iphone-se-back-camera-4-15mm-f-2-2",
            "Apple",
            "iPhone SE back camera 4.15mm f/2.2",
        )?,
        lens(1_000_001, "ef24-105mm-f-4l-is-usm", "Canon", "EF24-105mm f/4L IS USM")?,
        SeedRow::new("countries", "id")
            .with("id", text("de"))
            .with("country_slug", text("germany"))
            .with("country_name", text("Germany")),
        SeedRow::new("countries", "id")
            .with("id", text("za"))
            .with("country_slug", text("south-africa"))
            .with("country_name", text("South Africa")),
        SeedRow::new("places", "id")
            .with("id", text("de:berlin"))
            .with("loc_label", text("Berlin, Germany"))
            .with("loc_city", text("Berlin"))
            .with("loc_state", text("Berlin"))
            .with("loc_country", text("de"))
            .with("created_at", timestamp(0)?),
        SeedRow::new("places", "id")
            .with("id", text("za:cape-town"))
            .with("loc_label", text("Cape Town, South Africa"))
            .with("loc_city", text("Cape Town"))
            .with("loc_state", text("Western Cape"))
            .with("loc_country", text("za"))
            .with("created_at", timestamp(0)?),
        SeedRow::new("locations", "id")
            .with("id", text("1ef7443e1"))
            .with("place_id", text("de:berlin"))
            .with("loc_name", text("Brandenburger Tor"))
            .with("loc_category", text("monument"))
            .with("loc_source", text("places")),
        photo(PhotoFixture {
            id: 1_000_000,
            uuid: "pt9jtdre2lvl0yh7",
            title: "Lake / 2020",
            camera_id: 1_000_001,
            lens_id: 1_000_001,
            place: "de:berlin",
            country: "de",
        })?,
        photo(PhotoFixture {
            id: 1_000_001,
            uuid: "pt9jtdre2lvl0yh8",
            title: "Cake / 2020",
            camera_id: 1_000_000,
            lens_id: 1_000_000,
            place: "za:cape-town",
            country: "za",
        })?,
        photo(PhotoFixture {
            id: 1_000_002,
            uuid: "pt9jtdre2lvl0yh9",
            title: "Unknown / 2020",
            camera_id: 1,
            lens_id: 1,
            place: "zz",
            country: "zz",
        })?,
        SeedRow::new("descriptions", "photo_id")
            .with("photo_id", 1_000_000i64)
            .with("photo_description", text("Lake at sunset"))
            .with("photo_keywords", text("lake, sunset"))
            .with("photo_artist", text("Hans"))
            .with("photo_license", text("CC BY 4.0")),
        file(1_000_000, 1_000_000, "pt9jtdre2lvl0yh7", "2020/01/IMG_1000000.jpg", true)?,
        file(1_000_001, 1_000_001, "pt9jtdre2lvl0yh8", "2020/01/IMG_1000001.jpg", true)?,
        file(1_000_002, 1_000_002, "pt9jtdre2lvl0yh9", "2020/01/IMG_1000002.jpg", true)?,
        file(1_000_003, 1_000_000, "pt9jtdre2lvl0yh7", "2020/01/IMG_1000000.xmp", false)?,
        label(1_000_000, "lt9k3pw1wowuy3c2", "landscape", "Landscape", 0)?,
        label(1_000_001, "lt9k3pw1wowuy3c3", "cake", "Cake", 5)?,
        label(1_000_002, "lt9k3pw1wowuy3c4", "lake", "Lake", 0)?,
        link(
            "categories",
            ("label_id", Value::Integer(1_000_002)),
            ("category_id", Value::Integer(1_000_000)),
        ),
        link(
            "photos_labels",
            ("photo_id", Value::Integer(1_000_000)),
            ("label_id", Value::Integer(1_000_002)),
        ),
        link(
            "photos_labels",
            ("photo_id", Value::Integer(1_000_001)),
            ("label_id", Value::Integer(1_000_001)),
        ),
        keyword(1_000_000, "lake"),
        keyword(1_000_001, "sunset"),
        keyword(1_000_002, "cake"),
        link(
            "photos_keywords",
            ("photo_id", Value::Integer(1_000_000)),
            ("keyword_id", Value::Integer(1_000_000)),
        ),
        link(
            "photos_keywords",
            ("photo_id", Value::Integer(1_000_000)),
            ("keyword_id", Value::Integer(1_000_001)),
        ),
        link(
            "photos_keywords",
            ("photo_id", Value::Integer(1_000_001)),
            ("keyword_id", Value::Integer(1_000_002)),
        ),
        album(1_000_000, "at9lxuqxpogaaba7", "christmas2030", "Christmas 2030")?,
        album(1_000_001, "at9lxuqxpogaaba8", "holiday-2030", "Holiday 2030")?,
        link(
            "photos_albums",
            ("album_uuid", text("at9lxuqxpogaaba7")),
            ("photo_uuid", text("pt9jtdre2lvl0yh7")),
        ),
        link(
            "photos_albums",
            ("album_uuid", text("at9lxuqxpogaaba8")),
            ("photo_uuid", text("pt9jtdre2lvl0yh8")),
        ),
        SeedRow::new("accounts", "id")
            .with("id", 1_000_000i64)
            .with("acc_name", text("Test Account"))
            .with("acc_owner", text("Admin"))
            .with("acc_url", text("http://webdav-dummy/"))
            .with("acc_type", text("webdav"))
            .with("acc_share", true)
            .with("acc_sync", true)
            .with("share_path", text("/Photos"))
            .with("sync_path", text("/Photos"))
            .with("sync_interval", 3600i64)
            .with("created_at", timestamp(0)?),
        SeedRow::new("files_share", "remote_name")
            .with("file_id", 1_000_000i64)
            .with("account_id", 1_000_000i64)
            .with("remote_name", text("/Photos/IMG_1000000.jpg"))
            .with("status", text("shared")),
        SeedRow::new("files_sync", "remote_name")
            .with("remote_name", text("/Photos/IMG_1000001.jpg"))
            .with("account_id", 1_000_000i64)
            .with("file_id", 1_000_001i64)
            .with("remote_size", 4_194_304i64)
            .with("status", text("downloaded")),
        SeedRow::new("links", "link_token")
            .with("link_token", text("1jxf3jfn2k"))
            .with("share_uuid", text("at9lxuqxpogaaba7"))
            .with("can_comment", true)
            .with("created_at", timestamp(0)?),
    ];

    Ok(rows)
}

/// Insert the full fixture set; returns the number of rows inserted
pub fn create_test_fixtures<S: SchemaStore + ?Sized>(store: &S) -> Result<usize> {
    let mut inserted = 0;
    for row in fixture_rows()? {
        if store.insert_if_absent(&row)? {
            inserted += 1;
        }
    }
    info!("entity: inserted {} fixture rows", inserted);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::core::DatabaseConn;
    use crate::database::entity::provisioner::TableProvisioner;
    use crate::database::entity::registry::EntityRegistry;

    fn migrated_db() -> DatabaseConn {
        let db = DatabaseConn::open_in_memory().unwrap();
        TableProvisioner::new(&db, EntityRegistry::entities())
            .create_all()
            .unwrap();
        db
    }

    #[test]
    fn test_fixture_rows_target_registered_tables() {
        let registry = EntityRegistry::entities();
        for row in fixture_rows().unwrap() {
            let table = registry.get(row.table).unwrap();
            for (column, _) in &row.values {
                assert!(
                    table.schema.column(column).is_some(),
                    "{}.{} is not a column",
                    row.table,
                    column
                );
            }
        }
    }

    #[test]
    fn test_create_test_fixtures() {
        let db = migrated_db();
        let total = fixture_rows().unwrap().len();

        assert_eq!(create_test_fixtures(&db).unwrap(), total);
        assert_eq!(db.table_count("photos").unwrap(), 3);
        assert_eq!(db.table_count("cameras").unwrap(), 2);
        assert_eq!(db.table_count("photos_keywords").unwrap(), 3);
    }

    #[test]
    fn test_create_test_fixtures_twice() {
        let db = migrated_db();

        create_test_fixtures(&db).unwrap();
        assert_eq!(create_test_fixtures(&db).unwrap(), 0);
        assert_eq!(db.table_count("photos").unwrap(), 3);
    }

    #[test]
    fn test_fixture_rows_have_keys() {
        for row in fixture_rows().unwrap() {
            assert!(row.key_values().is_some(), "{} row has no key", row.table);
        }
    }

    #[test]
    fn test_fixture_timestamps() {
        assert_eq!(
            timestamp(0).unwrap(),
            Value::Text("2020-01-01T00:00:00+00:00".to_string())
        );
    }
}
