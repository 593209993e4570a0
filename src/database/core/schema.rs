//! Database schema definitions
//!
//! This module provides the table schemas for every entity the photo library stores.
//! Each table is described by a static [`TableSchema`] (columns, table constraints and
//! indexes) paired with its logical name in a [`TableDescriptor`].

/// A single column of a table schema
///
/// `decl` is everything after the column name in a SQLite column definition,
/// e.g. `TEXT NOT NULL DEFAULT ''`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub decl: &'static str,
}

/// An index over one or more columns of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDef {
    /// Suffix of the index name; the full name is `idx_{table}_{suffix}`
    pub suffix: &'static str,
    pub columns: &'static str,
    pub unique: bool,
}

/// Schema-producing definition of an entity table
#[derive(Debug, PartialEq, Eq)]
pub struct TableSchema {
    pub columns: &'static [ColumnDef],
    /// Table-level constraints such as composite primary keys
    pub constraints: &'static [&'static str],
    pub indexes: &'static [IndexDef],
}

/// Static pairing of a logical table name with its schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDescriptor {
    pub name: &'static str,
    pub schema: &'static TableSchema,
}

const fn col(name: &'static str, decl: &'static str) -> ColumnDef {
    ColumnDef { name, decl }
}

const fn index(suffix: &'static str, columns: &'static str) -> IndexDef {
    IndexDef {
        suffix,
        columns,
        unique: false,
    }
}

const fn unique(suffix: &'static str, columns: &'static str) -> IndexDef {
    IndexDef {
        suffix,
        columns,
        unique: true,
    }
}

/// Quote an identifier for use in SQL statements
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl TableSchema {
    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// SQL creating the table under the given name if it does not exist
    pub fn create_sql(&self, table: &str) -> String {
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(c.name), c.decl))
            .collect();
        parts.extend(self.constraints.iter().map(|c| c.to_string()));

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            quote_ident(table),
            parts.join(",\n    ")
        )
    }

    /// SQL creating every index of the table if it does not exist
    pub fn index_sql(&self, table: &str) -> Vec<String> {
        self.indexes
            .iter()
            .map(|idx| {
                format!(
                    "CREATE {}INDEX IF NOT EXISTS {} ON {} ({})",
                    if idx.unique { "UNIQUE " } else { "" },
                    quote_ident(&format!("idx_{}_{}", table, idx.suffix)),
                    quote_ident(table),
                    idx.columns
                )
            })
            .collect()
    }

    /// SQL adding a column that is missing from an existing table
    ///
    /// Existing rows need a value for `NOT NULL` columns, so a declaration
    /// without a default gets `0` or `''` depending on its type.
    pub fn add_column_sql(table: &str, column: &ColumnDef) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            quote_ident(table),
            quote_ident(column.name),
            column.add_decl()
        )
    }
}

impl ColumnDef {
    /// Declaration usable in `ALTER TABLE ... ADD COLUMN`
    pub fn add_decl(&self) -> String {
        let decl = self.decl.to_ascii_uppercase();
        if !decl.contains("NOT NULL") || decl.contains("DEFAULT") || decl.contains("PRIMARY KEY")
        {
            return self.decl.to_string();
        }

        let numeric = ["INT", "REAL", "FLOA", "DOUB", "NUMERIC", "BOOL"]
            .iter()
            .any(|affinity| decl.split_whitespace().next().unwrap_or("").contains(affinity));
        format!("{} DEFAULT {}", self.decl, if numeric { "0" } else { "''" })
    }
}

impl TableDescriptor {
    pub fn create_sql(&self) -> String {
        self.schema.create_sql(self.name)
    }

    pub fn index_sql(&self) -> Vec<String> {
        self.schema.index_sql(self.name)
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", quote_ident(self.name))
    }
}

/// Schema definitions for all entity tables
pub struct SchemaDefinitions;

impl SchemaDefinitions {
    pub const ACCOUNTS: TableSchema = TableSchema {
        columns: &[
            col("id", "INTEGER PRIMARY KEY AUTOINCREMENT"),
            col("acc_name", "TEXT NOT NULL DEFAULT ''"),
            col("acc_owner", "TEXT NOT NULL DEFAULT ''"),
            col("acc_url", "TEXT NOT NULL DEFAULT ''"),
            col("acc_type", "TEXT NOT NULL DEFAULT ''"),
            col("acc_key", "TEXT NOT NULL DEFAULT ''"),
            col("acc_user", "TEXT NOT NULL DEFAULT ''"),
            col("acc_pass", "TEXT NOT NULL DEFAULT ''"),
            col("acc_error", "TEXT NOT NULL DEFAULT ''"),
            col("acc_share", "INTEGER NOT NULL DEFAULT 0"),
            col("acc_sync", "INTEGER NOT NULL DEFAULT 0"),
            col("retry_limit", "INTEGER NOT NULL DEFAULT 3"),
            col("share_path", "TEXT NOT NULL DEFAULT ''"),
            col("sync_path", "TEXT NOT NULL DEFAULT ''"),
            col("sync_interval", "INTEGER NOT NULL DEFAULT 0"),
            col("created_at", "TEXT"),
            col("updated_at", "TEXT"),
            col("deleted_at", "TEXT"),
        ],
        constraints: &[],
        indexes: &[index("deleted_at", "deleted_at")],
    };

    pub const FILES: TableSchema = TableSchema {
        columns: &[
            col("id", "INTEGER PRIMARY KEY AUTOINCREMENT"),
            col("photo_id", "INTEGER NOT NULL DEFAULT 0"),
            col("photo_uuid", "TEXT NOT NULL DEFAULT ''"),
            col("file_uuid", "TEXT NOT NULL"),
            col("file_name", "TEXT NOT NULL DEFAULT ''"),
            col("file_root", "TEXT NOT NULL DEFAULT '/'"),
            col("original_name", "TEXT NOT NULL DEFAULT ''"),
            col("file_hash", "TEXT NOT NULL DEFAULT ''"),
            col("file_size", "INTEGER NOT NULL DEFAULT 0"),
            col("file_type", "TEXT NOT NULL DEFAULT ''"),
            col("file_mime", "TEXT NOT NULL DEFAULT ''"),
            col("file_primary", "INTEGER NOT NULL DEFAULT 0"),
            col("file_sidecar", "INTEGER NOT NULL DEFAULT 0"),
            col("file_missing", "INTEGER NOT NULL DEFAULT 0"),
            col("file_width", "INTEGER NOT NULL DEFAULT 0"),
            col("file_height", "INTEGER NOT NULL DEFAULT 0"),
            col("file_orientation", "INTEGER NOT NULL DEFAULT 0"),
            col("created_at", "TEXT"),
            col("updated_at", "TEXT"),
            col("deleted_at", "TEXT"),
        ],
        constraints: &[],
        indexes: &[
            unique("file_uuid", "file_uuid"),
            index("photo_id", "photo_id"),
            index("file_hash", "file_hash"),
            index("deleted_at", "deleted_at"),
        ],
    };

    pub const FILES_SHARE: TableSchema = TableSchema {
        columns: &[
            col("file_id", "INTEGER NOT NULL"),
            col("account_id", "INTEGER NOT NULL"),
            col("remote_name", "TEXT NOT NULL"),
            col("status", "TEXT NOT NULL DEFAULT ''"),
            col("error", "TEXT NOT NULL DEFAULT ''"),
            col("errors", "INTEGER NOT NULL DEFAULT 0"),
            col("created_at", "TEXT"),
            col("updated_at", "TEXT"),
        ],
        constraints: &["PRIMARY KEY (file_id, account_id, remote_name)"],
        indexes: &[],
    };

    pub const FILES_SYNC: TableSchema = TableSchema {
        columns: &[
            col("remote_name", "TEXT NOT NULL"),
            col("account_id", "INTEGER NOT NULL"),
            col("file_id", "INTEGER NOT NULL DEFAULT 0"),
            col("remote_date", "TEXT"),
            col("remote_size", "INTEGER NOT NULL DEFAULT 0"),
            col("status", "TEXT NOT NULL DEFAULT ''"),
            col("error", "TEXT NOT NULL DEFAULT ''"),
            col("errors", "INTEGER NOT NULL DEFAULT 0"),
            col("created_at", "TEXT"),
            col("updated_at", "TEXT"),
        ],
        constraints: &["PRIMARY KEY (remote_name, account_id)"],
        indexes: &[index("file_id", "file_id")],
    };

    pub const PHOTOS: TableSchema = TableSchema {
        columns: &[
            col("id", "INTEGER PRIMARY KEY AUTOINCREMENT"),
            col("photo_uuid", "TEXT NOT NULL"),
            col("taken_at", "TEXT"),
            col("taken_at_local", "TEXT"),
            col("taken_src", "TEXT NOT NULL DEFAULT ''"),
            col("photo_title", "TEXT NOT NULL DEFAULT ''"),
            col("title_src", "TEXT NOT NULL DEFAULT ''"),
            col("photo_path", "TEXT NOT NULL DEFAULT ''"),
            col("photo_name", "TEXT NOT NULL DEFAULT ''"),
            col("photo_quality", "INTEGER NOT NULL DEFAULT 0"),
            col("photo_favorite", "INTEGER NOT NULL DEFAULT 0"),
            col("photo_private", "INTEGER NOT NULL DEFAULT 0"),
            col("photo_lat", "REAL NOT NULL DEFAULT 0"),
            col("photo_lng", "REAL NOT NULL DEFAULT 0"),
            col("photo_altitude", "INTEGER NOT NULL DEFAULT 0"),
            col("photo_iso", "INTEGER NOT NULL DEFAULT 0"),
            col("photo_focal_length", "INTEGER NOT NULL DEFAULT 0"),
            col("photo_f_number", "REAL NOT NULL DEFAULT 0"),
            col("photo_exposure", "TEXT NOT NULL DEFAULT ''"),
            col("camera_id", "INTEGER NOT NULL DEFAULT 1"),
            col("camera_serial", "TEXT NOT NULL DEFAULT ''"),
            col("lens_id", "INTEGER NOT NULL DEFAULT 1"),
            col("place_id", "TEXT NOT NULL DEFAULT 'zz'"),
            col("location_id", "TEXT NOT NULL DEFAULT ''"),
            col("photo_country", "TEXT NOT NULL DEFAULT 'zz'"),
            col("photo_year", "INTEGER NOT NULL DEFAULT 0"),
            col("photo_month", "INTEGER NOT NULL DEFAULT 0"),
            col("created_at", "TEXT"),
            col("updated_at", "TEXT"),
            col("deleted_at", "TEXT"),
        ],
        constraints: &[],
        indexes: &[
            unique("photo_uuid", "photo_uuid"),
            index("taken_at", "taken_at"),
            index("camera_id", "camera_id"),
            index("lens_id", "lens_id"),
            index("place_id", "place_id"),
            index("photo_country", "photo_country"),
            index("year_month", "photo_year, photo_month"),
            index("deleted_at", "deleted_at"),
        ],
    };

    pub const DESCRIPTIONS: TableSchema = TableSchema {
        columns: &[
            col("photo_id", "INTEGER PRIMARY KEY"),
            col("photo_description", "TEXT NOT NULL DEFAULT ''"),
            col("photo_keywords", "TEXT NOT NULL DEFAULT ''"),
            col("photo_notes", "TEXT NOT NULL DEFAULT ''"),
            col("photo_subject", "TEXT NOT NULL DEFAULT ''"),
            col("photo_artist", "TEXT NOT NULL DEFAULT ''"),
            col("photo_copyright", "TEXT NOT NULL DEFAULT ''"),
            col("photo_license", "TEXT NOT NULL DEFAULT ''"),
        ],
        constraints: &[],
        indexes: &[],
    };

    pub const PLACES: TableSchema = TableSchema {
        columns: &[
            col("id", "TEXT PRIMARY KEY"),
            col("loc_label", "TEXT NOT NULL DEFAULT ''"),
            col("loc_city", "TEXT NOT NULL DEFAULT ''"),
            col("loc_state", "TEXT NOT NULL DEFAULT ''"),
            col("loc_country", "TEXT NOT NULL DEFAULT 'zz'"),
            col("loc_keywords", "TEXT NOT NULL DEFAULT ''"),
            col("loc_notes", "TEXT NOT NULL DEFAULT ''"),
            col("loc_favorite", "INTEGER NOT NULL DEFAULT 0"),
            col("created_at", "TEXT"),
            col("updated_at", "TEXT"),
        ],
        constraints: &[],
        indexes: &[unique("loc_label", "loc_label")],
    };

    pub const LOCATIONS: TableSchema = TableSchema {
        columns: &[
            col("id", "TEXT PRIMARY KEY"),
            col("place_id", "TEXT NOT NULL DEFAULT 'zz'"),
            col("loc_name", "TEXT NOT NULL DEFAULT ''"),
            col("loc_category", "TEXT NOT NULL DEFAULT ''"),
            col("loc_source", "TEXT NOT NULL DEFAULT ''"),
            col("created_at", "TEXT"),
            col("updated_at", "TEXT"),
        ],
        constraints: &[],
        indexes: &[index("place_id", "place_id")],
    };

    pub const CAMERAS: TableSchema = TableSchema {
        columns: &[
            col("id", "INTEGER PRIMARY KEY AUTOINCREMENT"),
            col("camera_slug", "TEXT NOT NULL"),
            col("camera_model", "TEXT NOT NULL DEFAULT ''"),
            col("camera_make", "TEXT NOT NULL DEFAULT ''"),
            col("camera_type", "TEXT NOT NULL DEFAULT ''"),
            col("camera_description", "TEXT NOT NULL DEFAULT ''"),
            col("camera_notes", "TEXT NOT NULL DEFAULT ''"),
            col("created_at", "TEXT"),
            col("updated_at", "TEXT"),
            col("deleted_at", "TEXT"),
        ],
        constraints: &[],
        indexes: &[
            unique("camera_slug", "camera_slug"),
            index("deleted_at", "deleted_at"),
        ],
    };

    pub const LENSES: TableSchema = TableSchema {
        columns: &[
            col("id", "INTEGER PRIMARY KEY AUTOINCREMENT"),
            col("lens_slug", "TEXT NOT NULL"),
            col("lens_model", "TEXT NOT NULL DEFAULT ''"),
            col("lens_make", "TEXT NOT NULL DEFAULT ''"),
            col("lens_type", "TEXT NOT NULL DEFAULT ''"),
            col("lens_description", "TEXT NOT NULL DEFAULT ''"),
            col("lens_notes", "TEXT NOT NULL DEFAULT ''"),
            col("created_at", "TEXT"),
            col("updated_at", "TEXT"),
            col("deleted_at", "TEXT"),
        ],
        constraints: &[],
        indexes: &[
            unique("lens_slug", "lens_slug"),
            index("deleted_at", "deleted_at"),
        ],
    };

    pub const COUNTRIES: TableSchema = TableSchema {
        columns: &[
            col("id", "TEXT PRIMARY KEY"),
            col("country_slug", "TEXT NOT NULL"),
            col("country_name", "TEXT NOT NULL DEFAULT ''"),
            col("country_description", "TEXT NOT NULL DEFAULT ''"),
            col("country_notes", "TEXT NOT NULL DEFAULT ''"),
            col("country_photo_id", "INTEGER NOT NULL DEFAULT 0"),
        ],
        constraints: &[],
        indexes: &[unique("country_slug", "country_slug")],
    };

    pub const ALBUMS: TableSchema = TableSchema {
        columns: &[
            col("id", "INTEGER PRIMARY KEY AUTOINCREMENT"),
            col("album_uuid", "TEXT NOT NULL"),
            col("cover_uuid", "TEXT NOT NULL DEFAULT ''"),
            col("album_slug", "TEXT NOT NULL DEFAULT ''"),
            col("album_name", "TEXT NOT NULL DEFAULT ''"),
            col("album_type", "TEXT NOT NULL DEFAULT ''"),
            col("album_filter", "TEXT NOT NULL DEFAULT ''"),
            col("album_description", "TEXT NOT NULL DEFAULT ''"),
            col("album_notes", "TEXT NOT NULL DEFAULT ''"),
            col("album_order", "TEXT NOT NULL DEFAULT ''"),
            col("album_favorite", "INTEGER NOT NULL DEFAULT 0"),
            col("created_at", "TEXT"),
            col("updated_at", "TEXT"),
            col("deleted_at", "TEXT"),
        ],
        constraints: &[],
        indexes: &[
            unique("album_uuid", "album_uuid"),
            index("album_slug", "album_slug"),
            index("deleted_at", "deleted_at"),
        ],
    };

    pub const PHOTOS_ALBUMS: TableSchema = TableSchema {
        columns: &[
            col("photo_uuid", "TEXT NOT NULL"),
            col("album_uuid", "TEXT NOT NULL"),
            col("ord", "INTEGER NOT NULL DEFAULT 0"),
            col("hidden", "INTEGER NOT NULL DEFAULT 0"),
            col("created_at", "TEXT"),
            col("updated_at", "TEXT"),
        ],
        constraints: &["PRIMARY KEY (photo_uuid, album_uuid)"],
        indexes: &[index("album_uuid", "album_uuid")],
    };

    pub const LABELS: TableSchema = TableSchema {
        columns: &[
            col("id", "INTEGER PRIMARY KEY AUTOINCREMENT"),
            col("label_uuid", "TEXT NOT NULL"),
            col("label_slug", "TEXT NOT NULL"),
            col("custom_slug", "TEXT NOT NULL DEFAULT ''"),
            col("label_name", "TEXT NOT NULL DEFAULT ''"),
            col("label_priority", "INTEGER NOT NULL DEFAULT 0"),
            col("label_favorite", "INTEGER NOT NULL DEFAULT 0"),
            col("label_description", "TEXT NOT NULL DEFAULT ''"),
            col("label_notes", "TEXT NOT NULL DEFAULT ''"),
            col("photo_count", "INTEGER NOT NULL DEFAULT 1"),
            col("created_at", "TEXT"),
            col("updated_at", "TEXT"),
            col("deleted_at", "TEXT"),
        ],
        constraints: &[],
        indexes: &[
            unique("label_uuid", "label_uuid"),
            unique("label_slug", "label_slug"),
            index("custom_slug", "custom_slug"),
            index("deleted_at", "deleted_at"),
        ],
    };

    pub const CATEGORIES: TableSchema = TableSchema {
        columns: &[
            col("label_id", "INTEGER NOT NULL"),
            col("category_id", "INTEGER NOT NULL"),
        ],
        constraints: &["PRIMARY KEY (label_id, category_id)"],
        indexes: &[],
    };

    pub const PHOTOS_LABELS: TableSchema = TableSchema {
        columns: &[
            col("photo_id", "INTEGER NOT NULL"),
            col("label_id", "INTEGER NOT NULL"),
            col("label_src", "TEXT NOT NULL DEFAULT ''"),
            col("uncertainty", "INTEGER NOT NULL DEFAULT 0"),
        ],
        constraints: &["PRIMARY KEY (photo_id, label_id)"],
        indexes: &[index("label_id", "label_id")],
    };

    pub const KEYWORDS: TableSchema = TableSchema {
        columns: &[
            col("id", "INTEGER PRIMARY KEY AUTOINCREMENT"),
            col("keyword", "TEXT NOT NULL"),
            col("skip", "INTEGER NOT NULL DEFAULT 0"),
        ],
        constraints: &[],
        indexes: &[index("keyword", "keyword")],
    };

    pub const PHOTOS_KEYWORDS: TableSchema = TableSchema {
        columns: &[
            col("photo_id", "INTEGER NOT NULL"),
            col("keyword_id", "INTEGER NOT NULL"),
        ],
        constraints: &["PRIMARY KEY (photo_id, keyword_id)"],
        indexes: &[index("keyword_id", "keyword_id")],
    };

    pub const LINKS: TableSchema = TableSchema {
        columns: &[
            col("link_token", "TEXT PRIMARY KEY"),
            col("link_password", "TEXT NOT NULL DEFAULT ''"),
            col("link_expires", "TEXT"),
            col("share_uuid", "TEXT NOT NULL DEFAULT ''"),
            col("can_comment", "INTEGER NOT NULL DEFAULT 0"),
            col("can_edit", "INTEGER NOT NULL DEFAULT 0"),
            col("created_at", "TEXT"),
            col("updated_at", "TEXT"),
        ],
        constraints: &[],
        indexes: &[index("share_uuid", "share_uuid")],
    };

    /// Every entity table and its logical name
    pub const TABLES: &'static [TableDescriptor] = &[
        TableDescriptor {
            name: "accounts",
            schema: &Self::ACCOUNTS,
        },
        TableDescriptor {
            name: "files",
            schema: &Self::FILES,
        },
        TableDescriptor {
            name: "files_share",
            schema: &Self::FILES_SHARE,
        },
        TableDescriptor {
            name: "files_sync",
            schema: &Self::FILES_SYNC,
        },
        TableDescriptor {
            name: "photos",
            schema: &Self::PHOTOS,
        },
        TableDescriptor {
            name: "descriptions",
            schema: &Self::DESCRIPTIONS,
        },
        TableDescriptor {
            name: "places",
            schema: &Self::PLACES,
        },
        TableDescriptor {
            name: "locations",
            schema: &Self::LOCATIONS,
        },
        TableDescriptor {
            name: "cameras",
            schema: &Self::CAMERAS,
        },
        TableDescriptor {
            name: "lenses",
            schema: &Self::LENSES,
        },
        TableDescriptor {
            name: "countries",
            schema: &Self::COUNTRIES,
        },
        TableDescriptor {
            name: "albums",
            schema: &Self::ALBUMS,
        },
        TableDescriptor {
            name: "photos_albums",
            schema: &Self::PHOTOS_ALBUMS,
        },
        TableDescriptor {
            name: "labels",
            schema: &Self::LABELS,
        },
        TableDescriptor {
            name: "categories",
            schema: &Self::CATEGORIES,
        },
        TableDescriptor {
            name: "photos_labels",
            schema: &Self::PHOTOS_LABELS,
        },
        TableDescriptor {
            name: "keywords",
            schema: &Self::KEYWORDS,
        },
        TableDescriptor {
            name: "photos_keywords",
            schema: &Self::PHOTOS_KEYWORDS,
        },
        TableDescriptor {
            name: "links",
            schema: &Self::LINKS,
        },
    ];

    /// Look up the descriptor of a table by name
    pub fn table(name: &str) -> Option<TableDescriptor> {
        Self::TABLES.iter().find(|t| t.name == name).copied()
    }
}
