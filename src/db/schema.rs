//! Database schema and migrations for Inboxen.
//!
//! Migrations are applied in order the first time a database is opened or
//! upgraded; the schema_version table records which have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users, domains and inboxes
    r#"
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);

CREATE TABLE domains (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    domain      TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);

CREATE TABLE inboxes (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    inbox       TEXT NOT NULL,                  -- local part
    domain_id   INTEGER NOT NULL REFERENCES domains(id) ON DELETE CASCADE,
    user_id     INTEGER REFERENCES users(id) ON DELETE SET NULL,
    created_at  TEXT NOT NULL,
    flags       INTEGER NOT NULL DEFAULT 0,     -- InboxFlags bitmask
    description TEXT,
    UNIQUE(inbox, domain_id)
);

CREATE INDEX idx_inboxes_domain_id ON inboxes(domain_id);
CREATE INDEX idx_inboxes_user_id ON inboxes(user_id);
"#,
    // v2: content-addressed message storage
    r#"
CREATE TABLE bodies (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    hashed      TEXT NOT NULL UNIQUE,           -- "<algorithm>:<hex digest>"
    data        BLOB NOT NULL
);

CREATE TABLE header_data (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    hashed      TEXT NOT NULL UNIQUE,
    data        BLOB NOT NULL
);

CREATE TABLE header_names (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE
);

CREATE TABLE part_lists (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    body_id     INTEGER NOT NULL REFERENCES bodies(id),
    parent_id   INTEGER REFERENCES part_lists(id) ON DELETE CASCADE
);

CREATE TABLE headers (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    part_id     INTEGER NOT NULL REFERENCES part_lists(id) ON DELETE CASCADE,
    name_id     INTEGER NOT NULL REFERENCES header_names(id),
    data_id     INTEGER NOT NULL REFERENCES header_data(id),
    ordinal     INTEGER NOT NULL
);

CREATE INDEX idx_headers_part_id ON headers(part_id);
CREATE INDEX idx_part_lists_parent_id ON part_lists(parent_id);
"#,
];
