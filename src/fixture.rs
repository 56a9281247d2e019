//! Throwaway Things database for tests.
//!
//! Layout:
//!
//! ```text
//! Home (A1, tag Errand)
//!   Renovate (P1)
//!     Kitchen (H1)
//!       Buy paint (T1, tags Errand+Important, checklist C1 C2)
//!     Garden (H2)
//!     Call plumber (T2)
//! Work (A2)
//!   Pay rent (T4, today, deadline 2023-11-20, tag Errand)
//! Inbox item (T3, created yesterday, notes mention dinner)
//! Learn piano (T5, someday)
//! Renew passport (T6, upcoming, deadline 2023-11-14)
//! Old errand (T7, completed 2023-11-03)
//! Dropped idea (T8, canceled 2023-09-18)
//! Trashed to-do (T9, trashed)
//! Abandoned (P2, trashed project) > Orphan (T10)
//! Water plants (R1, recurring template)
//! ```

use std::path::Path;

use rusqlite::Connection;
use tempfile::NamedTempFile;

use crate::api::Things;
use crate::db::Database;

const SCHEMA: &str = r#"
CREATE TABLE TMArea (
    uuid    TEXT PRIMARY KEY,
    title   TEXT,
    visible INTEGER,
    "index" INTEGER
);

CREATE TABLE TMTag (
    uuid     TEXT PRIMARY KEY,
    title    TEXT,
    shortcut TEXT,
    usedDate REAL,
    parent   TEXT,
    "index"  INTEGER
);

CREATE TABLE TMTask (
    uuid                 TEXT PRIMARY KEY,
    type                 INTEGER,
    trashed              INTEGER,
    title                TEXT,
    notes                TEXT,
    status               INTEGER,
    stopDate             REAL,
    creationDate         REAL,
    userModificationDate REAL,
    start                INTEGER,
    startDate            INTEGER,
    dueDate              INTEGER,
    "index"              INTEGER,
    todayIndex           INTEGER,
    area                 TEXT,
    project              TEXT,
    actionGroup          TEXT,
    recurrenceRule       BLOB
);

CREATE TABLE TMTaskTag (tasks TEXT, tags TEXT);

CREATE TABLE TMAreaTag (areas TEXT, tags TEXT);

CREATE TABLE TMChecklistItem (
    uuid                 TEXT PRIMARY KEY,
    title                TEXT,
    status               INTEGER,
    stopDate             REAL,
    creationDate         REAL,
    userModificationDate REAL,
    task                 TEXT,
    "index"              INTEGER
);

CREATE TABLE TMSettings (uuid TEXT PRIMARY KEY, uriSchemeAuthenticationToken TEXT);

CREATE TABLE Meta (key TEXT PRIMARY KEY, value TEXT);
"#;

const DATA: &str = r#"
INSERT INTO TMArea VALUES ('A1', 'Home', 1, 0), ('A2', 'Work', 1, 1);

INSERT INTO TMTag VALUES
    ('TG1', 'Errand', 'e', NULL, NULL, 0),
    ('TG2', 'Important', NULL, NULL, NULL, 1),
    ('TG3', 'Waiting', NULL, NULL, NULL, 2);

INSERT INTO TMTask
    (uuid, type, trashed, title, notes, status, stopDate, creationDate, userModificationDate,
     start, startDate, dueDate, "index", todayIndex, area, project, actionGroup, recurrenceRule)
VALUES
    ('P1', 1, 0, 'Renovate', '', 0, NULL, 1600000000, 1600000000, 1, NULL, NULL, 1, 0, 'A1', NULL, NULL, NULL),
    ('H1', 2, 0, 'Kitchen', '', 0, NULL, 1600000000, 1600000000, 1, NULL, NULL, 2, 0, NULL, 'P1', NULL, NULL),
    ('T1', 0, 0, 'Buy paint', '', 0, NULL, 1600000000, 1600000000, 1, NULL, NULL, 3, 0, NULL, NULL, 'H1', NULL),
    ('H2', 2, 0, 'Garden', '', 0, NULL, 1600000000, 1600000000, 1, NULL, NULL, 4, 0, NULL, 'P1', NULL, NULL),
    ('T2', 0, 0, 'Call plumber', '', 0, NULL, 1600000000, 1600000000, 1, NULL, NULL, 5, 0, NULL, 'P1', NULL, NULL),
    ('T3', 0, 0, 'Inbox item', 'remember the dinner', 0, NULL,
        CAST(strftime('%s', 'now') AS REAL) - 86400, CAST(strftime('%s', 'now') AS REAL) - 86400,
        0, NULL, NULL, 6, 0, NULL, NULL, NULL, NULL),
    ('T4', 0, 0, 'Pay rent', '', 0, NULL, 1600000000, 1600000000, 1, 1700000000, 1700500000, 7, 1, 'A2', NULL, NULL, NULL),
    ('T5', 0, 0, 'Learn piano', '', 0, NULL, 1600000000, 1600000000, 2, NULL, NULL, 8, 0, NULL, NULL, NULL, NULL),
    ('T6', 0, 0, 'Renew passport', '', 0, NULL, 1600000000, 1600000000, 2, 1800000000, 1700000000, 9, 0, NULL, NULL, NULL, NULL),
    ('T7', 0, 0, 'Old errand', '', 3, 1699000000, 1600000000, 1600000000, 1, NULL, NULL, 10, 0, NULL, NULL, NULL, NULL),
    ('T8', 0, 0, 'Dropped idea', '', 2, 1695000000, 1600000000, 1600000000, 1, NULL, NULL, 11, 0, NULL, NULL, NULL, NULL),
    ('T9', 0, 1, 'Trashed to-do', '', 0, NULL, 1600000000, 1600000000, 1, NULL, NULL, 12, 0, NULL, NULL, NULL, NULL),
    ('P2', 1, 1, 'Abandoned', '', 0, NULL, 1600000000, 1600000000, 1, NULL, NULL, 13, 0, NULL, NULL, NULL, NULL),
    ('T10', 0, 0, 'Orphan', '', 0, NULL, 1600000000, 1600000000, 1, NULL, NULL, 14, 0, NULL, 'P2', NULL, NULL),
    ('R1', 0, 0, 'Water plants', '', 0, NULL, 1600000000, 1600000000, 1, NULL, NULL, 15, 0, NULL, NULL, NULL, X'00');

INSERT INTO TMTaskTag VALUES ('T1', 'TG2'), ('T1', 'TG1'), ('T4', 'TG1');

INSERT INTO TMAreaTag VALUES ('A1', 'TG1');

INSERT INTO TMChecklistItem VALUES
    ('C2', 'Brushes', 3, 1690000000, 1600000000, 1600000000, 'T1', 1),
    ('C1', 'Primer', 0, NULL, 1600000000, 1600000000, 'T1', 0);

INSERT INTO TMSettings VALUES ('RhAzEf6qDxCD5PmnZVtBZR', 'secret-token');

INSERT INTO Meta VALUES ('databaseVersion',
    '<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<integer>26</integer>
</plist>
');
"#;

pub struct Fixture {
    file: NamedTempFile,
}

impl Fixture {
    pub fn new() -> Self {
        let file = NamedTempFile::new().unwrap();
        let conn = Connection::open(file.path()).unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(DATA).unwrap();
        drop(conn);
        Self { file }
    }

    /// Apply a write to the seeded file.
    pub fn execute(&self, sql: &str) {
        Connection::open(self.path())
            .unwrap()
            .execute_batch(sql)
            .unwrap();
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn things(&self) -> Things {
        Things::new(Database::at(self.path()))
    }
}
