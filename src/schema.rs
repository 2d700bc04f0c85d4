pub const SCHEMA_VERSION: u32 = 1;

pub const META_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS Tunedb (
    key TEXT PRIMARY KEY,
    value);
";

pub const TUNE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS Tune (
    tune_id INTEGER PRIMARY KEY AUTOINCREMENT,
    book INTEGER,
    file_path TEXT NOT NULL,
    x INTEGER,
    title TEXT,
    rhythm TEXT,
    meter TEXT,
    key TEXT,
    raw_text TEXT NOT NULL);

CREATE INDEX IF NOT EXISTS Tune_book ON Tune (book);
";
