pub const SCHEMA: &str = r#"
-- articles table
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    summary TEXT,
    link TEXT,
    img TEXT,
    saved INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_articles_saved_created ON articles(saved, created_at DESC);

-- notes table (the only link between notes and articles)
CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    article_id INTEGER NOT NULL REFERENCES articles(id),
    body TEXT NOT NULL,
    created_at TEXT NOT NULL,
    detached_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_notes_article_id ON notes(article_id);
"#;

/// Title uniqueness, applied after [`SCHEMA`] so that a store written before
/// the constraint existed still opens. Fails when such a store already holds
/// duplicate titles.
pub const TITLE_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_articles_title ON articles(title);";
