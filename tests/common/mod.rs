use serde_json::json;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Long, unambiguous fixture texts so language identification is stable.
pub const ENGLISH_TEXT: &str = "The senate passed a sweeping technology bill today and analysts \
     expect the measure to reshape the industry for years to come, with both parties claiming \
     credit for the compromise that made the vote possible";
pub const SPANISH_TEXT: &str = "La economía del país creció durante el último trimestre según el \
     informe oficial, aunque los precios de los alimentos también subieron y el gobierno anunció \
     nuevas ayudas para las familias más afectadas";
pub const GERMAN_TEXT: &str = "Die Regierung hat heute ein neues Gesetz verabschiedet und viele \
     Bürger sind damit überhaupt nicht zufrieden, weil die Steuern schon wieder deutlich erhöht \
     werden sollen";

/// Write a compressed `.zst` file containing the provided JSONL lines.
/// Mirrors the corpus's monthly submission dumps but with tiny content.
pub fn write_zst_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let f = File::create(path).unwrap();
    let mut enc = zstd::stream::write::Encoder::new(f, 3).unwrap();
    for l in lines {
        writeln!(&mut enc, "{}", l).unwrap();
    }
    enc.finish().unwrap();
}

/// Write a plain NDJSON batch file from JSON values.
pub fn write_jsonl(path: &Path, rows: &[serde_json::Value]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    for r in rows {
        writeln!(&mut f, "{}", r).unwrap();
    }
}

/// Read a JSONL file into a vector of `serde_json::Value` (skips empty lines).
pub fn read_jsonl_values(path: &Path) -> Vec<serde_json::Value> {
    let f = File::open(path).unwrap();
    let r = BufReader::new(f);
    r.lines()
        .map(|l| l.unwrap())
        .filter(|s| !s.is_empty())
        .map(|s| serde_json::from_str(&s).unwrap())
        .collect()
}

/// Read a text file line-by-line into strings.
pub fn read_lines(path: &Path) -> Vec<String> {
    let f = File::open(path).unwrap();
    let r = BufReader::new(f);
    r.lines().map(|l| l.unwrap()).filter(|s| !s.is_empty()).collect()
}

/// Build a tiny archive corpus under `<base>/bronze/raw_zst` with:
/// - RS_2021-03.zst:
///     p1  r/Politics, in-window, English, carries an `extras` payload → kept
///     f1  r/funny (not in allow-set)                                  → dropped
///     p0  r/politics but created in 1970 (outside the window)        → dropped
///     one malformed (non-JSON) line                                  → counted
/// - RS_2021-04.zst:
///     p2  r/politics, in-window, Spanish                             → kept
///     p3  r/politics, empty title+selftext ("und")                   → dropped
///     p4  r/politics, German                                         → dropped
pub fn make_archive_corpus() -> PathBuf {
    let base = tempfile::tempdir().unwrap().into_path();
    let raw = base.join("bronze").join("raw_zst");

    let march = vec![
        json!({
            "id": "p1", "subreddit": "Politics", "author": "alice",
            "created_utc": 1_616_000_000i64, "score": 42,
            "title": "Senate passes technology bill", "selftext": ENGLISH_TEXT,
            "extras": {"src": "fixture"}
        })
        .to_string(),
        json!({
            "id": "f1", "subreddit": "funny", "author": "bob",
            "created_utc": 1_616_000_100i64, "score": 7,
            "title": "A very funny joke", "selftext": ENGLISH_TEXT
        })
        .to_string(),
        json!({
            "id": "p0", "subreddit": "politics", "author": "carol",
            "created_utc": 1_000i64, "score": 1,
            "title": "Ancient news", "selftext": ENGLISH_TEXT
        })
        .to_string(),
        "{this is not json".to_string(),
    ];
    write_zst_lines(&raw.join("RS_2021-03.zst"), &march);

    let april = vec![
        json!({
            "id": "p2", "subreddit": "politics", "author": "diego",
            "created_utc": 1_618_900_000i64, "score": 5,
            "title": "Informe económico del trimestre", "selftext": SPANISH_TEXT
        })
        .to_string(),
        json!({
            "id": "p3", "subreddit": "politics", "author": "erin",
            "created_utc": 1_618_900_100i64, "score": 0,
            "title": "", "selftext": ""
        })
        .to_string(),
        json!({
            "id": "p4", "subreddit": "politics", "author": "fritz",
            "created_utc": 1_618_900_200i64, "score": 3,
            "title": "Neues Gesetz", "selftext": GERMAN_TEXT
        })
        .to_string(),
    ];
    write_zst_lines(&raw.join("RS_2021-04.zst"), &april);

    base
}

/// Drop a corrupt monthly file (correct name, not a zstd stream) alongside
/// the corpus so decode failure handling can be exercised.
pub fn add_corrupt_archive(base: &Path) {
    let corrupt = base.join("bronze").join("raw_zst").join("RS_2021-05.zst");
    fs::create_dir_all(corrupt.parent().unwrap()).unwrap();
    let mut f = File::create(&corrupt).unwrap();
    writeln!(&mut f, "{{\"id\":\"bad\",\"subreddit\":\"politics\"}}").unwrap();
}
