use std::path::Path;

use serde::Deserialize;

use crate::db::DatabaseProxy;

#[derive(Debug, Deserialize)]
pub struct WordSeed {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub transliteration: Option<String>,
}

/// Populates the catalogue from a JSON word list before the controller
/// accepts traffic. Duplicate source texts are silently skipped, so
/// reseeding with a grown list only inserts the new entries.
pub async fn seed_catalogue(proxy: &DatabaseProxy, path: &Path) {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "words file not readable, catalogue left as is");
            return;
        }
    };

    let entries: Vec<WordSeed> = match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "words file is not valid JSON, catalogue left as is");
            return;
        }
    };

    let pool = proxy.pool();
    let mut inserted = 0u64;
    let mut skipped = 0u64;

    for entry in &entries {
        let result = sqlx::query(
            r#"
            INSERT INTO "words" ("source_text", "target_text", "transliteration")
            VALUES ($1, $2, $3)
            ON CONFLICT ("source_text") DO NOTHING
            "#,
        )
        .bind(&entry.source)
        .bind(&entry.target)
        .bind(&entry.transliteration)
        .execute(pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() > 0 => inserted += 1,
            Ok(_) => skipped += 1,
            Err(err) => {
                tracing::warn!(error = %err, source = %entry.source, "failed to seed word");
            }
        }
    }

    tracing::info!(inserted, skipped, total = entries.len(), "catalogue seeded");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_seed_parses_with_and_without_transliteration() {
        let entries: Vec<WordSeed> = serde_json::from_str(
            r#"[
                { "source": "cat", "target": "кот", "transliteration": "kot" },
                { "source": "dog", "target": "собака" }
            ]"#,
        )
        .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].transliteration.as_deref(), Some("kot"));
        assert!(entries[1].transliteration.is_none());
    }
}
