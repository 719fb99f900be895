//! Course import
//!
//! Reads a TOML file of the form
//!
//! ```toml
//! [[courses]]
//! slug = "rust-basics"
//! title = "Rust Basics"
//! lessons = ["Ownership", "Borrowing", "Lifetimes"]
//! ```
//!
//! and upserts each course with its lessons in order. Re-importing the same
//! file is a no-op; lesson ids stay stable per position.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use scholia_core::Store;

#[derive(Debug, Deserialize)]
struct CourseFile {
    #[serde(default)]
    courses: Vec<CourseEntry>,
}

#[derive(Debug, Deserialize)]
struct CourseEntry {
    slug: String,
    title: String,
    #[serde(default)]
    lessons: Vec<String>,
}

fn parse(source: &str) -> Result<Vec<CourseEntry>> {
    let file: CourseFile = toml::from_str(source).context("Invalid course file")?;
    for course in &file.courses {
        if course.slug.trim().is_empty() {
            anyhow::bail!("course '{}' has an empty slug", course.title);
        }
    }
    Ok(file.courses)
}

/// Import every course in `path`
pub async fn run(store: &Store, path: &Path) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let entries = parse(&source)?;

    let now = Utc::now();
    for entry in &entries {
        let course = store.upsert_course(&entry.slug, &entry.title, now).await?;
        for (index, title) in entry.lessons.iter().enumerate() {
            let position = u32::try_from(index + 1).context("Too many lessons")?;
            store.upsert_lesson(course.id, position, title).await?;
        }
        info!(
            "Imported course {} ({} lessons)",
            course.slug,
            entry.lessons.len()
        );
    }

    println!("Imported {} course(s)", entries.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[courses]]
slug = "rust-basics"
title = "Rust Basics"
lessons = ["Ownership", "Borrowing", "Lifetimes"]

[[courses]]
slug = "async"
title = "Async Rust"
"#;

    #[test]
    fn test_parse_courses() {
        let courses = parse(SAMPLE).unwrap();
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].lessons.len(), 3);
        assert!(courses[1].lessons.is_empty());
    }

    #[test]
    fn test_parse_rejects_blank_slug() {
        let err = parse("[[courses]]\nslug = \" \"\ntitle = \"x\"\n").unwrap_err();
        assert!(err.to_string().contains("empty slug"));
    }

    #[tokio::test]
    async fn test_import_is_repeatable() {
        let store = Store::in_memory().await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courses.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        run(&store, &path).await.unwrap();
        let first = store.upsert_course("rust-basics", "Rust Basics", Utc::now()).await.unwrap();
        let lessons = store.list_lessons(first.id).await.unwrap();

        run(&store, &path).await.unwrap();
        let again = store.list_lessons(first.id).await.unwrap();

        assert_eq!(lessons.len(), 3);
        assert_eq!(lessons, again);
    }
}
