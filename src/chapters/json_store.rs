use super::{count_words, ChapterContent, ChapterMeta, ChapterMetaBuilder, ChapterStore};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk manuscript layout read by [`JsonChapterStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manuscript {
    #[serde(default)]
    pub title: Option<String>,
    pub chapters: Vec<ManuscriptChapter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManuscriptChapter {
    pub id: String,
    pub number: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// A [`ChapterStore`] reading a JSON manuscript file.
///
/// The file is re-read on every call so that a long-lived session picks up edits
/// made between loads, the same way the app's database would.
#[derive(Debug, Clone)]
pub struct JsonChapterStore {
    path: PathBuf,
}

impl JsonChapterStore {
    pub fn new<P: AsRef<Path>>(path: P) -> JsonChapterStore {
        JsonChapterStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Manuscript> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read manuscript {}", self.path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse manuscript {}", self.path.display()))
    }
}

impl ChapterStore for JsonChapterStore {
    async fn list_chapters(&self) -> Result<Vec<ChapterMeta>> {
        let manuscript = self.load().await?;
        manuscript
            .chapters
            .into_iter()
            .map(|chapter| {
                ChapterMetaBuilder::default()
                    .word_count(count_words(&chapter.content))
                    .id(chapter.id)
                    .number(chapter.number)
                    .title(chapter.title)
                    .build()
                    .with_context(|| format!("Failed to list chapter {}", chapter.number))
            })
            .collect()
    }

    async fn chapter_by_id(&self, id: &str) -> Result<Option<ChapterContent>> {
        let manuscript = self.load().await?;
        Ok(manuscript
            .chapters
            .into_iter()
            .find(|chapter| chapter.id == id)
            .map(|chapter| ChapterContent {
                number: chapter.number,
                title: chapter.title,
                content: chapter.content,
            }))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    fn write_manuscript(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("can create temp file");
        file.write_all(json.as_bytes()).expect("can write manuscript");
        file
    }

    #[tokio::test]
    async fn can_read_chapters_from_json() {
        let file = write_manuscript(
            r#"{
                "title": "O Grimório",
                "chapters": [
                    { "id": "a", "number": 1, "title": "Início", "content": "Era uma vez" },
                    { "id": "b", "number": 2, "title": "Meio" }
                ]
            }"#,
        );
        let store = JsonChapterStore::new(file.path());

        let metas = store.list_chapters().await.expect("can list chapters");
        assert_eq!(
            metas,
            vec![
                ChapterMeta {
                    id: "a".to_string(),
                    number: 1,
                    title: "Início".to_string(),
                    word_count: 3,
                },
                ChapterMeta {
                    id: "b".to_string(),
                    number: 2,
                    title: "Meio".to_string(),
                    word_count: 0,
                },
            ]
        );

        let chapter = store
            .chapter_by_id("a")
            .await
            .expect("can load chapter")
            .expect("chapter exists");
        assert_eq!(chapter.title, "Início");
        assert_eq!(chapter.content, "Era uma vez");
    }

    #[tokio::test]
    async fn broken_manuscript_is_an_error() {
        let file = write_manuscript("{ not json");
        let store = JsonChapterStore::new(file.path());
        let err = store.list_chapters().await.expect_err("parse should fail");
        assert!(format!("{err:#}").contains("Failed to parse manuscript"));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let store = JsonChapterStore::new("/definitely/not/here.json");
        assert!(store.chapter_by_id("a").await.is_err());
    }
}
