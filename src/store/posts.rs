//! JSON-backed post archive with search and deduplication.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::assets::catalog::Theme;
use crate::foundation::error::{VerseError, VerseResult};

/// One stored verse post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Monotonic post id.
    pub id: u64,
    /// Verse text.
    pub content: String,
    /// Creation time, seconds since the Unix epoch.
    pub created: u64,
    /// Theme the post was filed under.
    pub theme: Theme,
    /// Free-form comma-separated tags.
    pub tags: String,
}

/// Listing order for [`PostStore::list`] and [`PostStore::search`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest first.
    #[default]
    DateDesc,
    /// Oldest first.
    DateAsc,
    /// Theme name ascending, newest first within a theme.
    Theme,
}

/// Optional listing filters, combined with AND.
#[derive(Clone, Copy, Debug, Default)]
pub struct PostFilter<'a> {
    /// Keep only posts filed under this theme.
    pub theme: Option<Theme>,
    /// Keep only posts whose tags contain this substring.
    pub tag: Option<&'a str>,
}

/// JSON-file-backed archive of verse posts.
///
/// The whole archive is one serde_json document loaded at open and rewritten
/// through a temp-file rename on every mutation. Post volume is small (this
/// backs a personal verse feed), so no database engine is involved.
#[derive(Debug)]
pub struct PostStore {
    path: PathBuf,
    posts: Vec<Post>,
}

impl PostStore {
    /// Open the archive at `path`; a missing file is an empty archive.
    pub fn open(path: impl Into<PathBuf>) -> VerseResult<Self> {
        let path = path.into();
        let posts = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("parse post archive '{}'", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read post archive '{}'", path.display()))
                    .into());
            }
        };
        Ok(Self { path, posts })
    }

    /// Add a post and persist the archive. Content must be non-empty.
    pub fn add(&mut self, content: &str, theme: Theme, tags: &str) -> VerseResult<&Post> {
        if content.is_empty() {
            return Err(VerseError::validation("post content must be non-empty"));
        }
        let id = self.posts.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let created = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let idx = self.posts.len();
        self.posts.push(Post {
            id,
            content: content.to_owned(),
            created,
            theme,
            tags: tags.to_owned(),
        });
        self.save()?;
        Ok(&self.posts[idx])
    }

    /// List posts matching `filter`, ordered by `sort`.
    pub fn list(&self, filter: PostFilter<'_>, sort: SortOrder) -> Vec<&Post> {
        let mut out: Vec<&Post> = self
            .posts
            .iter()
            .filter(|p| matches_filter(p, filter))
            .collect();
        sort_posts(&mut out, sort);
        out
    }

    /// Search posts whose content or tags contain `query`
    /// (case-insensitively), then apply `filter` and `sort`.
    pub fn search(&self, query: &str, filter: PostFilter<'_>, sort: SortOrder) -> Vec<&Post> {
        let needle = query.to_lowercase();
        let mut out: Vec<&Post> = self
            .posts
            .iter()
            .filter(|p| {
                p.content.to_lowercase().contains(&needle)
                    || p.tags.to_lowercase().contains(&needle)
            })
            .filter(|p| matches_filter(p, filter))
            .collect();
        sort_posts(&mut out, sort);
        out
    }

    /// Number of stored posts.
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// Return `true` when the archive holds no posts.
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    fn save(&self) -> VerseResult<()> {
        let bytes = serde_json::to_vec_pretty(&self.posts).context("serialize post archive")?;
        let tmp = self.path.with_extension("json.tmp");
        write_atomic(&tmp, &self.path, &bytes)
            .with_context(|| format!("write post archive '{}'", self.path.display()))?;
        Ok(())
    }
}

fn write_atomic(tmp: &Path, dst: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::write(tmp, bytes)?;
    std::fs::rename(tmp, dst)
}

fn matches_filter(post: &Post, filter: PostFilter<'_>) -> bool {
    if let Some(theme) = filter.theme
        && post.theme != theme
    {
        return false;
    }
    if let Some(tag) = filter.tag
        && !post.tags.to_lowercase().contains(&tag.to_lowercase())
    {
        return false;
    }
    true
}

fn sort_posts(posts: &mut [&Post], sort: SortOrder) {
    match sort {
        SortOrder::DateAsc => posts.sort_by_key(|p| (p.created, p.id)),
        SortOrder::DateDesc => {
            posts.sort_by_key(|p| (std::cmp::Reverse(p.created), std::cmp::Reverse(p.id)));
        }
        SortOrder::Theme => posts.sort_by(|a, b| {
            a.theme
                .name()
                .cmp(b.theme.name())
                .then(b.created.cmp(&a.created))
                .then(b.id.cmp(&a.id))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(posts: Vec<Post>) -> (tempfile::TempDir, PostStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        std::fs::write(&path, serde_json::to_vec(&posts).unwrap()).unwrap();
        let store = PostStore::open(&path).unwrap();
        (dir, store)
    }

    fn post(id: u64, content: &str, created: u64, theme: Theme, tags: &str) -> Post {
        Post {
            id,
            content: content.to_owned(),
            created,
            theme,
            tags: tags.to_owned(),
        }
    }

    #[test]
    fn missing_archive_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = PostStore::open(dir.path().join("posts.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn add_persists_and_assigns_increasing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");

        let mut store = PostStore::open(&path).unwrap();
        store.add("first", Theme::Default, "").unwrap();
        let id = store.add("second", Theme::Sad, "rainy").unwrap().id;
        assert_eq!(id, 2);

        let reopened = PostStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        let listed = reopened.list(PostFilter::default(), SortOrder::DateAsc);
        assert_eq!(listed[0].content, "first");
    }

    #[test]
    fn empty_content_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PostStore::open(dir.path().join("posts.json")).unwrap();
        assert!(matches!(
            store.add("", Theme::Default, "").unwrap_err(),
            VerseError::Validation(_)
        ));
    }

    #[test]
    fn filters_compose_with_and() {
        let (_dir, store) = store_with(vec![
            post(1, "rain falls", 10, Theme::Sad, "rain,night"),
            post(2, "sun rises", 20, Theme::Motivational, "morning"),
            post(3, "rain again", 30, Theme::Sad, "storm"),
        ]);

        let sad = store.list(
            PostFilter {
                theme: Some(Theme::Sad),
                tag: None,
            },
            SortOrder::default(),
        );
        assert_eq!(sad.iter().map(|p| p.id).collect::<Vec<_>>(), [3, 1]);

        let sad_rain = store.list(
            PostFilter {
                theme: Some(Theme::Sad),
                tag: Some("rain"),
            },
            SortOrder::default(),
        );
        assert_eq!(sad_rain.iter().map(|p| p.id).collect::<Vec<_>>(), [1]);
    }

    #[test]
    fn search_matches_content_and_tags_case_insensitively() {
        let (_dir, store) = store_with(vec![
            post(1, "Rain falls softly", 10, Theme::Sad, ""),
            post(2, "sunshine", 20, Theme::Default, "after-RAIN"),
            post(3, "unrelated", 30, Theme::Default, ""),
        ]);

        let hits = store.search("rain", PostFilter::default(), SortOrder::DateAsc);
        assert_eq!(hits.iter().map(|p| p.id).collect::<Vec<_>>(), [1, 2]);
    }

    #[test]
    fn sort_orders() {
        let (_dir, store) = store_with(vec![
            post(1, "a", 30, Theme::Sad, ""),
            post(2, "b", 10, Theme::Default, ""),
            post(3, "c", 20, Theme::Sad, ""),
        ]);

        let asc = store.list(PostFilter::default(), SortOrder::DateAsc);
        assert_eq!(asc.iter().map(|p| p.id).collect::<Vec<_>>(), [2, 3, 1]);

        let desc = store.list(PostFilter::default(), SortOrder::DateDesc);
        assert_eq!(desc.iter().map(|p| p.id).collect::<Vec<_>>(), [1, 3, 2]);

        // Theme ascending by name (default < sad), newest first within.
        let by_theme = store.list(PostFilter::default(), SortOrder::Theme);
        assert_eq!(by_theme.iter().map(|p| p.id).collect::<Vec<_>>(), [2, 1, 3]);
    }
}
