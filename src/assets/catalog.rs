//! Background and font catalog with theme-based selection and fallback.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rand::Rng as _;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::foundation::error::{VerseError, VerseResult};
use crate::foundation::resolve::Resolution;

/// Closed set of theme identifiers a verse can be styled with.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Neutral styling, also the home of the catch-all background.
    #[default]
    Default,
    /// Romantic verses.
    Romantic,
    /// Sad verses.
    Sad,
    /// Motivational verses.
    Motivational,
}

impl Theme {
    /// All themes, in listing order.
    pub const ALL: [Theme; 4] = [Theme::Default, Theme::Romantic, Theme::Sad, Theme::Motivational];

    /// Lowercase identifier of this theme.
    pub fn name(self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Romantic => "romantic",
            Theme::Sad => "sad",
            Theme::Motivational => "motivational",
        }
    }

    /// Parse a theme identifier; unknown names map to none.
    pub fn from_name(name: &str) -> Option<Theme> {
        Theme::ALL.iter().copied().find(|t| t.name() == name)
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::from_name(s).ok_or_else(|| format!("unknown theme \"{s}\""))
    }
}

/// Background used when a theme has nothing of its own.
pub const DEFAULT_BACKGROUND: &str = "default.jpg";

/// Font display name substituted when a requested font is unknown.
pub const DEFAULT_FONT: &str = "DancingScript";

/// Known font display names and their files under the fonts dir.
const KNOWN_FONTS: [(&str, &str); 4] = [
    ("DancingScript", "DancingScript-Regular.ttf"),
    ("GreatVibes", "GreatVibes-Regular.ttf"),
    ("Parisienne", "Parisienne-Regular.ttf"),
    ("Arial", "arial.ttf"),
];

/// Directories searched for a last-resort font when no catalog font loads.
const SYSTEM_FONT_DIRS: [&str; 4] = [
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
];

/// Font bytes produced by the resolution chain, with the path they came from.
#[derive(Clone, Debug)]
pub struct FontFile {
    /// Source path of the loaded font.
    pub path: PathBuf,
    /// Raw TTF/OTF bytes.
    pub bytes: Vec<u8>,
}

/// Constructed-once snapshot of the background and font assets on disk.
///
/// The catalog is built explicitly from an assets root and passed into the
/// compositor; [`AssetCatalog::refresh`] re-scans on demand. Scans never fail:
/// an unreadable directory degrades to the default background for every theme
/// and an empty on-disk font set.
#[derive(Clone, Debug)]
pub struct AssetCatalog {
    backgrounds_dir: PathBuf,
    fonts_dir: PathBuf,
    backgrounds: BTreeMap<Theme, Vec<String>>,
    fonts: BTreeMap<String, String>,
}

impl AssetCatalog {
    /// Scan `assets_root/backgrounds` and `assets_root/fonts`.
    pub fn scan(assets_root: impl AsRef<Path>) -> Self {
        let root = assets_root.as_ref();
        let mut catalog = Self {
            backgrounds_dir: root.join("backgrounds"),
            fonts_dir: root.join("fonts"),
            backgrounds: BTreeMap::new(),
            fonts: BTreeMap::new(),
        };
        catalog.refresh();
        catalog
    }

    /// Re-scan both asset directories, replacing the current snapshot.
    pub fn refresh(&mut self) {
        self.backgrounds = scan_backgrounds(&self.backgrounds_dir);
        self.fonts = scan_fonts(&self.fonts_dir);
    }

    /// Background file names known for `theme`, in sorted order.
    pub fn backgrounds(&self, theme: Theme) -> &[String] {
        self.backgrounds
            .get(&theme)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Per-theme background listing, for the catalog API surface.
    pub fn backgrounds_by_theme(&self) -> &BTreeMap<Theme, Vec<String>> {
        &self.backgrounds
    }

    /// Display names of the fonts currently listed, in sorted order.
    pub fn font_names(&self) -> Vec<&str> {
        self.fonts.keys().map(String::as_str).collect()
    }

    /// Absolute path of the backgrounds directory.
    pub fn backgrounds_dir(&self) -> &Path {
        &self.backgrounds_dir
    }

    /// Resolve which background file to use for one render.
    ///
    /// A requested name present in the theme's listing is honored; otherwise
    /// one of the theme's backgrounds is picked uniformly at random, and a
    /// theme with no backgrounds at all falls back to
    /// [`DEFAULT_BACKGROUND`]. The returned path may still fail to open; the
    /// compositor absorbs that with a solid black canvas.
    pub fn resolve_background(&self, theme: Theme, requested: Option<&str>) -> Resolution<PathBuf> {
        let listed = self.backgrounds(theme);

        if let Some(name) = requested {
            if listed.iter().any(|b| b == name) {
                return Resolution::Primary(self.backgrounds_dir.join(name));
            }
            if let Some(pick) = pick_random(listed) {
                return Resolution::fallback(
                    self.backgrounds_dir.join(pick),
                    format!("background \"{name}\" not listed for theme {}; picked \"{pick}\"", theme.name()),
                );
            }
        } else if let Some(pick) = pick_random(listed) {
            return Resolution::Primary(self.backgrounds_dir.join(pick));
        }

        Resolution::fallback(
            self.backgrounds_dir.join(DEFAULT_BACKGROUND),
            format!("theme {} has no backgrounds; using {DEFAULT_BACKGROUND}", theme.name()),
        )
    }

    /// Resolve a requested font display name to loaded font bytes.
    ///
    /// Chain, in order: the requested font's file, the [`DEFAULT_FONT`]'s
    /// file, then the first readable system font. Each stage that fails is
    /// logged and skipped; only total exhaustion is an error.
    pub fn resolve_font(&self, requested: &str) -> VerseResult<Resolution<FontFile>> {
        if let Some(file) = self.fonts.get(requested) {
            match self.read_font(file) {
                Ok(font) => return Ok(Resolution::Primary(font)),
                Err(e) => warn!(font = requested, error = %e, "font file unreadable, trying default"),
            }
        }

        if requested != DEFAULT_FONT
            && let Some(file) = self.fonts.get(DEFAULT_FONT)
            && let Ok(font) = self.read_font(file)
        {
            return Ok(Resolution::fallback(
                font,
                format!("font \"{requested}\" unavailable; using {DEFAULT_FONT}"),
            ));
        }

        if let Some(font) = first_system_font() {
            let reason = format!(
                "font \"{requested}\" unavailable; using system font {}",
                font.path.display()
            );
            return Ok(Resolution::fallback(font, reason));
        }

        Err(VerseError::asset(format!(
            "no font could be loaded for \"{requested}\" (catalog and system chain exhausted)"
        )))
    }

    fn read_font(&self, file: &str) -> VerseResult<FontFile> {
        let path = self.fonts_dir.join(file);
        let bytes = std::fs::read(&path).map_err(|e| {
            VerseError::asset(format!("failed to read font '{}': {e}", path.display()))
        })?;
        Ok(FontFile { path, bytes })
    }
}

fn pick_random(listed: &[String]) -> Option<&String> {
    if listed.is_empty() {
        return None;
    }
    let idx = rand::rng().random_range(0..listed.len());
    listed.get(idx)
}

fn scan_backgrounds(dir: &Path) -> BTreeMap<Theme, Vec<String>> {
    let mut map: BTreeMap<Theme, Vec<String>> =
        Theme::ALL.iter().map(|t| (*t, Vec::new())).collect();

    match std::fs::read_dir(dir) {
        Ok(entries) => {
            for entry in entries.flatten() {
                let name = entry.file_name();
                let Some(name) = name.to_str() else { continue };
                if let Some(theme) = theme_for_background(name) {
                    map.entry(theme).or_default().push(name.to_owned());
                }
            }
        }
        Err(e) => warn!(dir = %dir.display(), error = %e, "backgrounds dir unreadable"),
    }

    for files in map.values_mut() {
        files.sort_unstable();
    }

    // An empty scan still yields a usable catalog: every theme lists the
    // default background.
    if map.values().all(Vec::is_empty) {
        for files in map.values_mut() {
            files.push(DEFAULT_BACKGROUND.to_owned());
        }
    }

    map
}

/// Match a background file name to its theme.
///
/// The theme is the file stem with a trailing digit run stripped, so
/// `romantic2.jpg` belongs to `romantic`. Non-image files and stems outside
/// the closed theme set are ignored.
fn theme_for_background(file_name: &str) -> Option<Theme> {
    let lower = file_name.to_ascii_lowercase();
    if !(lower.ends_with(".jpg") || lower.ends_with(".jpeg") || lower.ends_with(".png")) {
        return None;
    }
    let stem = file_name.split('.').next().unwrap_or(file_name);
    let stem = stem.trim_end_matches(|c: char| c.is_ascii_digit());
    Theme::from_name(stem)
}

fn scan_fonts(dir: &Path) -> BTreeMap<String, String> {
    let mut fonts = BTreeMap::new();
    for (name, file) in KNOWN_FONTS {
        // Arial stays listed even without a file; it resolves through the
        // system-font stage of the chain.
        if file == "arial.ttf" || dir.join(file).exists() {
            fonts.insert(name.to_owned(), file.to_owned());
        }
    }
    fonts
}

/// Find the first readable TTF/OTF under the well-known system font roots.
fn first_system_font() -> Option<FontFile> {
    for dir in SYSTEM_FONT_DIRS {
        if let Some(font) = find_font_file(Path::new(dir), 0) {
            return Some(font);
        }
    }
    None
}

fn find_font_file(dir: &Path, depth: usize) -> Option<FontFile> {
    if depth > 4 {
        return None;
    }
    let mut entries: Vec<_> = std::fs::read_dir(dir).ok()?.flatten().collect();
    entries.sort_by_key(|e| e.file_name());
    for entry in &entries {
        let path = entry.path();
        if path.is_dir() {
            if let Some(font) = find_font_file(&path, depth + 1) {
                return Some(font);
            }
            continue;
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        if matches!(ext.as_deref(), Some("ttf") | Some("otf"))
            && let Ok(bytes) = std::fs::read(&path)
        {
            return Some(FontFile { path, bytes });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_with(backgrounds: &[&str], fonts: &[&str]) -> (tempfile::TempDir, AssetCatalog) {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("backgrounds")).unwrap();
        std::fs::create_dir_all(root.path().join("fonts")).unwrap();
        for name in backgrounds {
            std::fs::write(root.path().join("backgrounds").join(name), b"x").unwrap();
        }
        for name in fonts {
            std::fs::write(root.path().join("fonts").join(name), b"x").unwrap();
        }
        let catalog = AssetCatalog::scan(root.path());
        (root, catalog)
    }

    #[test]
    fn theme_names_round_trip() {
        for theme in Theme::ALL {
            assert_eq!(Theme::from_name(theme.name()), Some(theme));
        }
        assert_eq!(Theme::from_name("spooky"), None);
    }

    #[test]
    fn background_stems_map_to_themes() {
        assert_eq!(theme_for_background("romantic2.jpg"), Some(Theme::Romantic));
        assert_eq!(theme_for_background("sad.png"), Some(Theme::Sad));
        assert_eq!(theme_for_background("default.jpeg"), Some(Theme::Default));
        assert_eq!(theme_for_background("spooky1.jpg"), None);
        assert_eq!(theme_for_background("romantic.txt"), None);
    }

    #[test]
    fn scan_groups_backgrounds_by_theme() {
        let (_root, catalog) =
            catalog_with(&["romantic1.jpg", "romantic2.jpg", "sad1.png", "notes.txt"], &[]);
        assert_eq!(catalog.backgrounds(Theme::Romantic), ["romantic1.jpg", "romantic2.jpg"]);
        assert_eq!(catalog.backgrounds(Theme::Sad), ["sad1.png"]);
        assert!(catalog.backgrounds(Theme::Default).is_empty());
    }

    #[test]
    fn empty_scan_lists_default_background_everywhere() {
        let (_root, catalog) = catalog_with(&[], &[]);
        for theme in Theme::ALL {
            assert_eq!(catalog.backgrounds(theme), [DEFAULT_BACKGROUND]);
        }
    }

    #[test]
    fn requested_background_is_honored_when_listed() {
        let (_root, catalog) = catalog_with(&["romantic1.jpg", "romantic2.jpg"], &[]);
        let r = catalog.resolve_background(Theme::Romantic, Some("romantic2.jpg"));
        assert!(!r.is_fallback());
        assert!(r.value().ends_with("romantic2.jpg"));
    }

    #[test]
    fn unlisted_background_request_falls_back_to_theme_pool() {
        let (_root, catalog) = catalog_with(&["romantic1.jpg"], &[]);
        let r = catalog.resolve_background(Theme::Romantic, Some("missing.jpg"));
        assert!(r.is_fallback());
        assert!(r.value().ends_with("romantic1.jpg"));
    }

    #[test]
    fn theme_without_backgrounds_falls_back_to_default_file() {
        let (_root, catalog) = catalog_with(&["romantic1.jpg"], &[]);
        let r = catalog.resolve_background(Theme::Sad, None);
        assert!(r.is_fallback());
        assert!(r.value().ends_with(DEFAULT_BACKGROUND));
    }

    #[test]
    fn font_listing_requires_file_except_arial() {
        let (_root, catalog) = catalog_with(&[], &["DancingScript-Regular.ttf"]);
        let names = catalog.font_names();
        assert!(names.contains(&"DancingScript"));
        assert!(names.contains(&"Arial"));
        assert!(!names.contains(&"GreatVibes"));
    }

    #[test]
    fn refresh_picks_up_new_assets() {
        let (root, mut catalog) = catalog_with(&[], &[]);
        assert_eq!(catalog.backgrounds(Theme::Sad), [DEFAULT_BACKGROUND]);

        std::fs::write(root.path().join("backgrounds").join("sad1.jpg"), b"x").unwrap();
        catalog.refresh();
        assert_eq!(catalog.backgrounds(Theme::Sad), ["sad1.jpg"]);
    }

    #[test]
    fn unknown_font_falls_back_to_default_font_file() {
        let (_root, catalog) = catalog_with(&[], &["DancingScript-Regular.ttf"]);
        let r = catalog.resolve_font("NoSuchFont").unwrap();
        assert!(r.is_fallback());
        assert!(r.value().path.ends_with("DancingScript-Regular.ttf"));
    }

    #[test]
    fn known_font_resolves_primary() {
        let (_root, catalog) = catalog_with(&[], &["GreatVibes-Regular.ttf"]);
        let r = catalog.resolve_font("GreatVibes").unwrap();
        assert!(!r.is_fallback());
        assert_eq!(r.value().bytes, b"x");
    }
}
