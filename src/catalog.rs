use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

/// Persisted name of the synthetic "show everything" category. A portfolio
/// group may not claim it.
pub const ALL_CATEGORY: &str = "all";

pub fn is_reserved_category(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(ALL_CATEGORY)
}

/// Stable identity of a catalog entry: its group and its position in that group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey {
    pub category_index: usize,
    pub image_index: usize,
}

/// Where the bytes of an image (or another portfolio asset) live.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageSource {
    Path(PathBuf),
    Url(String),
}

impl ImageSource {
    /// Interprets a locator from the portfolio file. Relative paths are
    /// resolved against `base_dir`.
    pub fn from_locator(locator: &str, base_dir: &Path) -> Self {
        let trimmed = locator.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return ImageSource::Url(trimmed.to_string());
        }
        let path = Path::new(trimmed);
        if path.is_absolute() {
            ImageSource::Path(path.to_path_buf())
        } else {
            ImageSource::Path(base_dir.join(path))
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            ImageSource::Path(p) => p
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned(),
            ImageSource::Url(u) => u.rsplit('/').next().unwrap_or(u).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub src: ImageSource,
    pub category: String,
    pub title: String,
    pub alt_text: String,
    pub key: EntryKey,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
/// An image locator, either bare or with its own alt text.
pub enum ImageRef {
    Bare(String),
    Detailed { src: String, alt: Option<String> },
}

impl ImageRef {
    fn parts(&self) -> (&str, Option<&str>) {
        match self {
            ImageRef::Bare(src) => (src, None),
            ImageRef::Detailed { src, alt } => (src, alt.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
/// One category block of the portfolio file.
pub struct GalleryGroup {
    pub category: String,
    pub title: String,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Achievement {
    pub title: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub tagline: String,
    pub bio: Vec<String>,
    pub achievements: Vec<Achievement>,
}

/// A position held or a degree earned.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeItem {
    pub title: String,
    #[serde(default)]
    pub org: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub detail: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillGroup {
    pub category: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResumeFile {
    experience: Vec<ResumeItem>,
    education: Vec<ResumeItem>,
    skills: Vec<SkillGroup>,
    cv: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Resume {
    pub experience: Vec<ResumeItem>,
    pub education: Vec<ResumeItem>,
    pub skills: Vec<SkillGroup>,
    /// Downloadable CV document, resolved like image locators.
    pub cv: Option<ImageSource>,
}

impl Resume {
    fn from_file(file: ResumeFile, base_dir: &Path) -> Self {
        Self {
            experience: file.experience,
            education: file.education,
            skills: file.skills,
            cv: file
                .cv
                .filter(|c| !c.trim().is_empty())
                .map(|c| ImageSource::from_locator(&c, base_dir)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.experience.is_empty()
            && self.education.is_empty()
            && self.skills.is_empty()
            && self.cv.is_none()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PortfolioFile {
    profile: Profile,
    resume: ResumeFile,
    gallery: Vec<GalleryGroup>,
}

/// Everything read from the portfolio file.
#[derive(Debug, Default)]
pub struct Portfolio {
    pub profile: Profile,
    pub resume: Resume,
    pub catalog: Catalog,
}

impl Portfolio {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading portfolio {}", path.display()))?;
        let base_dir = path.parent().unwrap_or(Path::new("."));
        Self::from_toml_str(&contents, base_dir)
            .with_context(|| format!("parsing portfolio {}", path.display()))
    }

    pub fn from_toml_str(contents: &str, base_dir: &Path) -> anyhow::Result<Self> {
        let file: PortfolioFile = toml::from_str(contents)?;
        Ok(Self {
            profile: file.profile,
            resume: Resume::from_file(file.resume, base_dir),
            catalog: Catalog::from_groups(&file.gallery, base_dir),
        })
    }
}

/// The flattened, read-only list of every image across all categories.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    categories: Vec<String>,
}

impl Catalog {
    pub fn from_groups(groups: &[GalleryGroup], base_dir: &Path) -> Self {
        let mut entries = Vec::new();
        let mut categories: Vec<String> = Vec::new();

        for (category_index, group) in groups.iter().enumerate() {
            if is_reserved_category(&group.category) {
                // Still listed under "All", just not as its own filter.
                tracing::warn!(
                    title = %group.title,
                    "category name {:?} is reserved; group has no filter of its own",
                    group.category
                );
            } else if !categories.iter().any(|c| c == &group.category) {
                categories.push(group.category.clone());
            }
            for (image_index, image) in group.images.iter().enumerate() {
                let (locator, alt) = image.parts();
                let alt_text = match alt.map(str::trim).filter(|a| !a.is_empty()) {
                    Some(alt) => alt.to_string(),
                    None => format!("{} - Image {}", group.title, image_index + 1),
                };
                entries.push(CatalogEntry {
                    src: ImageSource::from_locator(locator, base_dir),
                    category: group.category.clone(),
                    title: group.title.clone(),
                    alt_text,
                    key: EntryKey {
                        category_index,
                        image_index,
                    },
                });
            }
        }

        Self {
            entries,
            categories,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&CatalogEntry> {
        self.entries.get(position)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Distinct category labels in first-seen order, without the "all" option.
    pub fn category_names(&self) -> &[String] {
        &self.categories
    }
}
