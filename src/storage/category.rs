//! File categories and storage key normalization
//!
//! Every object in the bucket lives under a coarse category directory
//! (`paper/`, `code/`, `note/`, `video/`, `other/`). The category is derived
//! from the file extension alone, so the mapping below is the single source
//! of truth for where an upload lands.

/// Coarse content classification used as the first path segment of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    Paper,
    Code,
    Note,
    Video,
    Other,
}

/// Extension → category lookup. Anything missing falls into `Other`.
const CATEGORY_TABLE: &[(&str, FileCategory)] = &[
    ("pdf", FileCategory::Paper),
    ("jpg", FileCategory::Note),
    ("jpeg", FileCategory::Note),
    ("png", FileCategory::Note),
    ("gif", FileCategory::Note),
    ("svg", FileCategory::Note),
    ("webp", FileCategory::Note),
    ("mp4", FileCategory::Video),
    ("webm", FileCategory::Video),
    ("ogg", FileCategory::Video),
    ("js", FileCategory::Code),
    ("py", FileCategory::Code),
    ("java", FileCategory::Code),
    ("cpp", FileCategory::Code),
    ("c", FileCategory::Code),
    ("h", FileCategory::Code),
    ("html", FileCategory::Code),
    ("css", FileCategory::Code),
];

impl FileCategory {
    /// All categories in listing order
    pub const ALL: [FileCategory; 5] = [
        FileCategory::Paper,
        FileCategory::Code,
        FileCategory::Note,
        FileCategory::Video,
        FileCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Paper => "paper",
            FileCategory::Code => "code",
            FileCategory::Note => "note",
            FileCategory::Video => "video",
            FileCategory::Other => "other",
        }
    }

    /// Key prefix for this category, including the trailing slash
    pub fn prefix(&self) -> String {
        format!("{}/", self.as_str())
    }

    /// Classify an already-lowercased extension
    pub fn from_extension(ext: &str) -> Self {
        CATEGORY_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == ext)
            .map(|(_, category)| *category)
            .unwrap_or(FileCategory::Other)
    }

    /// Classify a file name by its extension, case-insensitively
    pub fn from_file_name(name: &str) -> Self {
        Self::from_extension(&extension_of(name))
    }
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lowercased text after the last `.` of the name.
///
/// A name without any `.` yields the whole (lowercased) name.
pub fn extension_of(name: &str) -> String {
    name.rsplit('.').next().unwrap_or(name).to_lowercase()
}

/// Last path segment of a key
pub fn file_name_of(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// First path segment of a key, or `other` for keys stored at the bucket root
pub fn category_segment(key: &str) -> &str {
    match key.split_once('/') {
        Some((segment, _)) => segment,
        None => FileCategory::Other.as_str(),
    }
}

/// Derive the canonical storage key for an upload.
///
/// An explicit, non-empty directory is used verbatim. Otherwise names that
/// already carry a category prefix pass through untouched, and everything
/// else is placed under the category inferred from its extension.
pub fn normalize_key(raw_name: &str, explicit_directory: Option<&str>) -> String {
    if let Some(directory) = explicit_directory.filter(|d| !d.is_empty()) {
        return format!("{}/{}", directory, raw_name);
    }

    let already_prefixed = FileCategory::ALL
        .iter()
        .any(|category| raw_name.starts_with(&category.prefix()));
    if already_prefixed {
        return raw_name.to_string();
    }

    format!("{}/{}", FileCategory::from_file_name(raw_name), raw_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key_infers_category() {
        assert_eq!(normalize_key("report.pdf", None), "paper/report.pdf");
        assert_eq!(normalize_key("photo.PNG", None), "note/photo.PNG");
        assert_eq!(normalize_key("clip.webm", None), "video/clip.webm");
        assert_eq!(normalize_key("main.cpp", None), "code/main.cpp");
        assert_eq!(normalize_key("archive.zip", None), "other/archive.zip");
    }

    #[test]
    fn test_normalize_key_is_idempotent() {
        for name in ["report.pdf", "photo.PNG", "script.py", "data.bin", "README"] {
            let once = normalize_key(name, None);
            assert_eq!(normalize_key(&once, None), once);
        }
    }

    #[test]
    fn test_explicit_directory_wins() {
        assert_eq!(normalize_key("report.pdf", Some("uploads")), "uploads/report.pdf");
        assert_eq!(normalize_key("photo.png", Some("video")), "video/photo.png");
        assert_eq!(normalize_key("a.txt", Some("nested/dir")), "nested/dir/a.txt");
    }

    #[test]
    fn test_empty_directory_falls_back_to_inference() {
        assert_eq!(normalize_key("report.pdf", Some("")), "paper/report.pdf");
    }

    #[test]
    fn test_name_without_dot_uses_whole_name_as_extension() {
        assert_eq!(extension_of("Makefile"), "makefile");
        assert_eq!(normalize_key("Makefile", None), "other/Makefile");
        // the whole name is looked up like any extension
        assert_eq!(normalize_key("c", None), "code/c");
    }

    #[test]
    fn test_prefix_match_requires_slash() {
        assert_eq!(normalize_key("papers.pdf", None), "paper/papers.pdf");
        assert_eq!(normalize_key("notebook.py", None), "code/notebook.py");
    }

    #[test]
    fn test_segments() {
        assert_eq!(file_name_of("paper/report.pdf"), "report.pdf");
        assert_eq!(file_name_of("report.pdf"), "report.pdf");
        assert_eq!(category_segment("note/photo.png"), "note");
        assert_eq!(category_segment("uploads/x/y.bin"), "uploads");
        assert_eq!(category_segment("loose.bin"), "other");
    }

    #[test]
    fn test_category_prefix_matches_display() {
        for category in FileCategory::ALL {
            assert_eq!(category.prefix(), format!("{}/", category));
        }
    }
}
