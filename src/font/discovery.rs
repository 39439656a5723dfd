//! Platform-specific font discovery: finding a font file for a family name.
//!
//! Handles DirectWrite resolution on Windows and directory scanning elsewhere.
//! Pure discovery: no font loading or rasterizing.

#[cfg(not(target_os = "windows"))]
use std::collections::HashMap;
use std::path::PathBuf;

/// Resolve a family name to a font file path.
#[cfg(target_os = "windows")]
pub fn find_font_by_name(name: &str) -> Option<PathBuf> {
    if let Some(path) = resolve_font_dwrite(name) {
        return Some(path);
    }
    // Fall back to treating the name as a file under the system font dir.
    let path = PathBuf::from(r"C:\Windows\Fonts").join(name);
    path.exists().then_some(path)
}

/// Resolve the Regular/Normal face of a family via DirectWrite.
#[cfg(target_os = "windows")]
fn resolve_font_dwrite(family_name: &str) -> Option<PathBuf> {
    let collection = dwrote::FontCollection::system();
    let descriptor = dwrote::FontDescriptor {
        family_name: family_name.to_string(),
        weight: dwrote::FontWeight::Regular,
        stretch: dwrote::FontStretch::Normal,
        style: dwrote::FontStyle::Normal,
    };
    let font = collection
        .font_from_descriptor(&descriptor)
        .ok()
        .flatten()?;
    let face = font.create_font_face();
    let files = face.files().ok()?;
    let file = files.first()?;
    file.font_file_path().ok()
}

/// Resolve a family name to a font file path by scanning the font directories.
#[cfg(not(target_os = "windows"))]
pub fn find_font_by_name(name: &str) -> Option<PathBuf> {
    let index = build_font_index();
    best_match(name, &index)
}

#[cfg(not(target_os = "windows"))]
fn font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        dirs.push(home.join(".local/share/fonts"));
        dirs.push(home.join("Library/Fonts"));
    }
    dirs.push(PathBuf::from("/usr/share/fonts"));
    dirs.push(PathBuf::from("/usr/local/share/fonts"));
    dirs.push(PathBuf::from("/System/Library/Fonts"));
    dirs.push(PathBuf::from("/Library/Fonts"));
    dirs
}

/// Build a normalized-stem → full path index by scanning all font directories once.
#[cfg(not(target_os = "windows"))]
fn build_font_index() -> HashMap<String, PathBuf> {
    let mut index = HashMap::new();
    for dir in font_dirs() {
        index_font_dir(&dir, &mut index);
    }
    index
}

#[cfg(not(target_os = "windows"))]
fn index_font_dir(dir: &std::path::Path, index: &mut HashMap<String, PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            index_font_dir(&path, index);
        } else if is_font_file(&path) {
            if let Some(stem) = path.file_stem().and_then(|n| n.to_str()) {
                index.entry(normalize(stem)).or_insert(path);
            }
        } else {
            // Not a font file.
        }
    }
}

#[cfg(not(target_os = "windows"))]
fn is_font_file(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
}

/// Lowercase and strip separators so "DejaVu Sans", "DejaVuSans" and
/// "dejavu-sans" compare equal.
#[cfg(not(target_os = "windows"))]
pub(crate) fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Pick the best file for `name`: exact stem, then `<name>regular`, then the
/// shortest stem starting with the name.
#[cfg(not(target_os = "windows"))]
pub(crate) fn best_match(name: &str, index: &HashMap<String, PathBuf>) -> Option<PathBuf> {
    let key = normalize(name);
    if key.is_empty() {
        return None;
    }
    if let Some(path) = index.get(&key) {
        return Some(path.clone());
    }
    if let Some(path) = index.get(&format!("{key}regular")) {
        return Some(path.clone());
    }
    index
        .iter()
        .filter(|(stem, _)| stem.starts_with(&key))
        .min_by(|a, b| a.0.len().cmp(&b.0.len()).then_with(|| a.0.cmp(b.0)))
        .map(|(_, path)| path.clone())
}
