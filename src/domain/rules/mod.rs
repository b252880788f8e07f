// Domain rules - Naming, ordering and file-selection policies

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Token appended to the stem of every finished output
pub const COMPLETED_MARKER: &str = "_autocut";

/// Extensions kept as-is on output; anything else becomes `.mp4`
pub const OUTPUT_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "m4v"];

/// Extensions considered media inputs in batch mode
pub const MEDIA_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi", "m4v", "webm", "wmv", "flv"];

/// Extension used when an input's own extension is not on the output allow-list
pub const DEFAULT_OUTPUT_EXTENSION: &str = "mp4";

/// One run of a natural-sort key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeyPart {
    /// Lowercased non-digit run
    Text(String),
    /// Digit run, compared by magnitude
    Number(NumberRun),
}

/// Digit run without leading zeros; ordering by length first gives numeric order
/// for arbitrarily long runs
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NumberRun {
    len: usize,
    digits: String,
}

impl NumberRun {
    fn new(raw: &str) -> Self {
        let trimmed = raw.trim_start_matches('0');
        let digits = if trimmed.is_empty() { "0" } else { trimmed };
        Self {
            len: digits.len(),
            digits: digits.to_string(),
        }
    }
}

/// Natural-sort key of a file name: alternating text and number runs of the stem
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct NaturalKey {
    parts: Vec<KeyPart>,
}

impl NaturalKey {
    /// Build the key from a file name or path; only the stem takes part
    pub fn from_name(name: &str) -> Self {
        let stem = Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        Self::from_stem(&stem)
    }

    fn from_stem(stem: &str) -> Self {
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut in_digits = false;

        for ch in stem.chars() {
            let is_digit = ch.is_ascii_digit();
            if is_digit != in_digits {
                parts.push(Self::finish_run(&current, in_digits));
                current.clear();
                in_digits = is_digit;
            }
            current.push(ch);
        }
        if !current.is_empty() || parts.is_empty() {
            parts.push(Self::finish_run(&current, in_digits));
        }

        Self { parts }
    }

    fn finish_run(run: &str, digits: bool) -> KeyPart {
        if digits {
            KeyPart::Number(NumberRun::new(run))
        } else {
            KeyPart::Text(run.to_lowercase())
        }
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.parts
    }
}

/// Compare two paths by natural order of their file names
pub fn natural_cmp(a: &Path, b: &Path) -> Ordering {
    let name_a = file_name_of(a);
    let name_b = file_name_of(b);
    NaturalKey::from_name(&name_a)
        .cmp(&NaturalKey::from_name(&name_b))
        .then_with(|| name_a.cmp(&name_b))
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Rules for naming finished outputs
pub struct OutputNaming;

impl OutputNaming {
    /// Whether the file's stem already carries the completed-output marker
    pub fn has_completed_marker(path: &Path) -> bool {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().to_lowercase().contains(COMPLETED_MARKER))
            .unwrap_or(false)
    }

    /// `<dir>/<stem>_autocut.<ext>`, with the extension normalised to the allow-list
    pub fn completed_output_path(input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let extension = Self::output_extension(input);
        input.with_file_name(format!("{}{}.{}", stem, COMPLETED_MARKER, extension))
    }

    /// Extension an output derived from `input` should carry
    pub fn output_extension(input: &Path) -> String {
        input
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .filter(|ext| OUTPUT_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or_else(|| DEFAULT_OUTPUT_EXTENSION.to_string())
    }
}

/// Rules for picking batch inputs
pub struct MediaFilter;

impl MediaFilter {
    /// Whether the path has a known media extension
    pub fn is_media_file(path: &Path) -> bool {
        path.extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                MEDIA_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
    }
}
