//! Front matter blocks consumed by the site generator's templates.

/// An ordered list of `key: value` lines between `---` fences.
#[derive(Debug, Clone, Default)]
pub struct FrontMatter {
    entries: Vec<(&'static str, String)>,
}

impl FrontMatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a string entry. Quoted only when a plain YAML scalar would misread it.
    pub fn text(mut self, key: &'static str, value: &str) -> Self {
        self.entries.push((key, yaml_scalar(value)));
        self
    }

    /// Append an entry written exactly as given, e.g. a tagged YAML value.
    pub fn raw(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.entries.push((key, value.into()));
        self
    }

    /// Append a boolean entry.
    pub fn flag(mut self, key: &'static str, value: bool) -> Self {
        self.entries.push((key, value.to_string()));
        self
    }

    /// Render the block, including both fences and a trailing newline.
    pub fn render(&self) -> String {
        let mut fm = String::from("---\n");
        for (key, value) in &self.entries {
            fm.push_str(key);
            fm.push_str(": ");
            fm.push_str(value);
            fm.push('\n');
        }
        fm.push_str("---\n");
        fm
    }
}

/// Format `s` as a YAML scalar, double-quoting it if needed.
fn yaml_scalar(s: &str) -> String {
    if needs_quotes(s) {
        format!("\"{}\"", escape_yaml_string(s))
    } else {
        s.to_string()
    }
}

fn needs_quotes(s: &str) -> bool {
    const INDICATORS: &[char] = &[
        '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%',
        '@', '`',
    ];
    const RESERVED: &[&str] = &["true", "false", "yes", "no", "on", "off", "null", "~"];

    let Some(first) = s.chars().next() else {
        return true;
    };

    // A dash only opens a sequence when followed by a space
    (first != '-' && INDICATORS.contains(&first))
        || s.starts_with("- ")
        || s == "-"
        || s.trim() != s
        || s.contains(": ")
        || s.ends_with(':')
        || s.contains(" #")
        || s.contains(['"', '\\', '\n', '\r', '\t'])
        || RESERVED.contains(&s.to_ascii_lowercase().as_str())
        || s.parse::<f64>().is_ok()
}

/// Escape special characters in a double-quoted YAML string value.
fn escape_yaml_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}
