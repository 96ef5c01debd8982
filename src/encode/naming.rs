use std::collections::HashSet;

/// Name used when the text leaves nothing usable.
pub const FALLBACK_FILE_STEM: &str = "animated_text";
const MAX_STEM_CHARS: usize = 100;

/// File stem derived from the project text.
///
/// Characters illegal in file names and control characters are dropped, line breaks and runs of
/// whitespace become a single `_`, and the result is cut to 100 characters.
pub fn sanitize_filename(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            in_space = true;
            continue;
        }
        if matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || c.is_control() {
            continue;
        }
        if in_space {
            out.push('_');
            in_space = false;
        }
        out.push(c);
    }
    if in_space {
        out.push('_');
    }

    let stem: String = out.chars().take(MAX_STEM_CHARS).collect();
    if stem.is_empty() {
        FALLBACK_FILE_STEM.to_owned()
    } else {
        stem
    }
}

/// Hands out file names that are unique within one session.
#[derive(Clone, Debug, Default)]
pub struct ExportNames {
    used: HashSet<String>,
}

impl ExportNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// `base.ext`, or `base_1.ext`, `base_2.ext`, ... if already handed out.
    pub fn unique(&mut self, base: &str, ext: &str) -> String {
        let mut name = format!("{base}.{ext}");
        let mut counter = 1u32;
        while self.used.contains(&name) {
            name = format!("{base}_{counter}.{ext}");
            counter += 1;
        }
        self.used.insert(name.clone());
        name
    }
}
