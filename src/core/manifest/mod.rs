//! Content model for one generated site version.
//!
//! A [`Manifest`] maps relative file paths to textual content. The synthesizer
//! is responsible for establishing the structural invariants (mandatory
//! `README.md`, `LICENSE`, and a derived `index.html`); this module only
//! defines the data type, the validation check, and the deterministic index
//! derivation.

use std::collections::btree_map;
use std::collections::BTreeMap;

pub const README_FILE: &str = "README.md";
pub const LICENSE_FILE: &str = "LICENSE";
pub const INDEX_FILE: &str = "index.html";

/// Validation failure for a manifest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManifestError {
    #[error("manifest is missing mandatory file '{name}'")]
    MissingMandatoryFile { name: String },
}

/// The synthesized set of named text files constituting one site version.
///
/// Keys are relative paths with forward-slash separators and no leading `./`.
/// Iteration order is the sorted key order, which makes every derived output
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    files: BTreeMap<String, String>,
}

impl Manifest {
    pub fn new() -> Self {
        Manifest {
            files: BTreeMap::new(),
        }
    }

    /// Insert an entry, normalizing the key: surrounding whitespace and any
    /// leading `./` segments are stripped. Keys that normalize to the empty
    /// string are rejected.
    pub fn insert<N: AsRef<str>, C: Into<String>>(&mut self, name: N, content: C) -> bool {
        let mut key = name.as_ref().trim();
        while let Some(stripped) = key.strip_prefix("./") {
            key = stripped;
        }
        if key.is_empty() {
            return false;
        }
        self.files.insert(key.to_string(), content.into());
        true
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.files.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Find the actual key matching a mandatory file name.
    ///
    /// Matching is case-insensitive on the file name only: keys under a
    /// directory never match.
    pub fn find_mandatory(&self, file_name: &str) -> Option<&str> {
        self.files
            .keys()
            .find(|key| !key.contains('/') && key.eq_ignore_ascii_case(file_name))
            .map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.files.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check the structural invariants: the three mandatory files must exist.
    pub fn validate(&self) -> Result<(), ManifestError> {
        for mandatory in [README_FILE, LICENSE_FILE, INDEX_FILE] {
            if self.find_mandatory(mandatory).is_none() {
                return Err(ManifestError::MissingMandatoryFile {
                    name: mandatory.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Derive the index page: a link list over the sorted key set, excluding
    /// `index.html` itself.
    ///
    /// This is a pure function of the key set. The same keys produce
    /// byte-identical output, so re-running synthesis without content changes
    /// does not dirty the remote tree.
    pub fn derive_index(&self) -> String {
        let mut page = String::from(
            "<!DOCTYPE html>\n\
             <html lang=\"en\">\n\
             <head>\n\
             <meta charset=\"utf-8\" />\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n\
             <title>Site Contents</title>\n\
             <style>body { font-family: sans-serif; margin: 2rem; } li { margin: 0.25rem 0; }</style>\n\
             </head>\n\
             <body>\n\
             <h1>Site Contents</h1>\n\
             <nav>\n\
             <ul>\n",
        );
        for key in self.files.keys() {
            if !key.contains('/') && key.eq_ignore_ascii_case(INDEX_FILE) {
                continue;
            }
            let escaped = escape_html(key);
            page.push_str(&format!("<li><a href=\"{escaped}\">{escaped}</a></li>\n"));
        }
        page.push_str("</ul>\n</nav>\n</body>\n</html>\n");
        page
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
