//! Manifest synthesis: from a brief to a validated file set.
//!
//! The synthesizer never fails outward. Every internal failure mode (hard
//! completion errors, unparseable responses, responses without a usable file
//! list) degrades to the three-file fallback manifest, because the
//! caller-facing guarantee is "you always get a deployable site."

use crate::core::completion::CompletionClient;
use crate::core::manifest::{Manifest, INDEX_FILE, LICENSE_FILE, README_FILE};
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

const SYSTEM_INSTRUCTION: &str = "You generate small static websites. Respond with a single JSON \
object of the shape {\"files\": [{\"name\": \"relative/path\", \"content\": \"file content\"}, ...]} \
and nothing else: no prose, no markdown fencing, no explanations. Paths are relative, use forward \
slashes, and must include an index.html entry.";

const REGENERATION_BLOCK: &str = "\n\nThis is a later round. Treat the previous round's output as \
a baseline and return a complete replacement of the whole file set, not a diff. Every file of the \
new site must be present in the response. Pay particular attention to accessibility, navigation \
consistency, and responsive layout.";

const MIT_LICENSE: &str = "MIT License\n\nCopyright (c) 2026 Siteforge Maintainers\n\nPermission \
is hereby granted, free of charge, to any person obtaining a copy\nof this software and \
associated documentation files (the \"Software\"), to deal\nin the Software without restriction, \
including without limitation the rights\nto use, copy, modify, merge, publish, distribute, \
sublicense, and/or sell\ncopies of the Software, and to permit persons to whom the Software \
is\nfurnished to do so, subject to the following conditions:\n\nThe above copyright notice and \
this permission notice shall be included in all\ncopies or substantial portions of the \
Software.\n\nTHE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR\n\
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,\nFITNESS FOR A \
PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE\nAUTHORS OR COPYRIGHT HOLDERS BE \
LIABLE FOR ANY CLAIM, DAMAGES OR OTHER\nLIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR \
OTHERWISE, ARISING FROM,\nOUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS \
IN THE\nSOFTWARE.\n";

/// Static index used for the fallback manifest. The fallback key set is fixed,
/// so the links can be too.
const FALLBACK_INDEX_HTML: &str = "<!DOCTYPE html>\n\
<html lang=\"en\">\n\
<head>\n\
<meta charset=\"utf-8\" />\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n\
<title>Generation Failed</title>\n\
<style>body { font-family: sans-serif; margin: 2rem; }</style>\n\
</head>\n\
<body>\n\
<h1>Site generation failed</h1>\n\
<p>The language model did not return a usable file set, so a minimal placeholder site was \
published instead.</p>\n\
<nav>\n\
<ul>\n\
<li><a href=\"README.md\">README.md</a></li>\n\
<li><a href=\"LICENSE\">LICENSE</a></li>\n\
</ul>\n\
</nav>\n\
</body>\n\
</html>\n";

pub struct ManifestSynthesizer {
    completion: Arc<dyn CompletionClient>,
    max_output_tokens: u32,
}

impl ManifestSynthesizer {
    pub fn new(completion: Arc<dyn CompletionClient>, max_output_tokens: u32) -> Self {
        ManifestSynthesizer {
            completion,
            max_output_tokens,
        }
    }

    /// Produce a validated manifest for the brief. Never fails outward.
    pub async fn synthesize(&self, brief: &str, round: u32, checks: &[String]) -> Manifest {
        let instruction = build_instruction(brief, round, checks);
        let raw = match self
            .completion
            .complete(SYSTEM_INSTRUCTION, &instruction, self.max_output_tokens)
            .await
        {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(%error, round, "completion call failed, using fallback manifest");
                return fallback_manifest(brief, round, checks);
            }
        };

        match parse_files(&raw) {
            Some(entries) => finalize(entries, brief, round, checks),
            None => {
                tracing::warn!(
                    round,
                    response_bytes = raw.len(),
                    "completion response had no usable file list, using fallback manifest"
                );
                fallback_manifest(brief, round, checks)
            }
        }
    }
}

fn build_instruction(brief: &str, round: u32, checks: &[String]) -> String {
    let checks_display = if checks.is_empty() {
        "none".to_string()
    } else {
        checks.join(", ")
    };
    let mut instruction = format!(
        "Build a small static website for the following brief.\n\n\
         Brief: {brief}\n\
         Round: {round}\n\
         Evaluation checks to keep in mind: {checks_display}\n"
    );
    if round >= 2 {
        instruction.push_str(REGENERATION_BLOCK);
    }
    instruction
}

/// Ordered extraction chain over a free-form model response. Total: always
/// terminates with some candidate, even if that is just the raw text.
fn extract_candidate(raw: &str) -> &str {
    for strategy in [fenced_block, balanced_object] {
        if let Some(candidate) = strategy(raw) {
            return candidate;
        }
    }
    raw
}

fn fenced_block(raw: &str) -> Option<&str> {
    let fence = Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").ok()?;
    fence
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// First balanced `{...}` span, by brace-depth counting from the first `{`.
fn balanced_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    for (offset, c) in raw[start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&raw[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse the `files` list out of a raw response. `None` is synthesis failure.
fn parse_files(raw: &str) -> Option<Vec<(String, String)>> {
    let candidate = extract_candidate(raw);
    let value: Value = serde_json::from_str(candidate).ok()?;
    let files = value.get("files")?.as_array()?;
    let mut entries = Vec::with_capacity(files.len());
    for item in files {
        let Some(name) = item.get("name").and_then(Value::as_str) else {
            continue;
        };
        if name.trim().is_empty() {
            continue;
        }
        let content = item
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default();
        entries.push((name.to_string(), content.to_string()));
    }
    Some(entries)
}

/// Enforce the structural invariants on a successfully parsed file list.
fn finalize(entries: Vec<(String, String)>, brief: &str, round: u32, checks: &[String]) -> Manifest {
    let mut manifest = Manifest::new();
    for (name, content) in entries {
        manifest.insert(name, content);
    }

    if manifest.find_mandatory(LICENSE_FILE).is_none() {
        manifest.insert(LICENSE_FILE, MIT_LICENSE);
    }
    if manifest.find_mandatory(README_FILE).is_none() {
        manifest.insert(README_FILE, default_readme(brief));
    }

    // The index is always regenerated, whatever the model proposed. Clear any
    // case-variant index keys first so the derived page links each remaining
    // entry exactly once.
    while let Some(key) = manifest.find_mandatory(INDEX_FILE).map(str::to_string) {
        manifest.remove(&key);
    }
    let index = manifest.derive_index();
    manifest.insert(INDEX_FILE, index);

    append_provenance(&mut manifest, round, checks);
    manifest
}

fn fallback_manifest(brief: &str, round: u32, checks: &[String]) -> Manifest {
    let mut manifest = Manifest::new();
    manifest.insert(
        README_FILE,
        format!(
            "{}\nSynthesis fell back to the minimal placeholder site for this round.\n",
            default_readme(brief)
        ),
    );
    manifest.insert(LICENSE_FILE, MIT_LICENSE);
    manifest.insert(INDEX_FILE, FALLBACK_INDEX_HTML);
    append_provenance(&mut manifest, round, checks);
    manifest
}

fn default_readme(brief: &str) -> String {
    format!("# Generated Site\n\n{}\n", brief.trim())
}

fn append_provenance(manifest: &mut Manifest, round: u32, checks: &[String]) {
    let checks_display = if checks.is_empty() {
        "none".to_string()
    } else {
        checks.join(", ")
    };
    let key = match manifest.find_mandatory(README_FILE) {
        Some(key) => key.to_string(),
        None => return,
    };
    if let Some(existing) = manifest.get(&key).map(str::to_string) {
        manifest.insert(
            key,
            format!(
                "{}\n---\n\nGenerated in round {}. Checks considered: {}.\n",
                existing.trim_end(),
                round,
                checks_display
            ),
        );
    }
}
