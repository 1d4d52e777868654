use async_trait::async_trait;
use siteforge::core::completion::CompletionClient;
use siteforge::core::error::AppError;
use siteforge::core::manifest::{INDEX_FILE, LICENSE_FILE, README_FILE};
use siteforge::core::synthesizer::ManifestSynthesizer;
use siteforge::core::types::ErrorCategory;
use std::sync::Arc;

struct ScriptedCompletion {
    response: String,
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(
        &self,
        _system_instruction: &str,
        _user_instruction: &str,
        _max_output_tokens: u32,
    ) -> Result<String, AppError> {
        Ok(self.response.clone())
    }
}

struct FailingCompletion;

#[async_trait]
impl CompletionClient for FailingCompletion {
    async fn complete(
        &self,
        _system_instruction: &str,
        _user_instruction: &str,
        _max_output_tokens: u32,
    ) -> Result<String, AppError> {
        Err(AppError::new(
            ErrorCategory::CompletionError,
            "endpoint unavailable",
        ))
    }
}

fn synthesizer_for(response: &str) -> ManifestSynthesizer {
    ManifestSynthesizer::new(
        Arc::new(ScriptedCompletion {
            response: response.to_string(),
        }),
        512,
    )
}

fn files_json() -> String {
    serde_json::json!({
        "files": [
            {"name": "index.html", "content": "<html>model content</html>"},
            {"name": "app.js", "content": "console.log('hi');"},
            {"name": "./styles/site.css", "content": "body { margin: 0; }"},
            {"name": "  ", "content": "ignored"}
        ]
    })
    .to_string()
}

#[tokio::test]
async fn clean_json_response_yields_valid_manifest() {
    let manifest = synthesizer_for(&files_json())
        .synthesize("todo app", 1, &[])
        .await;

    assert!(manifest.validate().is_ok());
    assert!(manifest.contains("app.js"));
    // Leading ./ is stripped; blank names are skipped.
    assert!(manifest.contains("styles/site.css"));
    assert_eq!(
        manifest.keys().filter(|k| k.trim().is_empty()).count(),
        0
    );
}

#[tokio::test]
async fn fenced_json_block_is_extracted() {
    let wrapped = format!("Here is the site you asked for:\n```json\n{}\n```\n", files_json());
    let manifest = synthesizer_for(&wrapped).synthesize("todo app", 1, &[]).await;
    assert!(manifest.validate().is_ok());
    assert!(manifest.contains("app.js"));
}

#[tokio::test]
async fn prose_wrapped_json_is_extracted_by_brace_counting() {
    let wrapped = format!(
        "Sure! I built the site. {} Let me know if you need changes.",
        files_json()
    );
    let manifest = synthesizer_for(&wrapped).synthesize("todo app", 1, &[]).await;
    assert!(manifest.validate().is_ok());
    assert!(manifest.contains("app.js"));
}

#[tokio::test]
async fn refusal_text_degrades_to_fallback_manifest() {
    let manifest = synthesizer_for("Sorry, I can't help with that.")
        .synthesize("todo app", 1, &[])
        .await;

    assert!(manifest.validate().is_ok());
    assert_eq!(manifest.len(), 3);
    assert!(manifest.contains(README_FILE));
    assert!(manifest.contains(LICENSE_FILE));
    assert!(manifest.contains(INDEX_FILE));
    let index = manifest.get(INDEX_FILE).unwrap();
    assert!(index.contains("README.md"));
    assert!(index.contains("LICENSE"));
}

#[tokio::test]
async fn hard_completion_failure_degrades_to_fallback_manifest() {
    let synthesizer = ManifestSynthesizer::new(Arc::new(FailingCompletion), 512);
    let manifest = synthesizer.synthesize("todo app", 1, &[]).await;
    assert!(manifest.validate().is_ok());
    assert_eq!(manifest.len(), 3);
}

#[tokio::test]
async fn model_index_is_always_replaced_by_derived_index() {
    let manifest = synthesizer_for(&files_json())
        .synthesize("todo app", 1, &[])
        .await;

    let index = manifest.get(INDEX_FILE).unwrap();
    assert!(!index.contains("model content"));
    assert!(index.contains("href=\"app.js\""));
    assert!(index.contains("href=\"styles/site.css\""));
    assert!(index.contains("href=\"README.md\""));
    assert!(index.contains("href=\"LICENSE\""));
    assert!(!index.contains("href=\"index.html\""));
}

#[tokio::test]
async fn missing_mandatory_files_are_injected() {
    let response = serde_json::json!({
        "files": [{"name": "only.html", "content": "<p>one page</p>"}]
    })
    .to_string();
    let manifest = synthesizer_for(&response)
        .synthesize("single page", 1, &[])
        .await;

    assert!(manifest.validate().is_ok());
    let license = manifest.get(LICENSE_FILE).unwrap();
    assert!(license.contains("MIT License"));
    let readme = manifest.get(README_FILE).unwrap();
    assert!(readme.contains("single page"));
}

#[tokio::test]
async fn readme_carries_round_and_checks_provenance() {
    let checks = vec![
        "has a visible heading".to_string(),
        "works on mobile".to_string(),
    ];
    let manifest = synthesizer_for(&files_json())
        .synthesize("todo app", 2, &checks)
        .await;

    let readme = manifest.get(README_FILE).unwrap();
    assert!(readme.contains("round 2"));
    assert!(readme.contains("has a visible heading"));
    assert!(readme.contains("works on mobile"));
}

#[tokio::test]
async fn synthesis_is_deterministic_for_identical_responses() {
    let synthesizer = synthesizer_for(&files_json());
    let first = synthesizer.synthesize("todo app", 2, &[]).await;
    let second = synthesizer.synthesize("todo app", 2, &[]).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn empty_files_list_still_yields_mandatory_set() {
    let manifest = synthesizer_for("{\"files\": []}")
        .synthesize("todo app", 1, &[])
        .await;
    assert!(manifest.validate().is_ok());
    assert_eq!(manifest.len(), 3);
}
