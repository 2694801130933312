//! Tests for model asset resolution

use rstest::*;

use super::loader::ModelAssets;

fn touch(dir: &std::path::Path, name: &str) {
    std::fs::write(dir.join(name), b"").unwrap();
}

#[rstest]
fn test_resolve_prefers_safetensors() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "config.json");
    touch(dir.path(), "tokenizer.json");
    touch(dir.path(), "model.safetensors");
    touch(dir.path(), "pytorch_model.bin");

    let assets = ModelAssets::resolve(dir.path().to_str().unwrap()).unwrap();
    assert!(!assets.use_pth);
    assert!(assets.weights.ends_with("model.safetensors"));
    assert!(assets.config.ends_with("config.json"));
    assert!(assets.tokenizer.ends_with("tokenizer.json"));
}

#[rstest]
fn test_resolve_falls_back_to_pytorch_weights() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "config.json");
    touch(dir.path(), "tokenizer.json");
    touch(dir.path(), "pytorch_model.bin");

    let assets = ModelAssets::resolve(dir.path().to_str().unwrap()).unwrap();
    assert!(assets.use_pth);
    assert!(assets.weights.ends_with("pytorch_model.bin"));
}

#[rstest]
fn test_resolve_fails_without_weights() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "config.json");
    touch(dir.path(), "tokenizer.json");

    let error = ModelAssets::resolve(dir.path().to_str().unwrap()).unwrap_err();
    assert!(format!("{}", error).contains("no model weights found"));
}
