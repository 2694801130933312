//! Model asset resolution
//!
//! Locates the configuration, tokenizer and weight files for a model id,
//! either in a local directory or on the HuggingFace Hub.

use std::path::{Path, PathBuf};

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use hf_hub::{api::sync::Api, Repo, RepoType};

use crate::core::error::{ClassifierResult, ModelErrorType};
use crate::model_error;

/// Resolved file locations for one model.
#[derive(Debug, Clone)]
pub struct ModelAssets {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
    /// Whether `weights` is a PyTorch checkpoint rather than safetensors.
    pub use_pth: bool,
}

impl ModelAssets {
    /// Resolve a model id. A path that exists on disk is treated as a local
    /// model directory; anything else is fetched from the HuggingFace Hub.
    /// Safetensors weights are preferred, with `pytorch_model.bin` fallback.
    pub fn resolve(model_id: &str) -> ClassifierResult<Self> {
        if Path::new(model_id).exists() {
            Self::resolve_local(model_id)
        } else {
            Self::resolve_hub(model_id)
        }
    }

    fn resolve_local(model_id: &str) -> ClassifierResult<Self> {
        let root = Path::new(model_id);
        let (weights, use_pth) = if root.join("model.safetensors").exists() {
            (root.join("model.safetensors"), false)
        } else if root.join("pytorch_model.bin").exists() {
            (root.join("pytorch_model.bin"), true)
        } else {
            return Err(model_error!(
                ModelErrorType::Encoder,
                "weight resolution",
                format!("no model weights found in {}", model_id)
            ));
        };

        Ok(Self {
            config: root.join("config.json"),
            tokenizer: root.join("tokenizer.json"),
            weights,
            use_pth,
        })
    }

    fn resolve_hub(model_id: &str) -> ClassifierResult<Self> {
        println!("Loading model from HuggingFace Hub: {}", model_id);
        let repo = Repo::with_revision(model_id.to_string(), RepoType::Model, "main".to_string());

        let api = Api::new()?;
        let api = api.repo(repo);
        let config = api.get("config.json")?;
        let tokenizer = api.get("tokenizer.json")?;

        let (weights, use_pth) = match api.get("model.safetensors") {
            Ok(weights) => (weights, false),
            Err(_) => {
                println!("Safetensors model not found, trying PyTorch model instead...");
                (api.get("pytorch_model.bin")?, true)
            }
        };

        Ok(Self {
            config,
            tokenizer,
            weights,
            use_pth,
        })
    }

    /// Build a `VarBuilder` over the resolved weight file.
    pub fn var_builder(&self, device: &Device) -> ClassifierResult<VarBuilder<'static>> {
        let vb = if self.use_pth {
            VarBuilder::from_pth(&self.weights, DType::F32, device).map_err(|e| {
                model_error!(
                    ModelErrorType::Encoder,
                    "weight loading",
                    e,
                    self.weights.to_string_lossy()
                )
            })?
        } else {
            unsafe {
                VarBuilder::from_mmaped_safetensors(&[self.weights.clone()], DType::F32, device)
                    .map_err(|e| {
                        model_error!(
                            ModelErrorType::Encoder,
                            "weight loading",
                            e,
                            self.weights.to_string_lossy()
                        )
                    })?
            }
        };
        Ok(vb)
    }
}
