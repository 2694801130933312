//! Shared test fixtures
//!
//! Tiny randomly-initialized BERT configurations and input builders so every
//! test runs CPU-only with no model downloads.

#[cfg(test)]
pub mod fixtures {
    use std::collections::HashMap;

    use candle_core::{DType, Device, Tensor};
    use candle_nn::{VarBuilder, VarMap};
    use candle_transformers::models::bert::Config;
    use rstest::*;
    use tokenizers::models::wordlevel::WordLevel;
    use tokenizers::pre_tokenizers::whitespace::Whitespace;
    use tokenizers::pre_tokenizers::PreTokenizerWrapper;
    use tokenizers::Tokenizer;

    pub const TINY_VOCAB: usize = 64;
    pub const TINY_HIDDEN: usize = 16;

    /// A two-layer BERT small enough to build and run in milliseconds.
    pub fn tiny_bert_config() -> Config {
        serde_json::from_value(serde_json::json!({
            "vocab_size": TINY_VOCAB,
            "hidden_size": TINY_HIDDEN,
            "num_hidden_layers": 2,
            "num_attention_heads": 2,
            "intermediate_size": 32,
            "hidden_act": "gelu",
            "hidden_dropout_prob": 0.1,
            "attention_probs_dropout_prob": 0.1,
            "max_position_embeddings": 64,
            "type_vocab_size": 2,
            "initializer_range": 0.02,
            "layer_norm_eps": 1e-12,
            "pad_token_id": 0,
            "position_embedding_type": "absolute",
            "use_cache": false,
            "classifier_dropout": null,
            "model_type": "bert"
        }))
        .expect("tiny BERT config should deserialize")
    }

    #[fixture]
    pub fn device() -> Device {
        Device::Cpu
    }

    /// Randomly-initialized weights; every tensor a model asks for is
    /// created on demand with the layer's default initializer.
    pub fn random_var_builder(device: &Device) -> VarBuilder<'static> {
        let varmap = VarMap::new();
        VarBuilder::from_varmap(&varmap, DType::F32, device)
    }

    /// Deterministic in-vocabulary token ids, shape `[batch, time]`.
    pub fn token_ids(batch: usize, time: usize, device: &Device) -> Tensor {
        let ids: Vec<u32> = (0..batch * time)
            .map(|i| (i % (TINY_VOCAB - 1) + 1) as u32)
            .collect();
        Tensor::from_vec(ids, (batch, time), device).expect("token id tensor")
    }

    pub fn sample_texts() -> Vec<&'static str> {
        vec![
            "the cat sat on the mat",
            "hello world",
            "the cat",
            "unseen words fall back to unk",
        ]
    }

    /// Whitespace word-level tokenizer over a fixed toy vocabulary.
    pub fn word_level_tokenizer() -> Tokenizer {
        let words = [
            "[UNK]", "the", "cat", "sat", "on", "mat", "hello", "world", "a",
        ];
        let mut vocab = HashMap::new();
        for (id, word) in words.iter().enumerate() {
            vocab.insert(word.to_string(), id as u32);
        }
        let model = WordLevel::builder()
            .vocab(vocab.into_iter().collect())
            .unk_token("[UNK]".to_string())
            .build()
            .expect("word-level model");
        let mut tokenizer = Tokenizer::new(model);
        tokenizer.with_pre_tokenizer(Some(PreTokenizerWrapper::Whitespace(Whitespace {})));
        tokenizer
    }
}
