// Local sentence embeddings via Candle (BERT + mean pooling)
use anyhow::{Context, Result};
use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::sync::Arc;
use tokenizers::{Tokenizer, TruncationParams};

use crate::embedding::Embedder;
use crate::errors::{DocChatError, RetrievalError};

pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Longest token sequence fed to the model
const MAX_SEQUENCE_LENGTH: usize = 256;

/// Texts per forward pass when embedding in bulk
const BATCH_SIZE: usize = 32;

/// Embedding engine running a BERT sentence model on CPU.
///
/// Forward passes run on tokio's blocking pool, never on a runtime worker.
pub struct CandleEmbedder {
    inference: Inference,
    model_id: String,
    dimension: usize,
}

/// Shared model handles, cheap to clone into a blocking task
#[derive(Clone)]
struct Inference {
    model: Arc<BertModel>,
    tokenizer: Arc<Tokenizer>,
    device: Device,
}

impl CandleEmbedder {
    /// Create embedder for `model_id` (downloads the model on first use).
    ///
    /// Blocking: call from `spawn_blocking` inside an async context.
    pub fn new(model_id: &str) -> std::result::Result<Self, DocChatError> {
        Self::load(model_id).map_err(|e| DocChatError::ModelError(format!("{:#}", e)))
    }

    fn load(model_id: &str) -> Result<Self> {
        let device = Device::Cpu;

        let api = Api::new().context("Failed to create HuggingFace API client")?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config_path = repo.get("config.json")
            .context("Failed to download model config")?;
        let tokenizer_path = repo.get("tokenizer.json")
            .context("Failed to download tokenizer")?;
        let weights_path = repo.get("model.safetensors")
            .context("Failed to download model weights")?;

        let config_contents = std::fs::read_to_string(config_path)
            .context("Failed to read config file")?;
        let config: Config = serde_json::from_str(&config_contents)
            .context("Failed to parse model config")?;
        let dimension = hidden_size(&config_contents)?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                .context("Failed to load model weights")?
        };

        let model = BertModel::load(vb, &config)
            .context("Failed to create BERT model")?;

        tracing::info!(model = model_id, dimension, "Loaded sentence embedding model");

        Ok(Self {
            inference: Inference {
                model: Arc::new(model),
                tokenizer: Arc::new(tokenizer),
                device,
            },
            model_id: model_id.to_string(),
            dimension,
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Run `texts` through the model in batches on the blocking pool
    async fn embed_blocking(&self, texts: Vec<String>) -> std::result::Result<Vec<Vec<f32>>, RetrievalError> {
        let inference = self.inference.clone();
        tokio::task::spawn_blocking(move || {
            let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
            let mut vectors = Vec::with_capacity(refs.len());
            for batch in refs.chunks(BATCH_SIZE) {
                vectors.extend(inference.forward_batch(batch)?);
            }
            Ok::<_, anyhow::Error>(vectors)
        })
        .await
        .map_err(|e| RetrievalError::Embedding(format!("Embedding task failed: {}", e)))?
        .map_err(|e| RetrievalError::Embedding(format!("{:#}", e)))
    }
}

impl Inference {
    /// Tokenize, run the model, mean-pool and L2-normalize
    fn forward_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self.tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        let max_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);
        let batch_size = encodings.len();

        // Right-pad ids and masks to the longest sequence
        let mut flat_ids = vec![0u32; batch_size * max_len];
        let mut flat_mask = vec![0u32; batch_size * max_len];
        for (row, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let offset = row * max_len;
            flat_ids[offset..offset + ids.len()].copy_from_slice(ids);
            flat_mask[offset..offset + mask.len()].copy_from_slice(mask);
        }

        let token_ids = Tensor::from_vec(flat_ids, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(flat_mask, (batch_size, max_len), &self.device)?;
        let token_type_ids = token_ids.zeros_like()?;

        let hidden = self.model.forward(&token_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = Self::mean_pool(&hidden, &attention_mask)?;
        let normalized = Self::l2_normalize(&pooled)?;

        Ok(normalized.to_vec2::<f32>()?)
    }

    /// Mean pooling with attention mask
    fn mean_pool(embeddings: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let mask_expanded = attention_mask
            .unsqueeze(2)?
            .expand(embeddings.shape())?
            .to_dtype(embeddings.dtype())?;

        let sum_embeddings = (embeddings * &mask_expanded)?.sum(1)?;
        let sum_mask = mask_expanded.sum(1)?.clamp(1e-9, f64::MAX)?;

        Ok(sum_embeddings.broadcast_div(&sum_mask)?)
    }

    fn l2_normalize(pooled: &Tensor) -> Result<Tensor> {
        let norms = pooled.sqr()?.sum_keepdim(1)?.sqrt()?.clamp(1e-12, f64::MAX)?;
        Ok(pooled.broadcast_div(&norms)?)
    }
}

#[async_trait]
impl Embedder for CandleEmbedder {
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, RetrievalError> {
        let mut vectors = self.embed_blocking(vec![text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| RetrievalError::Embedding("model returned no vector".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> std::result::Result<Vec<Vec<f32>>, RetrievalError> {
        self.embed_blocking(texts.to_vec()).await
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dimension)
    }

    fn name(&self) -> String {
        format!("candle:{}", self.model_id)
    }
}

/// `hidden_size` from a BERT config.json
fn hidden_size(config_json: &str) -> Result<usize> {
    let value: serde_json::Value = serde_json::from_str(config_json)
        .context("Failed to parse model config")?;
    value
        .get("hidden_size")
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .context("Model config has no hidden_size")
}
