use candle::{DType, Device, Result, Tensor};
use candle_core as candle;
use candle_core::IndexOp;
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use candle_transformers::models::xlm_roberta::{
    Config as XlmRobertaConfig, XLMRobertaForSequenceClassification,
};
use std::path::Path;

const NUM_LABELS: usize = 1;

/// `BertForSequenceClassification` head on top of the `[CLS]` hidden state.
enum ClassifierHead {
    /// `classifier(tanh(pooler.dense(cls)))`.
    Pooled { pooler: Linear, classifier: Linear },
    /// Checkpoints saved without a pooler.
    Linear(Linear),
}

impl ClassifierHead {
    /// `encoder_vb` is where the pooler lives (`bert.` or the root), `head_vb` the checkpoint root.
    fn load(encoder_vb: &VarBuilder, head_vb: &VarBuilder, hidden_size: usize) -> Result<Self> {
        let classifier = candle_nn::linear(hidden_size, NUM_LABELS, head_vb.pp("classifier"))?;

        if encoder_vb.contains_tensor("pooler.dense.weight") {
            let pooler =
                candle_nn::linear(hidden_size, hidden_size, encoder_vb.pp("pooler.dense"))?;
            Ok(Self::Pooled { pooler, classifier })
        } else {
            Ok(Self::Linear(classifier))
        }
    }

    fn forward(&self, cls: &Tensor) -> Result<Tensor> {
        match self {
            Self::Pooled { pooler, classifier } => {
                classifier.forward(&pooler.forward(cls)?.tanh()?)
            }
            Self::Linear(classifier) => classifier.forward(cls),
        }
    }
}

enum CrossEncoderModel {
    Bert { bert: BertModel, head: ClassifierHead },
    /// RoBERTa / XLM-R checkpoints (`bge-reranker`), which need padding-aware position ids.
    XlmRoberta(XLMRobertaForSequenceClassification),
}

impl CrossEncoderModel {
    fn load(vb: VarBuilder, config_json: &str) -> Result<Self> {
        if vb.contains_tensor("roberta.embeddings.word_embeddings.weight") {
            let config: XlmRobertaConfig = parse_config(config_json)?;
            let model = XLMRobertaForSequenceClassification::new(NUM_LABELS, &config, vb)?;
            return Ok(Self::XlmRoberta(model));
        }

        let config: Config = parse_config(config_json)?;
        let encoder_vb = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
            vb.pp("bert")
        } else {
            vb.clone()
        };

        let bert = BertModel::load(encoder_vb.clone(), &config)?;
        let head = ClassifierHead::load(&encoder_vb, &vb, config.hidden_size)?;

        Ok(Self::Bert { bert, head })
    }

    fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        match self {
            Self::Bert { bert, head } => {
                let output = bert.forward(input_ids, token_type_ids, attention_mask)?;
                let cls_token = output.i((.., 0, ..))?;
                head.forward(&cls_token)
            }
            Self::XlmRoberta(model) => {
                let attention_mask = match attention_mask {
                    Some(mask) => mask.clone(),
                    None => input_ids.ones_like()?,
                };
                model.forward(input_ids, &attention_mask, token_type_ids)
            }
        }
    }
}

fn parse_config<T: serde::de::DeserializeOwned>(config_json: &str) -> Result<T> {
    serde_json::from_str(config_json)
        .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))
}

/// BERT-family cross-encoder producing one logit per (query, document) pair.
#[derive(Clone)]
pub struct BertClassifier(std::sync::Arc<CrossEncoderModel>);

impl BertClassifier {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let config_path = model_dir.join("config.json");
        let weights_path = model_dir.join("model.safetensors");

        let config_content = std::fs::read_to_string(config_path)?;

        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? };

        let model = CrossEncoderModel::load(vb, &config_content)?;

        Ok(Self(std::sync::Arc::new(model)))
    }

    /// Runs a padded batch: all inputs are `[batch, seq_len]`, output is `[batch, 1]`.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        self.0.forward(input_ids, token_type_ids, attention_mask)
    }
}
