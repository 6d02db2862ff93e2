// ============================================================
// Layer 4 — Text Classification Batcher
// ============================================================
// Implements Burn's Batcher trait to stack tokenized samples
// into tensors.
//
//   Input:  Vec of N TextClsSamples
//   Output: TextClsBatch with
//             input_ids       [N, S]
//             attention_mask  [N, S]
//             labels          [N]
//
// S is the longest sample in the batch. With fixed-length
// padding every sample already has length S; with "longest"
// padding shorter samples are padded here (pad id, mask 0).
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::dataset::TextClsSample;

// ─── TextClsBatch ─────────────────────────────────────────────────────────────
/// A batch ready for a classifier's forward pass.
#[derive(Debug, Clone)]
pub struct TextClsBatch<B: Backend> {
    /// Token ids, shape [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// 1 = real token, 0 = padding, shape [batch_size, seq_len]
    pub attention_mask: Tensor<B, 2, Int>,

    /// Class ids, shape [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

// ─── TextClsBatcher ───────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct TextClsBatcher<B: Backend> {
    /// The device tensors are created on
    pub device: B::Device,

    /// Id written into positions added by batch-level padding
    pub pad_id: u32,
}

impl<B: Backend> TextClsBatcher<B> {
    pub fn new(device: B::Device, pad_id: u32) -> Self {
        Self { device, pad_id }
    }
}

impl<B: Backend> Batcher<TextClsSample, TextClsBatch<B>> for TextClsBatcher<B> {
    fn batch(&self, items: Vec<TextClsSample>) -> TextClsBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.iter().map(TextClsSample::seq_len).max().unwrap_or(0);

        let mut ids_flat  = Vec::with_capacity(batch_size * seq_len);
        let mut mask_flat = Vec::with_capacity(batch_size * seq_len);

        for s in &items {
            let pad = seq_len - s.seq_len();
            ids_flat.extend(s.input_ids.iter().map(|&x| x as i32));
            ids_flat.extend(std::iter::repeat(self.pad_id as i32).take(pad));
            mask_flat.extend(s.attention_mask.iter().map(|&x| x as i32));
            mask_flat.extend(std::iter::repeat(0i32).take(pad));
        }

        let labels: Vec<i64> = items.iter().map(|s| s.label).collect();

        let input_ids = Tensor::<B, 1, Int>::from_ints(ids_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);

        let attention_mask = Tensor::<B, 1, Int>::from_ints(mask_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);

        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        TextClsBatch {
            input_ids,
            attention_mask,
            labels,
        }
    }
}
