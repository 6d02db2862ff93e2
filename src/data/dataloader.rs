// ============================================================
// Layer 4 — Batch Loader
// ============================================================
// Feeds batches of tokenized samples to the training loop.
//
// One call to iter() is one pass over the dataset:
//
//   pass order     identity, or a fresh permutation per pass
//                  (ChaCha8 seeded with seed + pass number)
//       │
//       ▼
//   index batches  [0..bs), [bs..2bs), ... (last may be short)
//       │
//       ▼
//   workers        worker w tokenizes batches w, w+N, w+2N, ...
//                  and sends them down its own bounded channel
//       │
//       ▼
//   consumer       reads channel k % N for batch k, so batches
//                  come out in pass order, none lost or repeated
//       │
//       ▼
//   TextClsBatcher stacks each batch into tensors
//
// With num_workers = 0 every batch is tokenized on the calling
// thread. Dropping an iterator mid-pass closes the channels and
// joins the workers.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use burn::{data::dataloader::batcher::Batcher, prelude::*};
use crossbeam_channel::{bounded, Receiver};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::data::batcher::{TextClsBatch, TextClsBatcher};
use crate::data::dataset::{TextClsDataset, TextClsSample};
use crate::data::loader::load_csv;
use crate::data::preprocessor::prepare_table;
use crate::domain::record::{DESCRIPTION, TITLE};
use crate::domain::traits::TextEncoder;
use crate::error::{DataError, Result};

/// Batches each worker may finish ahead of the consumer.
const PREFETCH_PER_WORKER: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    pub batch_size:   usize,
    pub num_workers:  usize,
    /// Some(seed) reshuffles every pass; None keeps row order.
    pub shuffle_seed: Option<u64>,
}

pub struct BatchLoader<B: Backend> {
    dataset: Arc<TextClsDataset>,
    batcher: TextClsBatcher<B>,
    config:  LoaderConfig,
    passes:  AtomicU64,
}

impl<B: Backend> BatchLoader<B> {
    pub fn new(
        dataset: Arc<TextClsDataset>,
        batcher: TextClsBatcher<B>,
        config:  LoaderConfig,
    ) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(DataError::Config("batch_size must be at least 1".to_string()));
        }
        Ok(Self {
            dataset,
            batcher,
            config,
            passes: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn num_items(&self) -> usize {
        self.dataset.sample_count()
    }

    pub fn num_batches(&self) -> usize {
        self.num_items().div_ceil(self.config.batch_size)
    }

    /// Row order for pass number `pass`.
    pub fn pass_order(&self, pass: u64) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.num_items()).collect();
        if let Some(seed) = self.config.shuffle_seed {
            let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(pass));
            order.shuffle(&mut rng);
        }
        order
    }

    /// Start the next pass, yielding the raw samples of each batch.
    pub fn iter_samples(&self) -> SampleBatches {
        let pass  = self.passes.fetch_add(1, Ordering::Relaxed);
        let order = self.pass_order(pass);
        let batches: Vec<Vec<usize>> = order
            .chunks(self.config.batch_size)
            .map(<[usize]>::to_vec)
            .collect();

        tracing::debug!(
            "Pass {}: {} batches of up to {} rows, {} workers",
            pass,
            batches.len(),
            self.config.batch_size,
            self.config.num_workers
        );
        SampleBatches::start(Arc::clone(&self.dataset), batches, self.config.num_workers)
    }

    /// Start the next pass, yielding stacked tensor batches.
    pub fn iter(&self) -> impl Iterator<Item = Result<TextClsBatch<B>>> + '_ {
        self.iter_samples()
            .map(move |samples| samples.map(|items| self.batcher.batch(items)))
    }
}

// ─── SampleBatches ────────────────────────────────────────────────────────────
/// Iterator over the tokenized batches of one pass, in pass order.
pub struct SampleBatches {
    dataset:   Arc<TextClsDataset>,
    /// Index batches, kept only when tokenizing on the calling thread
    inline:    Vec<Vec<usize>>,
    total:     usize,
    next:      usize,
    receivers: Vec<Receiver<Result<Vec<TextClsSample>>>>,
    handles:   Vec<JoinHandle<()>>,
}

impl SampleBatches {
    fn start(dataset: Arc<TextClsDataset>, batches: Vec<Vec<usize>>, num_workers: usize) -> Self {
        let total   = batches.len();
        let workers = num_workers.min(total);

        if workers == 0 {
            return Self {
                dataset,
                inline: batches,
                total,
                next: 0,
                receivers: Vec::new(),
                handles: Vec::new(),
            };
        }

        let mut receivers = Vec::with_capacity(workers);
        let mut handles   = Vec::with_capacity(workers);

        for w in 0..workers {
            let assigned: Vec<Vec<usize>> =
                batches.iter().skip(w).step_by(workers).cloned().collect();
            let (tx, rx) = bounded(PREFETCH_PER_WORKER);
            let ds = Arc::clone(&dataset);

            handles.push(thread::spawn(move || {
                for indices in assigned {
                    // The consumer hung up: stop early.
                    if tx.send(fetch(&ds, &indices)).is_err() {
                        break;
                    }
                }
            }));
            receivers.push(rx);
        }

        Self {
            dataset,
            inline: Vec::new(),
            total,
            next: 0,
            receivers,
            handles,
        }
    }

    pub fn total_batches(&self) -> usize {
        self.total
    }
}

impl Iterator for SampleBatches {
    type Item = Result<Vec<TextClsSample>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let k = self.next;
        self.next += 1;

        if self.receivers.is_empty() {
            return Some(fetch(&self.dataset, &self.inline[k]));
        }

        let rx = &self.receivers[k % self.receivers.len()];
        Some(rx.recv().unwrap_or_else(|_| {
            Err(DataError::Config(format!("batch worker exited before batch {k}")))
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total - self.next;
        (left, Some(left))
    }
}

impl Drop for SampleBatches {
    fn drop(&mut self) {
        // Closing the channels first unblocks any worker stuck on send.
        self.receivers.clear();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("A batch worker panicked");
            }
        }
    }
}

fn fetch(dataset: &TextClsDataset, indices: &[usize]) -> Result<Vec<TextClsSample>> {
    indices.iter().map(|&i| dataset.sample(i)).collect()
}

// ─── make_loaders ─────────────────────────────────────────────────────────────
/// Text and batching options shared by the train and validation loaders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderOptions {
    pub text_fields:   Vec<String>,
    pub sep:           String,
    pub lowercase:     bool,
    pub batch_size:    usize,
    pub num_workers:   usize,
    pub shuffle_train: bool,
    pub shuffle_seed:  u64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            text_fields:   vec![TITLE.to_string(), DESCRIPTION.to_string()],
            sep:           " ".to_string(),
            lowercase:     false,
            batch_size:    32,
            num_workers:   2,
            shuffle_train: true,
            shuffle_seed:  42,
        }
    }
}

/// Load, prepare and wrap the train and validation tables.
///
/// The train loader reshuffles every pass when `shuffle_train` is set;
/// the validation loader never shuffles.
pub fn make_loaders<B: Backend>(
    train_csv: &Path,
    val_csv:   &Path,
    encoder:   Arc<dyn TextEncoder>,
    options:   &LoaderOptions,
    device:    &B::Device,
) -> Result<(BatchLoader<B>, BatchLoader<B>)> {
    let build = |path: &Path, shuffle_seed: Option<u64>| -> Result<BatchLoader<B>> {
        let table    = load_csv(path)?;
        let prepared = prepare_table(&table, &options.text_fields, &options.sep, options.lowercase)?;
        let dataset  = TextClsDataset::new(&prepared, Arc::clone(&encoder))?;

        tracing::info!("Dataset '{}': {} samples", path.display(), dataset.sample_count());

        BatchLoader::new(
            Arc::new(dataset),
            TextClsBatcher::new(device.clone(), encoder.pad_id()),
            LoaderConfig {
                batch_size: options.batch_size,
                num_workers: options.num_workers,
                shuffle_seed,
            },
        )
    };

    let train_shuffle = options.shuffle_train.then_some(options.shuffle_seed);
    let train = build(train_csv, train_shuffle)?;
    let val   = build(val_csv, None)?;
    Ok((train, val))
}
