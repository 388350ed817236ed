// ============================================================
// Layer 5 — Siamese LSTM Model
// ============================================================
// Both code blocks go through the SAME encoder (shared weights),
// and the two encodings are merged into one similarity score:
//
//   left ids  [B, S] ──► Embedding ─► LSTM(64) ─► LSTM(50) ──► l [B, 50]
//                          (frozen)   sequence    last state
//   right ids [B, S] ──► (same layers, same weights)       ──► r [B, 50]
//
//   score = exp(-Σ|l - r|)    [B, 1], in (0, 1]
//
// The LSTM follows the Keras layout so its behaviour matches a
// model trained with Keras defaults:
//   - one fused kernel per input/recurrent path, gates ordered
//     i (input), f (forget), c (candidate), o (output)
//   - hard sigmoid on the gates: clamp(0.2·z + 0.5, 0, 1)
//   - forget-gate bias initialised to 1
//
//   z  = x_t·W + h_{t-1}·U + b
//   i  = σ(z_i)   f = σ(z_f)   o = σ(z_o)
//   c_t = f ⊙ c_{t-1} + i ⊙ act(z_c)
//   h_t = o ⊙ act(c_t)
//
// where act is tanh for the first layer and ReLU for the second.
//
// Reference: Mueller & Thyagarajan (2016) Siamese Recurrent
//            Architectures for Learning Sentence Similarity
//            Hochreiter & Schmidhuber (1997) LSTM
//            Burn Book §3 (Building Blocks)

use anyhow::{bail, Result};
use burn::{
    module::Param,
    nn::{
        loss::{MseLoss, Reduction},
        Embedding, EmbeddingConfig, Initializer,
    },
    prelude::*,
    tensor::activation,
};

use crate::data::embedding_matrix::EmbeddingMatrix;

// ─── Keras-style LSTM ─────────────────────────────────────────────────────────
// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct KerasLstmConfig {
    pub d_input: usize,
    pub units:   usize,
    /// ReLU instead of tanh for the candidate and output activation
    #[config(default = false)]
    pub relu_cell: bool,
    /// Hard sigmoid instead of the logistic sigmoid on the gates
    #[config(default = true)]
    pub hard_sigmoid: bool,
}

impl KerasLstmConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> KerasLstm<B> {
        let gates = 4 * self.units;
        let glorot = Initializer::XavierUniform { gain: 1.0 };

        let kernel = glorot.init_with([self.d_input, gates], Some(self.d_input), Some(gates), device);
        let recurrent_kernel = glorot.init_with([self.units, gates], Some(self.units), Some(gates), device);

        let mut bias = vec![0.0f32; gates];
        bias[self.units..2 * self.units].fill(1.0);
        let bias = Param::from_tensor(Tensor::from_floats(bias.as_slice(), device));

        KerasLstm {
            kernel,
            recurrent_kernel,
            bias,
            units:        self.units,
            relu_cell:    self.relu_cell,
            hard_sigmoid: self.hard_sigmoid,
        }
    }
}

#[derive(Module, Debug)]
pub struct KerasLstm<B: Backend> {
    /// Input weights, shape [d_input, 4 * units]
    pub kernel: Param<Tensor<B, 2>>,
    /// Recurrent weights, shape [units, 4 * units]
    pub recurrent_kernel: Param<Tensor<B, 2>>,
    /// Shape [4 * units]
    pub bias: Param<Tensor<B, 1>>,
    pub units:        usize,
    pub relu_cell:    bool,
    pub hard_sigmoid: bool,
}

impl<B: Backend> KerasLstm<B> {
    /// [batch, seq, d_input] → hidden state at every step [batch, seq, units]
    pub fn forward_sequence(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let (states, _) = self.unroll(x, true);
        Tensor::stack(states, 1)
    }

    /// [batch, seq, d_input] → final hidden state [batch, units]
    pub fn forward_last(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let (_, last) = self.unroll(x, false);
        last
    }

    fn unroll(&self, x: Tensor<B, 3>, keep_states: bool) -> (Vec<Tensor<B, 2>>, Tensor<B, 2>) {
        let [batch, seq_len, d_input] = x.dims();
        let units = self.units;
        let gates = 4 * units;
        let device = x.device();

        // Input projection for all steps in one matmul
        let projected = x
            .reshape([batch * seq_len, d_input])
            .matmul(self.kernel.val())
            .add(self.bias.val().unsqueeze::<2>())
            .reshape([batch, seq_len, gates]);
        let recurrent = self.recurrent_kernel.val();

        let mut h = Tensor::<B, 2>::zeros([batch, units], &device);
        let mut c = Tensor::<B, 2>::zeros([batch, units], &device);
        let mut states = Vec::with_capacity(if keep_states { seq_len } else { 0 });

        for t in 0..seq_len {
            let z = projected
                .clone()
                .slice([0..batch, t..t + 1, 0..gates])
                .reshape([batch, gates])
                + h.matmul(recurrent.clone());

            let i = self.gate(z.clone().slice([0..batch, 0..units]));
            let f = self.gate(z.clone().slice([0..batch, units..2 * units]));
            let g = self.cell(z.clone().slice([0..batch, 2 * units..3 * units]));
            let o = self.gate(z.slice([0..batch, 3 * units..gates]));

            c = f * c + i * g;
            h = o * self.cell(c.clone());

            if keep_states {
                states.push(h.clone());
            }
        }

        (states, h)
    }

    fn gate(&self, z: Tensor<B, 2>) -> Tensor<B, 2> {
        if self.hard_sigmoid {
            z.mul_scalar(0.2).add_scalar(0.5).clamp(0.0, 1.0)
        } else {
            activation::sigmoid(z)
        }
    }

    fn cell(&self, z: Tensor<B, 2>) -> Tensor<B, 2> {
        if self.relu_cell {
            activation::relu(z)
        } else {
            activation::tanh(z)
        }
    }
}

// ─── Siamese Model ────────────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct SiameseLstmConfig {
    /// Embedding rows: vocabulary size + 1 for the padding sentinel
    pub vocab_size: usize,
    #[config(default = 100)]
    pub embedding_dim: usize,
    /// Fixed input length both branches are padded to
    #[config(default = 101)]
    pub max_seq_len: usize,
    #[config(default = 64)]
    pub first_layer_units: usize,
    #[config(default = 50)]
    pub second_layer_units: usize,
    #[config(default = true)]
    pub relu_second_layer: bool,
    #[config(default = true)]
    pub hard_sigmoid: bool,
}

impl SiameseLstmConfig {
    /// Randomly initialised model; the embedding is frozen.
    pub fn init<B: Backend>(&self, device: &B::Device) -> SiameseLstm<B> {
        let embedding = EmbeddingConfig::new(self.vocab_size, self.embedding_dim)
            .init(device)
            .no_grad();
        let first = KerasLstmConfig::new(self.embedding_dim, self.first_layer_units)
            .with_hard_sigmoid(self.hard_sigmoid)
            .init(device);
        let second = KerasLstmConfig::new(self.first_layer_units, self.second_layer_units)
            .with_relu_cell(self.relu_second_layer)
            .with_hard_sigmoid(self.hard_sigmoid)
            .init(device);

        SiameseLstm { embedding, first, second }
    }

    /// Model whose frozen embedding holds the rows of `matrix`.
    pub fn init_with_embeddings<B: Backend>(
        &self,
        matrix: &EmbeddingMatrix,
        device: &B::Device,
    ) -> Result<SiameseLstm<B>> {
        if matrix.rows() != self.vocab_size || matrix.dim() != self.embedding_dim {
            bail!(
                "Embedding matrix is {}x{} but the model expects {}x{}",
                matrix.rows(),
                matrix.dim(),
                self.vocab_size,
                self.embedding_dim
            );
        }

        let mut model = self.init(device);
        let weights = Tensor::<B, 2>::from_data(
            TensorData::new(matrix.as_slice().to_vec(), [matrix.rows(), matrix.dim()]),
            device,
        );
        model.embedding.weight = Param::from_tensor(weights);
        model.embedding = model.embedding.no_grad();
        Ok(model)
    }
}

#[derive(Module, Debug)]
pub struct SiameseLstm<B: Backend> {
    pub embedding: Embedding<B>,
    pub first:     KerasLstm<B>,
    pub second:    KerasLstm<B>,
}

impl<B: Backend> SiameseLstm<B> {
    /// ids [batch, seq] → branch encoding [batch, second_layer_units]
    pub fn encode(&self, ids: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let x = self.embedding.forward(ids);
        let x = self.first.forward_sequence(x);
        self.second.forward_last(x)
    }

    /// Similarity for each pair — shape [batch, 1]
    pub fn forward(&self, left: Tensor<B, 2, Int>, right: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        exp_neg_manhattan(self.encode(left), self.encode(right))
    }

    /// Mean squared error against `labels` [batch, 1], plus the scores.
    pub fn forward_loss(
        &self,
        left:   Tensor<B, 2, Int>,
        right:  Tensor<B, 2, Int>,
        labels: Tensor<B, 2>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let scores = self.forward(left, right);
        let loss = MseLoss::new().forward(scores.clone(), labels, Reduction::Mean);
        (loss, scores)
    }
}

/// exp(-‖left - right‖₁) per row: [batch, d] × [batch, d] → [batch, 1]
pub fn exp_neg_manhattan<B: Backend>(left: Tensor<B, 2>, right: Tensor<B, 2>) -> Tensor<B, 2> {
    (left - right).abs().sum_dim(1).neg().exp()
}
