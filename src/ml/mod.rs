// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains the Burn model code: architecture,
// training loop and batched scoring.
//
// What's in this layer:
//
//   model.rs      — The siamese LSTM architecture
//                   • Frozen embedding from the vocabulary's matrix
//                   • Keras-style LSTM (64 units, full sequence)
//                   • Keras-style LSTM (50 units, ReLU, last state)
//                   • exp(-L1) merge of the two branches
//
//   trainer.rs    — The training loop
//                   Forward pass, MSE loss, backward pass,
//                   Adam step, validation, metrics CSV and
//                   checkpoint saving per epoch
//
//   inferencer.rs — The scoring engine
//                   Loads a checkpoint, batches padded pairs,
//                   returns one similarity per pair in order
//
// Backends:
//   cpu → NdArray   (pure Rust, always available)
//   gpu → Wgpu      (Vulkan / Metal / DX12 through wgpu)
//   Training wraps either one in Autodiff.
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

use serde::{Deserialize, Serialize};

/// Siamese LSTM architecture
pub mod model;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Inference engine — loads checkpoint and scores pairs
pub mod inferencer;

pub type CpuBackend = burn::backend::NdArray;
pub type GpuBackend = burn::backend::Wgpu;

/// Where tensors live for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComputeDevice {
    Cpu,
    Gpu,
}

impl ComputeDevice {
    pub fn cpu_device() -> burn::backend::ndarray::NdArrayDevice {
        burn::backend::ndarray::NdArrayDevice::Cpu
    }

    pub fn gpu_device() -> burn::backend::wgpu::WgpuDevice {
        burn::backend::wgpu::WgpuDevice::default()
    }
}
