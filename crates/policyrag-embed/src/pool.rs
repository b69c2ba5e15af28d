//! Sentence pooling over encoder hidden states.

use anyhow::{ensure, Result};
use candle_core::{DType, Tensor, D};

/// Mean of the hidden states of unmasked tokens, scaled to unit L2 norm.
///
/// `hidden` is `[batch, tokens, width]` and `attention_mask` is
/// `[batch, tokens]` (any dtype, non-zero meaning "real token"). A row with
/// no real tokens pools to the zero vector.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (batch, tokens, width) = hidden.dims3()?;
    ensure!(
        attention_mask.dims() == [batch, tokens],
        "attention mask {:?} does not match hidden states {:?}",
        attention_mask.dims(),
        hidden.dims()
    );
    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let summed = hidden.broadcast_mul(&mask.unsqueeze(D::Minus1)?)?.sum(1)?;
    let counts = mask.sum_keepdim(1)?.maximum(1f64)?;
    let mean = summed.broadcast_div(&counts)?;
    let norms = mean.sqr()?.sum_keepdim(1)?.sqrt()?.maximum(norm_floor(hidden.dtype()))?;
    let pooled = mean.broadcast_div(&norms)?;
    ensure!(pooled.dims() == [batch, width], "pooled shape {:?}", pooled.dims());
    Ok(pooled)
}

fn norm_floor(dtype: DType) -> f64 {
    match dtype {
        DType::F16 | DType::BF16 => 1e-6,
        _ => 1e-12,
    }
}
