use candle_core::{DType, Device, Tensor};
use policyrag_embed::masked_mean_l2;

fn hidden(values: &[f32], shape: (usize, usize, usize)) -> Tensor {
    Tensor::from_slice(values, shape, &Device::Cpu).unwrap()
}

#[test]
fn padding_tokens_do_not_contribute() {
    // Row 0: second token is padding. Row 1: both tokens are real.
    let h = hidden(&[3.0, 4.0, 100.0, 100.0, 1.0, 0.0, 3.0, 0.0], (2, 2, 2));
    let mask = Tensor::from_slice(&[1u32, 0, 1, 1], (2, 2), &Device::Cpu).unwrap();
    let out: Vec<Vec<f32>> = masked_mean_l2(&h, &mask).unwrap().to_vec2().unwrap();
    assert!((out[0][0] - 0.6).abs() < 1e-6 && (out[0][1] - 0.8).abs() < 1e-6, "{:?}", out[0]);
    assert!((out[1][0] - 1.0).abs() < 1e-6 && out[1][1].abs() < 1e-6, "{:?}", out[1]);
}

#[test]
fn fully_masked_row_pools_to_zero() {
    let h = hidden(&[1.0, 2.0, 3.0, 4.0], (1, 2, 2));
    let mask = Tensor::zeros((1, 2), DType::F32, &Device::Cpu).unwrap();
    let out: Vec<Vec<f32>> = masked_mean_l2(&h, &mask).unwrap().to_vec2().unwrap();
    assert!(out[0].iter().all(|x| *x == 0.0 && x.is_finite()));
}

#[test]
fn rejects_bad_shapes() {
    let dev = Device::Cpu;
    let rank_two = Tensor::zeros((2, 4), DType::F32, &dev).unwrap();
    assert!(masked_mean_l2(&rank_two, &Tensor::ones((2, 1), DType::F32, &dev).unwrap()).is_err());
    let h = Tensor::zeros((1, 3, 4), DType::F32, &dev).unwrap();
    assert!(masked_mean_l2(&h, &Tensor::ones((1, 2), DType::F32, &dev).unwrap()).is_err());
}
