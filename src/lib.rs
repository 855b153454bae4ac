//! # WGAN-GP
//!
//! 用纯rust实现[WGAN-GP](https://arxiv.org/abs/1704.00028)的梯度惩罚项
//! `mean((‖∇ₓ̂ D(x̂)‖₂ − 1)²)`。
//!
//! 惩罚项本身依赖判别器对输入的梯度，训练判别器时还要再对它求导，
//! 因此本库附带了一个支持二阶求导的计算图：每个算子的反向传播都由新的图节点表示，
//! 求导结果仍是可以继续参与计算、继续求导的节点。
//!

pub mod errors;
pub mod gan;
pub mod nn;
pub mod tensor;
pub mod utils;
