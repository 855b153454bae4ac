/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : WGAN-GP：梯度惩罚项、Wasserstein 损失以及判别器/生成器的完整目标函数
 */

mod config;
mod gradient_penalty;
mod objective;
mod wasserstein;

pub use config::{ConfigError, WganGpConfig};
pub use gradient_penalty::GradientPenalty;
pub use objective::{CriticLoss, WganGp};
pub use wasserstein::{DiscriminatorLoss, GeneratorLoss};

#[cfg(test)]
mod tests;
