/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : Wasserstein GAN 损失
 *
 * 判别器：L_D = mean(ReLU(1 − D(x))) + mean(ReLU(1 + D(G(z))))
 * 生成器：L_G = −mean(D(G(z)))
 */

use crate::nn::{GraphError, Var, VarActivationOps, VarReduceOps};

/// 判别器（critic）损失
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscriminatorLoss;

impl DiscriminatorLoss {
    pub const fn new() -> Self {
        Self
    }

    /// 返回（真实样本部分，生成样本部分），两者均为[1, 1]节点
    ///
    /// 两部分分开返回，便于分别记录日志或加权
    pub fn compute(&self, f_real: &Var, f_fake: &Var) -> Result<(Var, Var), GraphError> {
        f_real.check_same_graph(f_fake, "判别器损失计算")?;
        let loss_real = (-f_real + 1.0).relu().mean();
        let loss_fake = (f_fake + 1.0).relu().mean();
        Ok((loss_real, loss_fake))
    }
}

/// 生成器损失
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratorLoss;

impl GeneratorLoss {
    pub const fn new() -> Self {
        Self
    }

    pub fn compute(&self, f_fake: &Var) -> Var {
        -f_fake.mean()
    }
}
