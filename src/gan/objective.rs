/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : WGAN-GP 目标函数：把 Wasserstein 损失与梯度惩罚项组合起来
 */

use super::{
    ConfigError, DiscriminatorLoss, GeneratorLoss, GradientPenalty, WganGpConfig,
};
use crate::nn::{GraphError, Var};

/// 判别器一次迭代的各项损失（均为[1, 1]节点）
#[derive(Clone)]
pub struct CriticLoss {
    /// total = real + fake + λ·penalty，对它调用 backward
    pub total: Var,
    pub real: Var,
    pub fake: Var,
    pub penalty: Var,
}

/// WGAN-GP 目标函数
///
/// ```ignore
/// let wgan = WganGp::new(WganGpConfig::default())?;
/// let losses = wgan.critic_loss(&f_real, &f_fake, &x_hat, &f_hat)?;
/// losses.total.backward()?;
/// let g_loss = wgan.generator_loss(&critic.forward(&fake)?);
/// ```
pub struct WganGp {
    config: WganGpConfig,
    gradient_penalty: GradientPenalty,
    discriminator_loss: DiscriminatorLoss,
    generator_loss: GeneratorLoss,
}

impl WganGp {
    pub fn new(config: WganGpConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            gradient_penalty: GradientPenalty::new(),
            discriminator_loss: DiscriminatorLoss::new(),
            generator_loss: GeneratorLoss::new(),
        })
    }

    pub const fn config(&self) -> &WganGpConfig {
        &self.config
    }

    pub const fn gradient_penalty(&self) -> &GradientPenalty {
        &self.gradient_penalty
    }

    /// 判别器损失
    ///
    /// # 参数
    /// - `f_real`/`f_fake`: 判别器在真实/生成样本上的输出
    /// - `x_hat`: 插值样本（需要梯度）
    /// - `f_hat`: 判别器在插值样本上的输出
    pub fn critic_loss(
        &self,
        f_real: &Var,
        f_fake: &Var,
        x_hat: &Var,
        f_hat: &Var,
    ) -> Result<CriticLoss, GraphError> {
        let (real, fake) = self.discriminator_loss.compute(f_real, f_fake)?;
        let penalty = self.gradient_penalty.compute(x_hat, f_hat)?;
        let weighted_penalty = penalty.try_scale(self.config.gradient_penalty_coefficient)?;
        let total = real.try_add(&fake)?.try_add(&weighted_penalty)?;
        log::trace!(
            "判别器损失：total={}，real={}，fake={}，penalty={}",
            total.node_id(),
            real.node_id(),
            fake.node_id(),
            penalty.node_id()
        );
        Ok(CriticLoss {
            total,
            real,
            fake,
            penalty,
        })
    }

    pub fn generator_loss(&self, f_fake: &Var) -> Var {
        self.generator_loss.compute(f_fake)
    }
}
