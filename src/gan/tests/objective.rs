/*
 * @Author       : 老董
 * @Description  : Wasserstein 损失与 WGAN-GP 目标函数测试
 */

use crate::gan::{
    ConfigError, DiscriminatorLoss, GeneratorLoss, GradientPenalty, WganGp, WganGpConfig,
};
use crate::nn::{Graph, Init, Linear, Var};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

/// 线性判别器 f = x @ [3, 4]ᵀ，以及真实/生成/插值样本
fn linear_critic(graph: &Graph) -> (Linear, Var, Var, Var) {
    let critic = Linear::with_init(graph, 2, 1, false, Init::Zeros, "critic").unwrap();
    critic
        .weights()
        .set_value(&Tensor::new(&[3., 4.], &[2, 1]))
        .unwrap();
    let real = graph.input(&Tensor::new(&[1., 0., 0., 1.], &[2, 2])).unwrap();
    let fake = graph.input(&Tensor::new(&[-1., 0., 0., 0.], &[2, 2])).unwrap();
    let x_hat = GradientPenalty::interpolate(
        graph,
        &Tensor::new(&[1., 0., 0., 1.], &[2, 2]),
        &Tensor::new(&[-1., 0., 0., 0.], &[2, 2]),
    )
    .unwrap();
    (critic, real, fake, x_hat)
}

#[test]
fn test_discriminator_loss() {
    let graph = Graph::new();
    let f_real = graph.input(&Tensor::new(&[3., 0.5, -1.], &[3, 1])).unwrap();
    let f_fake = graph.input(&Tensor::new(&[-3., 0., 2.], &[3, 1])).unwrap();

    let (loss_real, loss_fake) = DiscriminatorLoss::new().compute(&f_real, &f_fake).unwrap();
    // mean(relu(1 − [3, 0.5, −1])) = (0 + 0.5 + 2) / 3
    assert_abs_diff_eq!(loss_real.item().unwrap(), 2.5 / 3., epsilon = 1e-6);
    // mean(relu(1 + [−3, 0, 2])) = (0 + 1 + 3) / 3
    assert_abs_diff_eq!(loss_fake.item().unwrap(), 4. / 3., epsilon = 1e-6);
}

#[test]
fn test_generator_loss() {
    let graph = Graph::new();
    let f_fake = graph.input(&Tensor::new(&[-3., 0., 2.], &[3, 1])).unwrap();
    let loss = GeneratorLoss::new().compute(&f_fake);
    assert_abs_diff_eq!(loss.item().unwrap(), 1. / 3., epsilon = 1e-6);
}

#[test]
fn test_critic_loss() {
    let graph = Graph::new();
    let (critic, real, fake, x_hat) = linear_critic(&graph);
    let wgan = WganGp::new(WganGpConfig::default()).unwrap();

    let f_real = critic.forward(&real).unwrap();
    let f_fake = critic.forward(&fake).unwrap();
    let f_hat = critic.forward(&x_hat).unwrap();
    let losses = wgan.critic_loss(&f_real, &f_fake, &x_hat, &f_hat).unwrap();

    // f_real = [3, 4] => 0；f_fake = [−3, 0] => 0.5；‖W‖ = 5 => penalty = 16
    assert_abs_diff_eq!(losses.real.item().unwrap(), 0., epsilon = 1e-6);
    assert_abs_diff_eq!(losses.fake.item().unwrap(), 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(losses.penalty.item().unwrap(), 16., epsilon = 1e-4);
    assert_abs_diff_eq!(losses.total.backward().unwrap(), 160.5, epsilon = 1e-3);

    // 只有惩罚项对 W 有梯度：10 · [4.8, 6.4]
    assert_abs_diff_eq!(
        critic.weights().grad().unwrap().unwrap(),
        Tensor::new(&[48., 64.], &[2, 1]),
        epsilon = 1e-3
    );

    // 同一组节点再次计算时复用惩罚子图
    let again = wgan.critic_loss(&f_real, &f_fake, &x_hat, &f_hat).unwrap();
    assert_eq!(again.penalty.node_id(), losses.penalty.node_id());
    assert_eq!(wgan.gradient_penalty().cache_size(), 1);

    assert_abs_diff_eq!(wgan.generator_loss(&f_fake).item().unwrap(), 1.5, epsilon = 1e-6);
}

#[test]
fn test_critic_loss_coefficient() {
    let graph = Graph::new();
    let (critic, real, fake, x_hat) = linear_critic(&graph);
    let wgan = WganGp::new(WganGpConfig::new(0.).unwrap()).unwrap();
    assert_eq!(wgan.config().gradient_penalty_coefficient, 0.);

    let f_real = critic.forward(&real).unwrap();
    let f_fake = critic.forward(&fake).unwrap();
    let f_hat = critic.forward(&x_hat).unwrap();
    let losses = wgan.critic_loss(&f_real, &f_fake, &x_hat, &f_hat).unwrap();
    assert_abs_diff_eq!(losses.total.item().unwrap(), 0.5, epsilon = 1e-6);

    let invalid = WganGpConfig {
        gradient_penalty_coefficient: -1.,
    };
    assert!(matches!(WganGp::new(invalid), Err(ConfigError::Invalid(_))));
}
