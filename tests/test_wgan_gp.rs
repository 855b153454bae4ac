/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : WGAN-GP 集成测试
 *                 验证：梯度惩罚项的解析值 + 用判别器损失（含惩罚项）训练一个小判别器
 */

use wgan_gp::gan::{GradientPenalty, WganGp, WganGpConfig};
use wgan_gp::nn::{
    Graph, GraphError, Linear, Module, Var, VarActivationOps, VarReduceOps,
};
use wgan_gp::tensor::Tensor;

/// 判别器：x(2) -> FC(8, Tanh) -> FC(1)
struct Critic {
    fc1: Linear,
    fc2: Linear,
}

impl Critic {
    fn new(graph: &Graph) -> Result<Self, GraphError> {
        Ok(Self {
            fc1: Linear::new(graph, 2, 8, true, "fc1")?,
            fc2: Linear::new(graph, 8, 1, true, "fc2")?,
        })
    }

    fn forward(&self, x: &Var) -> Result<Var, GraphError> {
        let h = self.fc1.forward(x)?.tanh();
        self.fc2.forward(&h)
    }
}

impl Module for Critic {
    fn parameters(&self) -> Vec<Var> {
        [self.fc1.parameters(), self.fc2.parameters()].concat()
    }
}

/// 手写的 SGD：p ← p − lr·∇p
fn sgd_step(params: &[Var], lr: f32) -> Result<(), GraphError> {
    for param in params {
        if let (Some(value), Some(grad)) = (param.value()?, param.grad()?) {
            param.set_value(&(value - lr * grad))?;
        }
    }
    Ok(())
}

#[test]
fn test_gradient_penalty_concrete() -> Result<(), GraphError> {
    let graph = Graph::new();
    let x = graph.input_with_grad(&Tensor::new(&[1., 1., 2., 2.], &[2, 2]))?;
    let f = x.sum_axis(1)?;
    let penalty = GradientPenalty::new().compute(&x, &f)?;

    let value = penalty.item()?;
    println!("f = x.sum(dim=1)，x = [[1, 1], [2, 2]]：惩罚项 = {:.4}", value);
    assert!((value - (2f32.sqrt() - 1.).powi(2)).abs() < 1e-5);
    Ok(())
}

#[test]
fn test_wgan_gp_critic_training() -> Result<(), GraphError> {
    println!("\n{}", "=".repeat(60));
    println!("=== WGAN-GP 判别器训练集成测试 ===");
    println!("{}\n", "=".repeat(60));

    // ========== 1. 数据 ==========
    let batch_size = 16;
    let graph = Graph::new_with_seed(42);
    let real_data = graph.sample_uniform(&[batch_size, 2], 0.5, 1.5);
    let fake_data = graph.sample_uniform(&[batch_size, 2], -1.5, -0.5);

    // ========== 2. 构建网络与损失（只建一次图） ==========
    let critic = Critic::new(&graph)?;
    let real = graph.input_named(&real_data, "real")?;
    let fake = graph.input_named(&fake_data, "fake")?;
    let x_hat = GradientPenalty::interpolate(&graph, &real_data, &fake_data)?;

    let f_real = critic.forward(&real)?;
    let f_fake = critic.forward(&fake)?;
    let f_hat = critic.forward(&x_hat)?;

    let config = WganGpConfig::from_json_str(r#"{ "gradient_penalty_coefficient": 10.0 }"#)
        .expect("解析配置失败");
    let wgan = WganGp::new(config).expect("配置无效");
    let losses = wgan.critic_loss(&f_real, &f_fake, &x_hat, &f_hat)?;
    let nodes_count = graph.nodes_count();
    println!("计算图节点数：{}，参数个数：{}", nodes_count, critic.num_params());

    // ========== 3. 训练 ==========
    let params = critic.parameters();
    let lr = 0.02;
    let epochs = 300;
    let mut history = Vec::with_capacity(epochs);
    for epoch in 0..epochs {
        x_hat.set_value(&GradientPenalty::sample_interpolation(
            &graph,
            &real_data,
            &fake_data,
        )?)?;
        graph.zero_grad()?;
        let total = losses.total.backward()?;
        sgd_step(&params, lr)?;
        history.push(total);

        if epoch % 50 == 0 {
            println!(
                "epoch {:>3}: total = {:.4}，real = {:.4}，fake = {:.4}，penalty = {:.4}",
                epoch,
                total,
                losses.real.item()?,
                losses.fake.item()?,
                losses.penalty.item()?
            );
        }
    }

    // ========== 4. 验证 ==========
    // 反向传播的临时节点全部清理
    assert_eq!(graph.nodes_count(), nodes_count);

    let head: f32 = history[..10].iter().sum::<f32>() / 10.;
    let tail: f32 = history[epochs - 10..].iter().sum::<f32>() / 10.;
    println!("\n前 10 轮平均损失：{:.4}，后 10 轮平均损失：{:.4}", head, tail);
    assert!(tail < head, "判别器损失没有下降：{head} -> {tail}");

    // 判别器能区分真实样本与生成样本
    let score_real = f_real.mean().item()?;
    let score_fake = f_fake.mean().item()?;
    println!("D(real) = {:.4}，D(fake) = {:.4}", score_real, score_fake);
    assert!(score_real > score_fake);

    println!("\n生成器损失：{:.4}", wgan.generator_loss(&f_fake).item()?);
    Ok(())
}
