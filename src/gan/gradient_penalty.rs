/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : WGAN-GP 梯度惩罚项
 *
 * L_GP = mean((‖∇ₓ̂ D(x̂)‖₂ − 1)²)
 *
 * 其中 x̂ 为真实样本与生成样本之间的插值，D 为判别器（critic）。
 * 惩罚项通过 create_graph 求导构建，本身仍是计算图中的节点，
 * 因此可以直接参与 backward，把二阶梯度传回判别器的参数。
 *
 * ```ignore
 * let gp = GradientPenalty::new();
 * let x_hat = GradientPenalty::interpolate(&graph, &real, &fake)?;
 * let f_hat = critic.forward(&x_hat)?;
 * let penalty = gp.compute(&x_hat, &f_hat)?;
 * for _ in 0..steps {
 *     x_hat.set_value(&GradientPenalty::sample_interpolation(&graph, &real, &fake)?)?;
 *     let penalty = gp.compute(&x_hat, &f_hat)?;  // 复用已建好的惩罚子图
 *     penalty.backward()?;
 * }
 * ```
 */

use crate::nn::autograd::{grad, GradOptions};
use crate::nn::{Graph, GraphError, NodeId, Var, VarMathOps, VarReduceOps, VarShapeOps};
use crate::tensor::Tensor;
use std::cell::RefCell;
use std::collections::HashMap;

/// 梯度惩罚项
///
/// 按（样本节点，判别器输出节点）缓存已经建好的惩罚子图：
/// 训练循环中只需更新样本的值，不会让计算图无限增长。
pub struct GradientPenalty {
    cache: RefCell<HashMap<(NodeId, NodeId), Var>>,
}

impl GradientPenalty {
    pub fn new() -> Self {
        Self {
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// 计算梯度惩罚，返回形状为[1, 1]的节点
    ///
    /// # 参数
    /// - `x`: 插值样本 [N, ...]，必须需要梯度（如`Graph::input_with_grad`创建的节点）
    /// - `f`: 判别器在`x`上的输出，[N, 1] 或 [N]
    ///
    /// # 错误
    /// - `x`不需要梯度，或`f`不依赖任何需要梯度的节点：`RequiresGradMissing`
    /// - `f`与`x`没有可导的连接：`UnusedInput`
    /// - 两者 batch 大小不一致：`ShapeMismatch`
    /// - 两者来自不同的图：`InvalidOperation`
    pub fn compute(&self, x: &Var, f: &Var) -> Result<Var, GraphError> {
        let key = (x.node_id(), f.node_id());
        if let Some(penalty) = self.cache.borrow().get(&key) {
            if penalty.same_graph(x) {
                return Ok(penalty.clone());
            }
        }

        let penalty = Self::build(x, f)?;
        self.cache.borrow_mut().insert(key, penalty.clone());
        Ok(penalty)
    }

    fn build(x: &Var, f: &Var) -> Result<Var, GraphError> {
        x.check_same_graph(f, "梯度惩罚")?;
        let x_shape = x.value_expected_shape();
        let f_shape = f.value_expected_shape();
        if x_shape.is_empty() || f_shape.is_empty() || x_shape[0] != f_shape[0] {
            return Err(GraphError::ShapeMismatch {
                expected: x_shape,
                got: f_shape,
                message: "判别器输出的 batch 大小必须与样本一致".to_string(),
            });
        }

        let seeds = [Tensor::ones(&f_shape)];
        let gradients = grad(&[f], &[x], Some(&seeds[..]), GradOptions::create_graph())?
            .into_iter()
            .next()
            .flatten()
            .ok_or_else(|| GraphError::ComputationError("梯度惩罚未得到样本的梯度".to_string()))?;

        let norm = gradients.flatten()?.l2_norm(1)?;
        let penalty = (norm - 1.0).square().mean();
        log::debug!(
            "梯度惩罚：样本节点{}、判别器输出节点{}，惩罚项节点{}",
            x.node_id(),
            f.node_id(),
            penalty.node_id()
        );
        Ok(penalty)
    }

    /// 已缓存的惩罚子图个数
    pub fn cache_size(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    /// 在真实样本与生成样本之间随机插值，返回需要梯度的新输入节点
    ///
    /// 每个样本独立采样 ε ~ U[0, 1]：x̂ = ε·real + (1 − ε)·fake
    pub fn interpolate(graph: &Graph, real: &Tensor, fake: &Tensor) -> Result<Var, GraphError> {
        let x_hat = Self::sample_interpolation(graph, real, fake)?;
        graph.input_with_grad(&x_hat)
    }

    /// 只计算插值结果（不建立节点），用于更新已有插值节点的值
    pub fn sample_interpolation(
        graph: &Graph,
        real: &Tensor,
        fake: &Tensor,
    ) -> Result<Tensor, GraphError> {
        if real.shape() != fake.shape() || real.dimension() == 0 {
            return Err(GraphError::ShapeMismatch {
                expected: real.shape().to_vec(),
                got: fake.shape().to_vec(),
                message: "插值的真实样本与生成样本形状必须一致，且至少为 1 维".to_string(),
            });
        }
        // ε 形状为 [N, 1, ..., 1]，沿样本以外的维度广播
        let mut epsilon_shape = vec![1; real.dimension()];
        epsilon_shape[0] = real.shape()[0];
        let epsilon = graph.sample_uniform(&epsilon_shape, 0.0, 1.0);
        Ok(&epsilon * real + (1.0 - &epsilon) * fake)
    }
}

impl Default for GradientPenalty {
    fn default() -> Self {
        Self::new()
    }
}
