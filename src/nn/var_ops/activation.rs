/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @Description  : Var 激活函数扩展 trait
 *
 * 提供激活函数的链式调用支持，用户需 import 此 trait 后才能使用。
 */

use crate::nn::Var;

/// 激活函数扩展 trait
///
/// 提供常用激活函数的链式调用：
/// - `relu()`: `ReLU` 激活
/// - `leaky_relu(slope)`: `LeakyReLU` 激活
/// - `tanh()`: Tanh 激活
///
/// 这些激活函数的梯度同样由图节点表示，因此可以二次求导
/// （`ReLU`/`LeakyReLU` 的二阶导数几乎处处为 0）。
pub trait VarActivationOps {
    /// `ReLU` 激活：max(0, x)
    fn relu(&self) -> Var;

    /// `LeakyReLU` 激活：x if x > 0 else slope * x
    fn leaky_relu(&self, slope: f32) -> Var;

    /// Tanh 激活：(exp(x) - exp(-x)) / (exp(x) + exp(-x))
    fn tanh(&self) -> Var;
}

impl VarActivationOps for Var {
    fn relu(&self) -> Var {
        self.leaky_relu(0.0)
    }

    fn leaky_relu(&self, slope: f32) -> Var {
        let id = self
            .graph()
            .borrow_mut()
            .new_leaky_relu_node(self.node_id(), slope, None)
            .expect("创建 LeakyReLU 节点失败");
        self.wrap(id)
    }

    fn tanh(&self) -> Var {
        let id = self
            .graph()
            .borrow_mut()
            .new_tanh_node(self.node_id(), None)
            .expect("创建 Tanh 节点失败");
        self.wrap(id)
    }
}
