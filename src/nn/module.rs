/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : Module trait：由若干层组成的网络（如判别器）统一暴露可训练参数
 */

use super::Var;

/// 网络模块
///
/// 只约定“有哪些参数”：各模块的`forward`签名、构造参数都不一样，不放进 trait。
/// 参数以 Var 返回，可以直接读写值、读取`backward`累积的梯度。
///
/// ```ignore
/// struct Critic {
///     fc1: Linear,
///     fc2: Linear,
/// }
///
/// impl Critic {
///     fn forward(&self, x: &Var) -> Result<Var, GraphError> {
///         let h = self.fc1.forward(x)?.tanh();
///         self.fc2.forward(&h)
///     }
/// }
///
/// impl Module for Critic {
///     fn parameters(&self) -> Vec<Var> {
///         [self.fc1.parameters(), self.fc2.parameters()].concat()
///     }
/// }
///
/// // 手写 SGD
/// for p in critic.parameters() {
///     if let (Some(v), Some(g)) = (p.value()?, p.grad()?) {
///         p.set_value(&(v - lr * g))?;
///     }
/// }
/// ```
pub trait Module {
    /// 所有可训练参数（按创建顺序）
    fn parameters(&self) -> Vec<Var>;

    /// 参数张量的个数（不是元素个数）
    fn num_params(&self) -> usize {
        self.parameters().len()
    }
}
