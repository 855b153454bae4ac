/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : Var 归约扩展 trait
 *
 * 整体归约（sum/mean）的结果形状为 [1, 1]；按轴归约保留该维度（长度变为 1）。
 */

use super::math::VarMathOps;
use crate::nn::{GraphError, Var};

/// 归约扩展 trait
///
/// # 使用示例
/// ```ignore
/// use wgan_gp::nn::VarReduceOps;
///
/// let loss = x.mean();               // [1, 1]
/// let row_sums = x.sum_axis(1)?;     // [N, D] -> [N, 1]
/// let norms = x.l2_norm(1)?;         // [N, D] -> [N, 1]
/// ```
pub trait VarReduceOps {
    /// 所有元素求和，形状为 [1, 1]
    fn sum(&self) -> Var;

    /// 所有元素的均值，形状为 [1, 1]
    fn mean(&self) -> Var;

    /// 沿`axis`求和（保留该维度）
    fn sum_axis(&self, axis: usize) -> Result<Var, GraphError>;

    /// 沿`axis`求 L2 范数 √(Σ x²)（保留该维度）
    fn l2_norm(&self, axis: usize) -> Result<Var, GraphError>;
}

impl VarReduceOps for Var {
    fn sum(&self) -> Var {
        let id = self
            .graph()
            .borrow_mut()
            .new_sum_to_node(self.node_id(), &[1, 1], None)
            .expect("创建求和节点失败");
        self.wrap(id)
    }

    fn mean(&self) -> Var {
        let size: usize = self.value_expected_shape().iter().product();
        let sum = self.sum();
        &sum * (1.0 / size as f32)
    }

    fn sum_axis(&self, axis: usize) -> Result<Var, GraphError> {
        let mut target = self.value_expected_shape();
        if axis >= target.len() {
            return Err(GraphError::DimensionMismatch {
                expected: axis + 1,
                got: target.len(),
                message: format!("sum_axis 的维度{}越界", axis),
            });
        }
        target[axis] = 1;
        let id = self
            .graph()
            .borrow_mut()
            .new_sum_to_node(self.node_id(), &target, None)?;
        Ok(self.wrap(id))
    }

    fn l2_norm(&self, axis: usize) -> Result<Var, GraphError> {
        Ok(self.square().sum_axis(axis)?.sqrt())
    }
}
