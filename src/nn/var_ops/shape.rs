/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @Description  : Var 形状变换扩展 trait
 *
 * 提供张量形状变换的链式调用支持，用户需 import 此 trait 后才能使用。
 */

use crate::nn::{GraphError, Var};

/// 形状变换扩展 trait
///
/// 提供张量形状变换的链式调用：
/// - `reshape(shape)`: 变形为指定形状
/// - `flatten()`: 展平为 `[batch, 其余元素]`
/// - `transpose()`: 矩阵转置
/// - `narrow(axis, start, len)`: 沿某一维截取
/// - `broadcast_to(shape)`: 广播到指定形状
///
/// # 使用示例
/// ```ignore
/// use wgan_gp::nn::VarShapeOps;
///
/// let reshaped = x.reshape(&[2, 4])?;
/// let flat = x.flatten()?;
/// let first_column = x.narrow(1, 0, 1)?;
/// ```
pub trait VarShapeOps {
    /// 将张量变形为指定形状，元素总数必须保持一致
    fn reshape(&self, shape: &[usize]) -> Result<Var, GraphError>;

    /// 将张量展平为 `[batch_size, total_other_elements]`，保留 batch 维度。
    /// 对于输入如：`[batch, C, H, W]`，输出：`[batch, C*H*W]`；一维输入 `[N]` 输出 `[N, 1]`
    fn flatten(&self) -> Result<Var, GraphError>;

    /// 矩阵转置
    fn transpose(&self) -> Result<Var, GraphError>;

    /// 沿`axis`截取`[start, start + len)`（保留该维度）
    fn narrow(&self, axis: usize, start: usize, len: usize) -> Result<Var, GraphError>;

    /// 广播到`shape`
    fn broadcast_to(&self, shape: &[usize]) -> Result<Var, GraphError>;
}

impl VarShapeOps for Var {
    fn reshape(&self, shape: &[usize]) -> Result<Var, GraphError> {
        let id = self
            .graph()
            .borrow_mut()
            .new_reshape_node(self.node_id(), shape, None)?;
        Ok(self.wrap(id))
    }

    fn flatten(&self) -> Result<Var, GraphError> {
        let shape = self.value_expected_shape();
        let batch = shape.first().copied().unwrap_or(1);
        let rest: usize = shape.iter().skip(1).product();
        self.reshape(&[batch, rest])
    }

    fn transpose(&self) -> Result<Var, GraphError> {
        let id = self
            .graph()
            .borrow_mut()
            .new_transpose_node(self.node_id(), None)?;
        Ok(self.wrap(id))
    }

    fn narrow(&self, axis: usize, start: usize, len: usize) -> Result<Var, GraphError> {
        let id = self
            .graph()
            .borrow_mut()
            .new_narrow_node(self.node_id(), axis, start, len, None)?;
        Ok(self.wrap(id))
    }

    fn broadcast_to(&self, shape: &[usize]) -> Result<Var, GraphError> {
        let id = self
            .graph()
            .borrow_mut()
            .new_broadcast_to_node(self.node_id(), shape, None)?;
        Ok(self.wrap(id))
    }
}
