/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @Description  : Var 矩阵运算扩展 trait
 */

use crate::nn::{GraphError, Var};

/// 矩阵运算扩展 trait
///
/// # 使用示例
/// ```ignore
/// use wgan_gp::nn::VarMatrixOps;
///
/// let y = x.matmul(&w)?;  // [batch, in] @ [in, out] = [batch, out]
/// ```
pub trait VarMatrixOps {
    /// 矩阵乘法：[m, k] @ [k, n] = [m, n]
    fn matmul(&self, other: &Var) -> Result<Var, GraphError>;
}

impl VarMatrixOps for Var {
    fn matmul(&self, other: &Var) -> Result<Var, GraphError> {
        self.check_same_graph(other, "矩阵乘法")?;
        let id = self
            .graph()
            .borrow_mut()
            .new_mat_mul_node(self.node_id(), other.node_id(), None)?;
        Ok(self.wrap(id))
    }
}
