/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 逐元素开方节点 y = √x
 *
 * x = 0 处导数不存在，这里取次梯度 0（梯度经安全除法计算），
 * 因此全零的输入不会让梯度出现 NaN/inf。
 */

use super::unary_parent_shape;
use crate::nn::nodes::raw_node::{TraitNode, VjpContext};
use crate::nn::nodes::NodeHandle;
use crate::nn::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;

#[derive(Debug, Clone)]
pub(in crate::nn) struct Sqrt {
    shape: Vec<usize>,
}

impl Sqrt {
    pub(in crate::nn) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        Ok(Self {
            shape: unary_parent_shape("Sqrt", parents)?,
        })
    }
}

impl TraitNode for Sqrt {
    fn type_name(&self) -> &'static str {
        "Sqrt"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].sqrt())
    }

    /// ∂L/∂x = 0.5 · g / y（y = 0 处为 0）
    fn build_grad_to_parents(
        &self,
        graph: &mut GraphInner,
        ctx: &VjpContext<'_>,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        let half = graph.new_scalar_multiply_node(ctx.upstream, 0.5, None)?;
        let grad = graph.new_safe_divide_node(half, ctx.node, None)?;
        Ok(vec![Some(grad)])
    }
}
