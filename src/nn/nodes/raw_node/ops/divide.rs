/*
 * @Author       : 老董
 * @Date         : 2026-01-19
 * @Description  : 逐元素除法节点 C = A / B，支持 NumPy 风格广播
 *
 * “安全除法”变体约定除数为 0 的位置结果为 0，并要求两个父节点形状一致；
 * 它用来表达 sqrt 在 0 处取 0 的次梯度，梯度经过它时同样遵守该约定。
 */

use super::broadcast_parents_shape;
use crate::nn::nodes::raw_node::{TraitNode, VjpContext};
use crate::nn::nodes::NodeHandle;
use crate::nn::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;

#[derive(Debug, Clone)]
pub(in crate::nn) struct Divide {
    shape: Vec<usize>,
    safe: bool,
}

impl Divide {
    pub(in crate::nn) fn new(parents: &[&NodeHandle], safe: bool) -> Result<Self, GraphError> {
        let shape = broadcast_parents_shape("Divide", parents)?;
        if safe && parents[0].value_expected_shape() != parents[1].value_expected_shape() {
            return Err(GraphError::ShapeMismatch {
                expected: parents[0].value_expected_shape().to_vec(),
                got: parents[1].value_expected_shape().to_vec(),
                message: "安全除法要求被除数与除数形状一致".to_string(),
            });
        }
        Ok(Self { shape, safe })
    }

    fn divide(&self, graph: &mut GraphInner, a: NodeId, b: NodeId) -> Result<NodeId, GraphError> {
        if self.safe {
            graph.new_safe_divide_node(a, b, None)
        } else {
            graph.new_divide_node(a, b, None)
        }
    }
}

impl TraitNode for Divide {
    fn type_name(&self) -> &'static str {
        if self.safe { "SafeDivide" } else { "Divide" }
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        if self.safe {
            Ok(parents[0].safe_div(parents[1]))
        } else {
            Ok(parents[0] / parents[1])
        }
    }

    /// ∂L/∂A = sum_to(g / B, shape_A)，∂L/∂B = sum_to(-(g ⊙ C) / B, shape_B)
    fn build_grad_to_parents(
        &self,
        graph: &mut GraphInner,
        ctx: &VjpContext<'_>,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        let (numerator, divisor) = (ctx.parents[0], ctx.parents[1]);
        let numerator_grad = if ctx.needs[0] {
            let quotient = self.divide(graph, ctx.upstream, divisor)?;
            Some(graph.reduce_grad_to_parent(quotient, numerator)?)
        } else {
            None
        };
        let divisor_grad = if ctx.needs[1] {
            let product = graph.new_multiply_node(ctx.upstream, ctx.node, None)?;
            let quotient = self.divide(graph, product, divisor)?;
            let negated = graph.new_scalar_multiply_node(quotient, -1.0, None)?;
            Some(graph.reduce_grad_to_parent(negated, divisor)?)
        } else {
            None
        };
        Ok(vec![numerator_grad, divisor_grad])
    }
}
