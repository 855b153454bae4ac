/*
 * @Author       : 老董
 * @Date         : 2026-01-19
 * @Description  : 逐元素减法节点 C = A - B，支持 NumPy 风格广播
 */

use super::broadcast_parents_shape;
use crate::nn::nodes::raw_node::{TraitNode, VjpContext};
use crate::nn::nodes::NodeHandle;
use crate::nn::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;

#[derive(Debug, Clone)]
pub(in crate::nn) struct Subtract {
    shape: Vec<usize>,
}

impl Subtract {
    pub(in crate::nn) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        Ok(Self {
            shape: broadcast_parents_shape("Subtract", parents)?,
        })
    }
}

impl TraitNode for Subtract {
    fn type_name(&self) -> &'static str {
        "Subtract"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0] - parents[1])
    }

    /// ∂L/∂A = sum_to(g, shape_A)，∂L/∂B = sum_to(-g, shape_B)
    fn build_grad_to_parents(
        &self,
        graph: &mut GraphInner,
        ctx: &VjpContext<'_>,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        let (left, right) = (ctx.parents[0], ctx.parents[1]);
        let left_grad = if ctx.needs[0] {
            Some(graph.reduce_grad_to_parent(ctx.upstream, left)?)
        } else {
            None
        };
        let right_grad = if ctx.needs[1] {
            let negated = graph.new_scalar_multiply_node(ctx.upstream, -1.0, None)?;
            Some(graph.reduce_grad_to_parent(negated, right)?)
        } else {
            None
        };
        Ok(vec![left_grad, right_grad])
    }
}
