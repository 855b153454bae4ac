/*
 * @Author       : 老董
 * @Date         : 2026-01-19
 * @Description  : 逐元素乘法节点 C = A ⊙ B（Hadamard 积），支持 NumPy 风格广播
 */

use super::broadcast_parents_shape;
use crate::nn::nodes::raw_node::{TraitNode, VjpContext};
use crate::nn::nodes::NodeHandle;
use crate::nn::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;

#[derive(Debug, Clone)]
pub(in crate::nn) struct Multiply {
    shape: Vec<usize>,
}

impl Multiply {
    pub(in crate::nn) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        Ok(Self {
            shape: broadcast_parents_shape("Multiply", parents)?,
        })
    }
}

impl TraitNode for Multiply {
    fn type_name(&self) -> &'static str {
        "Multiply"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0] * parents[1])
    }

    /// ∂L/∂A = sum_to(g ⊙ B, shape_A)，∂L/∂B = sum_to(g ⊙ A, shape_B)
    fn build_grad_to_parents(
        &self,
        graph: &mut GraphInner,
        ctx: &VjpContext<'_>,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        let mut grads = Vec::with_capacity(2);
        for (i, &parent) in ctx.parents.iter().enumerate() {
            if !ctx.needs[i] {
                grads.push(None);
                continue;
            }
            let other = ctx.parents[1 - i];
            let product = graph.new_multiply_node(ctx.upstream, other, None)?;
            grads.push(Some(graph.reduce_grad_to_parent(product, parent)?));
        }
        Ok(grads)
    }
}
