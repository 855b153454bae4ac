use super::unary_parent_shape;
use crate::nn::nodes::raw_node::{TraitNode, VjpContext};
use crate::nn::nodes::NodeHandle;
use crate::nn::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;

/// 逐元素平方节点 y = x²
#[derive(Debug, Clone)]
pub(in crate::nn) struct Square {
    shape: Vec<usize>,
}

impl Square {
    pub(in crate::nn) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        Ok(Self {
            shape: unary_parent_shape("Square", parents)?,
        })
    }
}

impl TraitNode for Square {
    fn type_name(&self) -> &'static str {
        "Square"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].square())
    }

    /// ∂L/∂x = g ⊙ 2x
    fn build_grad_to_parents(
        &self,
        graph: &mut GraphInner,
        ctx: &VjpContext<'_>,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        let double = graph.new_scalar_multiply_node(ctx.parents[0], 2.0, None)?;
        let grad = graph.new_multiply_node(ctx.upstream, double, None)?;
        Ok(vec![Some(grad)])
    }
}
