use super::unary_parent_shape;
use crate::nn::nodes::raw_node::{TraitNode, VjpContext};
use crate::nn::nodes::NodeHandle;
use crate::nn::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;

/// Tanh 激活节点
#[derive(Debug, Clone)]
pub(in crate::nn) struct Tanh {
    shape: Vec<usize>,
}

impl Tanh {
    pub(in crate::nn) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        Ok(Self {
            shape: unary_parent_shape("Tanh", parents)?,
        })
    }
}

impl TraitNode for Tanh {
    fn type_name(&self) -> &'static str {
        "Tanh"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].tanh())
    }

    /// ∂L/∂x = g ⊙ (1 - y²) = g - g ⊙ y²
    fn build_grad_to_parents(
        &self,
        graph: &mut GraphInner,
        ctx: &VjpContext<'_>,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        let y_squared = graph.new_square_node(ctx.node, None)?;
        let scaled = graph.new_multiply_node(ctx.upstream, y_squared, None)?;
        let grad = graph.new_subtract_node(ctx.upstream, scaled, None)?;
        Ok(vec![Some(grad)])
    }
}
