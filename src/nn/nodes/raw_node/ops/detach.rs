use super::unary_parent_shape;
use crate::nn::nodes::raw_node::{TraitNode, VjpContext};
use crate::nn::nodes::NodeHandle;
use crate::nn::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;

/// Detach 节点：值与父节点相同，但梯度不会穿过它
#[derive(Debug, Clone)]
pub(in crate::nn) struct Detach {
    shape: Vec<usize>,
}

impl Detach {
    pub(in crate::nn) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        Ok(Self {
            shape: unary_parent_shape("Detach", parents)?,
        })
    }
}

impl TraitNode for Detach {
    fn type_name(&self) -> &'static str {
        "Detach"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn is_differentiable(&self) -> bool {
        false
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].clone())
    }

    fn build_grad_to_parents(
        &self,
        _graph: &mut GraphInner,
        _ctx: &VjpContext<'_>,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        Ok(vec![None])
    }
}
