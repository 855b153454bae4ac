use super::unary_parent_shape;
use crate::nn::nodes::raw_node::{TraitNode, VjpContext};
use crate::nn::nodes::NodeHandle;
use crate::nn::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;

/// 矩阵转置节点
#[derive(Debug, Clone)]
pub(in crate::nn) struct Transpose {
    shape: Vec<usize>,
}

impl Transpose {
    pub(in crate::nn) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        let parent_shape = unary_parent_shape("Transpose", parents)?;
        if parent_shape.len() != 2 {
            return Err(GraphError::DimensionMismatch {
                expected: 2,
                got: parent_shape.len(),
                message: "Transpose 节点只支持矩阵".to_string(),
            });
        }
        Ok(Self {
            shape: vec![parent_shape[1], parent_shape[0]],
        })
    }
}

impl TraitNode for Transpose {
    fn type_name(&self) -> &'static str {
        "Transpose"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].transpose())
    }

    fn build_grad_to_parents(
        &self,
        graph: &mut GraphInner,
        ctx: &VjpContext<'_>,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        Ok(vec![Some(graph.new_transpose_node(ctx.upstream, None)?)])
    }
}
