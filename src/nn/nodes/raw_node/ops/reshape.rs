/*
 * @Author       : 老董
 * @Date         : 2025-12-21
 * @Description  : Reshape 节点：按行优先顺序改变形状，元素总数保持不变；
 *                 梯度只需变形回父节点的形状
 */

use super::unary_parent_shape;
use crate::nn::nodes::raw_node::{TraitNode, VjpContext};
use crate::nn::nodes::NodeHandle;
use crate::nn::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;

#[derive(Debug, Clone)]
pub(in crate::nn) struct Reshape {
    shape: Vec<usize>,
    parent_shape: Vec<usize>,
}

impl Reshape {
    pub(in crate::nn) fn new(parents: &[&NodeHandle], shape: &[usize]) -> Result<Self, GraphError> {
        let parent_shape = unary_parent_shape("Reshape", parents)?;
        if shape.is_empty() {
            return Err(GraphError::InvalidOperation(
                "Reshape 的目标形状不能为空".to_string(),
            ));
        }
        let parent_size: usize = parent_shape.iter().product();
        let target_size: usize = shape.iter().product();
        if parent_size != target_size {
            return Err(GraphError::ShapeMismatch {
                expected: parent_shape,
                got: shape.to_vec(),
                message: format!(
                    "Reshape 前后元素总数必须一致：原形状有{}个元素，目标形状有{}个元素",
                    parent_size, target_size
                ),
            });
        }
        Ok(Self {
            shape: shape.to_vec(),
            parent_shape,
        })
    }
}

impl TraitNode for Reshape {
    fn type_name(&self) -> &'static str {
        "Reshape"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].reshape(&self.shape))
    }

    fn build_grad_to_parents(
        &self,
        graph: &mut GraphInner,
        ctx: &VjpContext<'_>,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        let grad = graph.new_reshape_node(ctx.upstream, &self.parent_shape, None)?;
        Ok(vec![Some(grad)])
    }
}
