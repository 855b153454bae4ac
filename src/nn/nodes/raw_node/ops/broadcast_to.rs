/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : BroadcastTo 节点：把父节点广播到目标形状（SumTo 的伴随）
 *
 * 只含 1 个元素的父节点可以填充到任意形状；否则遵循 NumPy 广播规则。
 */

use super::unary_parent_shape;
use crate::nn::nodes::raw_node::{TraitNode, VjpContext};
use crate::nn::nodes::NodeHandle;
use crate::nn::{GraphError, GraphInner, NodeId};
use crate::tensor::{Tensor, broadcast_shape};

#[derive(Debug, Clone)]
pub(in crate::nn) struct BroadcastTo {
    shape: Vec<usize>,
    parent_shape: Vec<usize>,
}

impl BroadcastTo {
    pub(in crate::nn) fn new(parents: &[&NodeHandle], target: &[usize]) -> Result<Self, GraphError> {
        let parent_shape = unary_parent_shape("BroadcastTo", parents)?;
        let fills = !target.is_empty() && parent_shape.iter().product::<usize>() == 1;
        let broadcastable =
            broadcast_shape(&parent_shape, target).as_deref() == Some(target);
        if !fills && !broadcastable {
            return Err(GraphError::ShapeMismatch {
                expected: target.to_vec(),
                got: parent_shape,
                message: "BroadcastTo 的父节点形状无法广播到目标形状".to_string(),
            });
        }
        Ok(Self {
            shape: target.to_vec(),
            parent_shape,
        })
    }
}

impl TraitNode for BroadcastTo {
    fn type_name(&self) -> &'static str {
        "BroadcastTo"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].broadcast_to(&self.shape))
    }

    fn build_grad_to_parents(
        &self,
        graph: &mut GraphInner,
        ctx: &VjpContext<'_>,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        let grad = graph.new_sum_to_node(ctx.upstream, &self.parent_shape, None)?;
        Ok(vec![Some(grad)])
    }
}
