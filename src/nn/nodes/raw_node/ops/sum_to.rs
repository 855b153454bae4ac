/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : SumTo 节点：沿被广播的维度求和，归约到目标形状（BroadcastTo 的伴随）
 *
 * 目标只含 1 个元素时表示全部求和；否则目标形状必须能广播回父节点形状。
 * 整体求和（sum/mean）与按轴求和（保留该维度）都由它表达。
 */

use super::unary_parent_shape;
use crate::nn::nodes::raw_node::{TraitNode, VjpContext};
use crate::nn::nodes::NodeHandle;
use crate::nn::{GraphError, GraphInner, NodeId};
use crate::tensor::{Tensor, broadcast_shape};

#[derive(Debug, Clone)]
pub(in crate::nn) struct SumTo {
    shape: Vec<usize>,
    parent_shape: Vec<usize>,
}

impl SumTo {
    pub(in crate::nn) fn new(parents: &[&NodeHandle], target: &[usize]) -> Result<Self, GraphError> {
        let parent_shape = unary_parent_shape("SumTo", parents)?;
        let sums_all = !target.is_empty() && target.iter().product::<usize>() == 1;
        let reducible = target.len() <= parent_shape.len()
            && broadcast_shape(target, &parent_shape).as_deref() == Some(parent_shape.as_slice());
        if !sums_all && !reducible {
            return Err(GraphError::ShapeMismatch {
                expected: parent_shape,
                got: target.to_vec(),
                message: "SumTo 的目标形状无法由父节点形状求和归约得到".to_string(),
            });
        }
        Ok(Self {
            shape: target.to_vec(),
            parent_shape,
        })
    }
}

impl TraitNode for SumTo {
    fn type_name(&self) -> &'static str {
        "SumTo"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].sum_to_shape(&self.shape))
    }

    fn build_grad_to_parents(
        &self,
        graph: &mut GraphInner,
        ctx: &VjpContext<'_>,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        let grad = graph.new_broadcast_to_node(ctx.upstream, &self.parent_shape, None)?;
        Ok(vec![Some(grad)])
    }
}
