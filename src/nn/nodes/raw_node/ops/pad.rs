/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : Pad 节点：沿某一维补零到指定长度，父节点放在 [start, start + len) 处（Narrow 的伴随）
 */

use super::narrow::check_axis_range;
use super::unary_parent_shape;
use crate::nn::nodes::raw_node::{TraitNode, VjpContext};
use crate::nn::nodes::NodeHandle;
use crate::nn::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;

#[derive(Debug, Clone)]
pub(in crate::nn) struct Pad {
    shape: Vec<usize>,
    axis: usize,
    start: usize,
    parent_axis_len: usize,
}

impl Pad {
    pub(in crate::nn) fn new(
        parents: &[&NodeHandle],
        axis: usize,
        start: usize,
        full_len: usize,
    ) -> Result<Self, GraphError> {
        let parent_shape = unary_parent_shape("Pad", parents)?;
        let parent_axis_len = *parent_shape.get(axis).ok_or_else(|| {
            GraphError::DimensionMismatch {
                expected: axis + 1,
                got: parent_shape.len(),
                message: format!("Pad 节点的维度{}越界", axis),
            }
        })?;
        let mut shape = parent_shape;
        shape[axis] = full_len;
        check_axis_range("Pad", &shape, axis, start, parent_axis_len)?;
        Ok(Self {
            shape,
            axis,
            start,
            parent_axis_len,
        })
    }
}

impl TraitNode for Pad {
    fn type_name(&self) -> &'static str {
        "Pad"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].pad(self.axis, self.start, self.shape[self.axis]))
    }

    fn build_grad_to_parents(
        &self,
        graph: &mut GraphInner,
        ctx: &VjpContext<'_>,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        let grad = graph.new_narrow_node(
            ctx.upstream,
            self.axis,
            self.start,
            self.parent_axis_len,
            None,
        )?;
        Ok(vec![Some(grad)])
    }
}
