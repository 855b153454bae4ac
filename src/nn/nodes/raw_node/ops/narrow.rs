/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : Narrow 节点：沿某一维截取 [start, start + len) 区间（保留该维度）；
 *                 梯度是把上游梯度补零放回原位置（即 Pad）
 */

use super::unary_parent_shape;
use crate::nn::nodes::raw_node::{TraitNode, VjpContext};
use crate::nn::nodes::NodeHandle;
use crate::nn::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;

#[derive(Debug, Clone)]
pub(in crate::nn) struct Narrow {
    shape: Vec<usize>,
    axis: usize,
    start: usize,
    len: usize,
    parent_axis_len: usize,
}

impl Narrow {
    pub(in crate::nn) fn new(
        parents: &[&NodeHandle],
        axis: usize,
        start: usize,
        len: usize,
    ) -> Result<Self, GraphError> {
        let parent_shape = unary_parent_shape("Narrow", parents)?;
        let parent_axis_len = check_axis_range("Narrow", &parent_shape, axis, start, len)?;
        let mut shape = parent_shape;
        shape[axis] = len;
        Ok(Self {
            shape,
            axis,
            start,
            len,
            parent_axis_len,
        })
    }
}

/// 校验`axis`与区间`[start, start + len)`，返回该维度的长度
pub(super) fn check_axis_range(
    type_name: &str,
    shape: &[usize],
    axis: usize,
    start: usize,
    len: usize,
) -> Result<usize, GraphError> {
    let axis_len = *shape.get(axis).ok_or_else(|| GraphError::DimensionMismatch {
        expected: axis + 1,
        got: shape.len(),
        message: format!("{}节点的维度{}越界", type_name, axis),
    })?;
    if start + len > axis_len {
        return Err(GraphError::InvalidOperation(format!(
            "{}节点的区间[{}, {})越界：维度{}的长度为{}",
            type_name,
            start,
            start + len,
            axis,
            axis_len
        )));
    }
    Ok(axis_len)
}

impl TraitNode for Narrow {
    fn type_name(&self) -> &'static str {
        "Narrow"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].narrow(self.axis, self.start, self.len))
    }

    fn build_grad_to_parents(
        &self,
        graph: &mut GraphInner,
        ctx: &VjpContext<'_>,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        let grad = graph.new_pad_node(
            ctx.upstream,
            self.axis,
            self.start,
            self.parent_axis_len,
            None,
        )?;
        Ok(vec![Some(grad)])
    }
}
