/*
 * @Author       : 老董
 * @Date         : 2024-01-31 20:23:53
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : 逐元素加法节点 C = A + B，支持 NumPy 风格广播
 */

use super::broadcast_parents_shape;
use crate::nn::nodes::raw_node::{TraitNode, VjpContext};
use crate::nn::nodes::NodeHandle;
use crate::nn::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;

#[derive(Debug, Clone)]
pub(in crate::nn) struct Add {
    shape: Vec<usize>,
}

impl Add {
    pub(in crate::nn) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        Ok(Self {
            shape: broadcast_parents_shape("Add", parents)?,
        })
    }
}

impl TraitNode for Add {
    fn type_name(&self) -> &'static str {
        "Add"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0] + parents[1])
    }

    /// ∂L/∂A = sum_to(g, shape_A)，∂L/∂B = sum_to(g, shape_B)
    fn build_grad_to_parents(
        &self,
        graph: &mut GraphInner,
        ctx: &VjpContext<'_>,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        ctx.parents
            .iter()
            .zip(ctx.needs)
            .map(|(&parent, &need)| {
                if need {
                    graph.reduce_grad_to_parent(ctx.upstream, parent).map(Some)
                } else {
                    Ok(None)
                }
            })
            .collect()
    }
}
