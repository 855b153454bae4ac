/*
 * @Author       : 老董
 * @Date         : 2026-01-19
 * @Description  : 纯数乘法节点 C = s · A（s 为创建节点时给定的常数）
 */

use super::unary_parent_shape;
use crate::nn::nodes::raw_node::{TraitNode, VjpContext};
use crate::nn::nodes::NodeHandle;
use crate::nn::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;

#[derive(Debug, Clone)]
pub(in crate::nn) struct ScalarMultiply {
    shape: Vec<usize>,
    scalar: f32,
}

impl ScalarMultiply {
    pub(in crate::nn) fn new(parents: &[&NodeHandle], scalar: f32) -> Result<Self, GraphError> {
        Ok(Self {
            shape: unary_parent_shape("ScalarMultiply", parents)?,
            scalar,
        })
    }
}

impl TraitNode for ScalarMultiply {
    fn type_name(&self) -> &'static str {
        "ScalarMultiply"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0] * self.scalar)
    }

    fn build_grad_to_parents(
        &self,
        graph: &mut GraphInner,
        ctx: &VjpContext<'_>,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        let grad = graph.new_scalar_multiply_node(ctx.upstream, self.scalar, None)?;
        Ok(vec![Some(grad)])
    }
}
