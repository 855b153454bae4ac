/*
 * @Author       : 老董
 * @Date         : 2026-01-19
 * @Description  : LeakyReLU 激活节点 y = x if x > 0 else slope · x（slope = 0 时即 ReLU），
 *                 以及其导数掩码节点（不可导，梯度到此截断）
 */

use super::unary_parent_shape;
use crate::nn::nodes::raw_node::{TraitNode, VjpContext};
use crate::nn::nodes::NodeHandle;
use crate::nn::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;

#[derive(Debug, Clone)]
pub(in crate::nn) struct LeakyRelu {
    shape: Vec<usize>,
    slope: f32,
}

impl LeakyRelu {
    pub(in crate::nn) fn new(parents: &[&NodeHandle], slope: f32) -> Result<Self, GraphError> {
        Ok(Self {
            shape: unary_parent_shape("LeakyRelu", parents)?,
            slope,
        })
    }
}

impl TraitNode for LeakyRelu {
    fn type_name(&self) -> &'static str {
        "LeakyRelu"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].leaky_relu(self.slope))
    }

    /// ∂L/∂x = g ⊙ mask(x)，mask(x) = 1 if x > 0 else slope
    fn build_grad_to_parents(
        &self,
        graph: &mut GraphInner,
        ctx: &VjpContext<'_>,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        let mask = graph.new_leaky_relu_mask_node(ctx.parents[0], self.slope, None)?;
        let grad = graph.new_multiply_node(ctx.upstream, mask, None)?;
        Ok(vec![Some(grad)])
    }
}

/// LeakyReLU 的导数掩码：分段常数，对 x 的导数几乎处处为 0
#[derive(Debug, Clone)]
pub(in crate::nn) struct LeakyReluMask {
    shape: Vec<usize>,
    slope: f32,
}

impl LeakyReluMask {
    pub(in crate::nn) fn new(parents: &[&NodeHandle], slope: f32) -> Result<Self, GraphError> {
        Ok(Self {
            shape: unary_parent_shape("LeakyReluMask", parents)?,
            slope,
        })
    }
}

impl TraitNode for LeakyReluMask {
    fn type_name(&self) -> &'static str {
        "LeakyReluMask"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn is_differentiable(&self) -> bool {
        false
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].leaky_relu_mask(self.slope))
    }

    fn build_grad_to_parents(
        &self,
        _graph: &mut GraphInner,
        _ctx: &VjpContext<'_>,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        Ok(vec![None])
    }
}
