/*
 * @Author       : 老董
 * @Date         : 2024-01-31 20:23:53
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : 矩阵乘法节点 C = A @ B，A 为 [m, k]，B 为 [k, n]
 */

use super::check_parents_count;
use crate::nn::nodes::raw_node::{TraitNode, VjpContext};
use crate::nn::nodes::NodeHandle;
use crate::nn::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;

#[derive(Debug, Clone)]
pub(in crate::nn) struct MatMul {
    shape: Vec<usize>,
}

impl MatMul {
    pub(in crate::nn) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        check_parents_count("MatMul", parents, 2)?;
        let left_shape = parents[0].value_expected_shape();
        let right_shape = parents[1].value_expected_shape();
        for shape in [left_shape, right_shape] {
            if shape.len() != 2 {
                return Err(GraphError::DimensionMismatch {
                    expected: 2,
                    got: shape.len(),
                    message: "MatMul 节点的父节点必须是矩阵".to_string(),
                });
            }
        }
        if left_shape[1] != right_shape[0] {
            return Err(GraphError::ShapeMismatch {
                expected: vec![left_shape[1], right_shape[1]],
                got: right_shape.to_vec(),
                message: format!(
                    "MatMul 节点的第1个父节点列数{}与第2个父节点行数{}不一致",
                    left_shape[1], right_shape[0]
                ),
            });
        }
        Ok(Self {
            shape: vec![left_shape[0], right_shape[1]],
        })
    }
}

impl TraitNode for MatMul {
    fn type_name(&self) -> &'static str {
        "MatMul"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].mat_mul(parents[1]))
    }

    /// ∂L/∂A = g @ Bᵀ，∂L/∂B = Aᵀ @ g
    fn build_grad_to_parents(
        &self,
        graph: &mut GraphInner,
        ctx: &VjpContext<'_>,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        let (left, right) = (ctx.parents[0], ctx.parents[1]);
        let left_grad = if ctx.needs[0] {
            let right_t = graph.new_transpose_node(right, None)?;
            Some(graph.new_mat_mul_node(ctx.upstream, right_t, None)?)
        } else {
            None
        };
        let right_grad = if ctx.needs[1] {
            let left_t = graph.new_transpose_node(left, None)?;
            Some(graph.new_mat_mul_node(left_t, ctx.upstream, None)?)
        } else {
            None
        };
        Ok(vec![left_grad, right_grad])
    }
}
