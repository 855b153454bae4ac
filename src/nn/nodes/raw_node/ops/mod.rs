mod add;
mod broadcast_to;
mod detach;
mod divide;
mod leaky_relu;
mod mat_mul;
mod multiply;
mod narrow;
mod pad;
mod reshape;
mod scalar_multiply;
mod sqrt;
mod square;
mod subtract;
mod sum_to;
mod tanh;
mod transpose;

pub(in crate::nn) use add::Add;
pub(in crate::nn) use broadcast_to::BroadcastTo;
pub(in crate::nn) use detach::Detach;
pub(in crate::nn) use divide::Divide;
pub(in crate::nn) use leaky_relu::{LeakyRelu, LeakyReluMask};
pub(in crate::nn) use mat_mul::MatMul;
pub(in crate::nn) use multiply::Multiply;
pub(in crate::nn) use narrow::Narrow;
pub(in crate::nn) use pad::Pad;
pub(in crate::nn) use reshape::Reshape;
pub(in crate::nn) use scalar_multiply::ScalarMultiply;
pub(in crate::nn) use sqrt::Sqrt;
pub(in crate::nn) use square::Square;
pub(in crate::nn) use subtract::Subtract;
pub(in crate::nn) use sum_to::SumTo;
pub(in crate::nn) use tanh::Tanh;
pub(in crate::nn) use transpose::Transpose;

use super::check_parents_count;
use crate::nn::GraphError;
use crate::nn::nodes::NodeHandle;
use crate::tensor::broadcast_shape;

/// 二元逐元素算子的输出形状：两个父节点广播后的形状
fn broadcast_parents_shape(
    type_name: &str,
    parents: &[&NodeHandle],
) -> Result<Vec<usize>, GraphError> {
    check_parents_count(type_name, parents, 2)?;
    let left_shape = parents[0].value_expected_shape();
    let right_shape = parents[1].value_expected_shape();
    broadcast_shape(left_shape, right_shape).ok_or_else(|| GraphError::ShapeMismatch {
        expected: left_shape.to_vec(),
        got: right_shape.to_vec(),
        message: format!("{}节点的父节点形状无法广播", type_name),
    })
}

/// 单父节点算子：校验父节点个数并返回父节点形状
fn unary_parent_shape(type_name: &str, parents: &[&NodeHandle]) -> Result<Vec<usize>, GraphError> {
    check_parents_count(type_name, parents, 1)?;
    Ok(parents[0].value_expected_shape().to_vec())
}
