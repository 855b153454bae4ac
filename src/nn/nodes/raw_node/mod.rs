/*
 * @Author       : 老董
 * @Date         : 2024-01-31 20:23:53
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : 原始节点：每种算子的前向计算与向量-雅可比积（VJP）
 *
 * VJP 不直接算出数值，而是在图中新建节点来表示“对父节点的梯度”，
 * 因此梯度本身也是普通的图节点，可以继续被求导（二阶导数）。
 */

mod input;
mod ops;
mod parameter;

pub(in crate::nn) use input::Input;
pub(in crate::nn) use ops::*;
pub(in crate::nn) use parameter::Parameter;

use super::{NodeHandle, NodeId};
use crate::nn::{GraphError, GraphInner};
use crate::tensor::Tensor;
use enum_dispatch::enum_dispatch;

#[enum_dispatch]
#[derive(Debug, Clone)]
pub(in crate::nn) enum NodeType {
    Input(Input),
    Parameter(Parameter),
    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓算子↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    Add(Add),
    Subtract(Subtract),
    Multiply(Multiply),
    Divide(Divide),
    ScalarMultiply(ScalarMultiply),
    MatMul(MatMul),
    Transpose(Transpose),
    Reshape(Reshape),
    SumTo(SumTo),
    BroadcastTo(BroadcastTo),
    Narrow(Narrow),
    Pad(Pad),
    Square(Square),
    Sqrt(Sqrt),
    Tanh(Tanh),
    LeakyRelu(LeakyRelu),
    LeakyReluMask(LeakyReluMask),
    Detach(Detach),
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑算子↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
}

/// 构建 VJP 时所需的上下文
pub(in crate::nn) struct VjpContext<'a> {
    /// 本节点（部分算子的梯度要用到本节点的输出，如 sqrt、tanh）
    pub(in crate::nn) node: NodeId,
    pub(in crate::nn) parents: &'a [NodeId],
    /// 上游梯度节点，形状与本节点一致
    pub(in crate::nn) upstream: NodeId,
    /// 与`parents`一一对应：该父节点是否需要梯度
    pub(in crate::nn) needs: &'a [bool],
}

#[enum_dispatch(NodeType)]
pub(in crate::nn) trait TraitNode {
    fn type_name(&self) -> &'static str;

    /// 节点值的形状，在节点创建时就已确定
    fn value_expected_shape(&self) -> &[usize];

    /// 梯度能否穿过本节点（detach、掩码等节点返回 false）
    fn is_differentiable(&self) -> bool {
        true
    }

    /// 根据父节点的值计算本节点的值（调用方保证所有父节点都已有值）
    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError>;

    /// 在图中构建“对各父节点的梯度”节点，不需要梯度的父节点返回 None
    fn build_grad_to_parents(
        &self,
        graph: &mut GraphInner,
        ctx: &VjpContext<'_>,
    ) -> Result<Vec<Option<NodeId>>, GraphError>;
}

/// 校验父节点个数
pub(in crate::nn) fn check_parents_count(
    type_name: &str,
    parents: &[&NodeHandle],
    expected: usize,
) -> Result<(), GraphError> {
    if parents.len() != expected {
        return Err(GraphError::InvalidOperation(format!(
            "{}节点需要正好{}个父节点，实际为{}个",
            type_name,
            expected,
            parents.len()
        )));
    }
    Ok(())
}
