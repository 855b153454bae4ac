/*
 * @Author       : 老董
 * @Date         : 2024-01-31 20:23:53
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : 节点句柄：保存节点在图中的状态（名称、值、累积梯度、是否需要梯度），
 *                 算子本身的语义由`NodeType`负责
 */

use super::raw_node::{NodeType, TraitNode};
use crate::nn::format_node_display;
use crate::nn::GraphError;
use crate::tensor::Tensor;
use std::fmt;

/// 节点 ID，在同一张图内单调递增且不会复用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone)]
pub(in crate::nn) struct NodeHandle {
    id: NodeId,
    name: String,
    raw_node: NodeType,
    value: Option<Tensor>,
    /// `backward`累积到叶子节点上的梯度
    grad: Option<Tensor>,
    requires_grad: bool,
    last_forward_pass_id: u64,
}

impl NodeHandle {
    pub(in crate::nn) fn new<T: Into<NodeType>>(
        id: NodeId,
        name: &str,
        raw_node: T,
        requires_grad: bool,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            raw_node: raw_node.into(),
            value: None,
            grad: None,
            requires_grad,
            last_forward_pass_id: 0,
        }
    }

    pub(in crate::nn) fn name(&self) -> &str {
        &self.name
    }

    pub(in crate::nn) fn node_type(&self) -> &NodeType {
        &self.raw_node
    }

    pub(in crate::nn) fn type_name(&self) -> &'static str {
        self.raw_node.type_name()
    }

    pub(in crate::nn) fn value_expected_shape(&self) -> &[usize] {
        self.raw_node.value_expected_shape()
    }

    pub(in crate::nn) fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// 叶子节点（输入、参数）的值只能手动设置，不能由父节点计算
    pub(in crate::nn) fn is_leaf(&self) -> bool {
        matches!(self.raw_node, NodeType::Input(_) | NodeType::Parameter(_))
    }

    pub(in crate::nn) fn is_parameter(&self) -> bool {
        matches!(self.raw_node, NodeType::Parameter(_))
    }

    pub(in crate::nn) fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub(in crate::nn) fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    /// 手动设置叶子节点的值，形状必须与节点创建时的形状一致
    pub(in crate::nn) fn set_value(&mut self, value: Option<&Tensor>) -> Result<(), GraphError> {
        if !self.is_leaf() {
            return Err(GraphError::InvalidOperation(format!(
                "{}的值由父节点计算得出，不应该被手动设置",
                self
            )));
        }
        if let Some(value) = value {
            if value.shape() != self.value_expected_shape() {
                return Err(GraphError::ShapeMismatch {
                    expected: self.value_expected_shape().to_vec(),
                    got: value.shape().to_vec(),
                    message: format!("{}被设置的值形状与节点形状不一致", self),
                });
            }
        }
        self.value = value.cloned();
        Ok(())
    }

    /// 前向传播写入计算结果
    pub(in crate::nn) fn set_computed_value(&mut self, value: Tensor, pass_id: u64) {
        self.value = Some(value);
        self.last_forward_pass_id = pass_id;
    }

    pub(in crate::nn) fn last_forward_pass_id(&self) -> u64 {
        self.last_forward_pass_id
    }

    pub(in crate::nn) fn set_last_forward_pass_id(&mut self, pass_id: u64) {
        self.last_forward_pass_id = pass_id;
    }

    pub(in crate::nn) fn grad(&self) -> Option<&Tensor> {
        self.grad.as_ref()
    }

    /// 梯度累加（多次`backward`之间不清零，与 PyTorch 一致）
    pub(in crate::nn) fn accumulate_grad(&mut self, grad: &Tensor) {
        self.grad = Some(match self.grad.take() {
            Some(old) => old + grad,
            None => grad.clone(),
        });
    }

    pub(in crate::nn) fn clear_grad(&mut self) {
        self.grad = None;
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            format_node_display(self.id, &self.name, self.type_name())
        )
    }
}
