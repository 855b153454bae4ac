/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : GraphInner 节点创建方法（new_*_node）
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::raw_node::{
    Add, BroadcastTo, Detach, Divide, Input, LeakyRelu, LeakyReluMask, MatMul, Multiply, Narrow,
    Pad, Parameter, Reshape, ScalarMultiply, Sqrt, Square, Subtract, SumTo, Tanh, Transpose,
};
use crate::nn::nodes::NodeType;
use crate::tensor::Tensor;

impl GraphInner {
    /// 用父节点句柄构造原始节点，再加入图中
    fn new_op_node<T, F>(
        &mut self,
        parents: &[NodeId],
        name: Option<&str>,
        build: F,
    ) -> Result<NodeId, GraphError>
    where
        T: Into<NodeType>,
        F: FnOnce(&[&crate::nn::nodes::NodeHandle]) -> Result<T, GraphError>,
    {
        let raw_node = {
            let handles = self.get_nodes(parents)?;
            build(&handles)?.into()
        };
        self.add_node_to_list(raw_node, name, parents, None)
    }

    // ========== 叶子节点 ==========

    /// 输入节点（未设置值）；`requires_grad`为 true 时可以对它求导
    pub fn new_input_node(
        &mut self,
        shape: &[usize],
        requires_grad: bool,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let raw_node = Input::new(shape)?;
        self.add_node_to_list(raw_node.into(), name, &[], Some(requires_grad))
    }

    /// 常量节点：不需要梯度、值已设置好的输入节点
    pub fn new_constant_node(
        &mut self,
        value: &Tensor,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node_id = self.new_input_node(value.shape(), false, name)?;
        self.set_node_value(node_id, Some(value))?;
        Ok(node_id)
    }

    /// 参数节点（未设置值），始终需要梯度
    pub fn new_parameter_node(
        &mut self,
        shape: &[usize],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let raw_node = Parameter::new(shape)?;
        self.add_node_to_list(raw_node.into(), name, &[], Some(true))
    }

    // ========== 二元逐元素算子（支持广播） ==========

    pub fn new_add_node(
        &mut self,
        left: NodeId,
        right: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[left, right], name, Add::new)
    }

    pub fn new_subtract_node(
        &mut self,
        left: NodeId,
        right: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[left, right], name, Subtract::new)
    }

    pub fn new_multiply_node(
        &mut self,
        left: NodeId,
        right: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[left, right], name, Multiply::new)
    }

    pub fn new_divide_node(
        &mut self,
        numerator: NodeId,
        divisor: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[numerator, divisor], name, |p| Divide::new(p, false))
    }

    /// 安全除法：除数为 0 处结果为 0，两个父节点形状必须一致
    pub fn new_safe_divide_node(
        &mut self,
        numerator: NodeId,
        divisor: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[numerator, divisor], name, |p| Divide::new(p, true))
    }

    pub fn new_scalar_multiply_node(
        &mut self,
        parent: NodeId,
        scalar: f32,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[parent], name, |p| ScalarMultiply::new(p, scalar))
    }

    // ========== 矩阵与形状 ==========

    pub fn new_mat_mul_node(
        &mut self,
        left: NodeId,
        right: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[left, right], name, MatMul::new)
    }

    pub fn new_transpose_node(
        &mut self,
        parent: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[parent], name, Transpose::new)
    }

    pub fn new_reshape_node(
        &mut self,
        parent: NodeId,
        shape: &[usize],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[parent], name, |p| Reshape::new(p, shape))
    }

    pub fn new_sum_to_node(
        &mut self,
        parent: NodeId,
        target: &[usize],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[parent], name, |p| SumTo::new(p, target))
    }

    pub fn new_broadcast_to_node(
        &mut self,
        parent: NodeId,
        target: &[usize],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[parent], name, |p| BroadcastTo::new(p, target))
    }

    pub fn new_narrow_node(
        &mut self,
        parent: NodeId,
        axis: usize,
        start: usize,
        len: usize,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[parent], name, |p| Narrow::new(p, axis, start, len))
    }

    pub fn new_pad_node(
        &mut self,
        parent: NodeId,
        axis: usize,
        start: usize,
        full_len: usize,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[parent], name, |p| Pad::new(p, axis, start, full_len))
    }

    // ========== 逐元素函数 ==========

    pub fn new_square_node(
        &mut self,
        parent: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[parent], name, Square::new)
    }

    pub fn new_sqrt_node(&mut self, parent: NodeId, name: Option<&str>) -> Result<NodeId, GraphError> {
        self.new_op_node(&[parent], name, Sqrt::new)
    }

    pub fn new_tanh_node(&mut self, parent: NodeId, name: Option<&str>) -> Result<NodeId, GraphError> {
        self.new_op_node(&[parent], name, Tanh::new)
    }

    pub fn new_leaky_relu_node(
        &mut self,
        parent: NodeId,
        slope: f32,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[parent], name, |p| LeakyRelu::new(p, slope))
    }

    pub fn new_leaky_relu_mask_node(
        &mut self,
        parent: NodeId,
        slope: f32,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[parent], name, |p| LeakyReluMask::new(p, slope))
    }

    /// 截断梯度：值与父节点相同，但不再需要梯度
    pub fn new_detach_node(
        &mut self,
        parent: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[parent], name, Detach::new)
    }
}
