/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : Graph 句柄（用户级 API）
 */

use super::error::GraphError;
use super::inner::GraphInner;
use crate::nn::NodeId;
use crate::nn::var::{Init, Var};
use crate::tensor::Tensor;
use std::cell::RefCell;
use std::rc::Rc;

/// Graph - 计算图句柄（PyTorch 风格用户 API）
///
/// # 设计原则
/// - 是 `Rc<RefCell<GraphInner>>` 的薄封装
/// - Clone 语义：多个 Graph 引用同一个 GraphInner
/// - 创建的 Var 自动持有图引用
#[derive(Clone)]
pub struct Graph {
    inner: Rc<RefCell<GraphInner>>,
}

impl Graph {
    // ==================== 创建 ====================

    /// 创建新图
    pub fn new() -> Self {
        Self::from_inner(GraphInner::new())
    }

    /// 创建带种子的图（参数初始化、随机采样均可复现）
    pub fn new_with_seed(seed: u64) -> Self {
        Self::from_inner(GraphInner::new_with_seed(seed))
    }

    /// 从现有 GraphInner 创建句柄
    pub fn from_inner(inner: GraphInner) -> Self {
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    /// 从现有 Rc 创建句柄
    pub(crate) const fn from_rc(inner: Rc<RefCell<GraphInner>>) -> Self {
        Self { inner }
    }

    /// 获取内部 GraphInner 的不可变引用
    pub fn inner(&self) -> std::cell::Ref<'_, GraphInner> {
        self.inner.borrow()
    }

    /// 获取内部 GraphInner 的可变引用
    pub fn inner_mut(&self) -> std::cell::RefMut<'_, GraphInner> {
        self.inner.borrow_mut()
    }

    /// 将 NodeId 包装成 Var
    pub fn wrap_node_id(&self, node_id: NodeId) -> Var {
        Var::new(node_id, Rc::clone(&self.inner))
    }

    /// 检查 Var 是否属于本图
    pub fn owns(&self, var: &Var) -> bool {
        Rc::ptr_eq(&self.inner, var.graph())
    }

    // ==================== 创建变量 ====================

    /// 创建输入节点并设置数据（不需要梯度）
    pub fn input(&self, data: &Tensor) -> Result<Var, GraphError> {
        self.new_input(data, false, None)
    }

    /// 创建需要梯度的输入节点，之后可以对它求导（如梯度惩罚中的插值样本）
    pub fn input_with_grad(&self, data: &Tensor) -> Result<Var, GraphError> {
        self.new_input(data, true, None)
    }

    /// 创建命名输入节点
    pub fn input_named(&self, data: &Tensor, name: &str) -> Result<Var, GraphError> {
        self.new_input(data, false, Some(name))
    }

    fn new_input(
        &self,
        data: &Tensor,
        requires_grad: bool,
        name: Option<&str>,
    ) -> Result<Var, GraphError> {
        let mut g = self.inner.borrow_mut();
        let node_id = g.new_input_node(data.shape(), requires_grad, name)?;
        g.set_node_value(node_id, Some(data))?;
        Ok(Var::new(node_id, Rc::clone(&self.inner)))
    }

    /// 创建参数节点
    pub fn parameter(&self, shape: &[usize], init: Init, name: &str) -> Result<Var, GraphError> {
        let mut g = self.inner.borrow_mut();
        let node_id = g.new_parameter_node(shape, Some(name))?;
        let init_data = match g.rng_mut() {
            Some(rng) => init.generate_with_rng(shape, rng),
            None => init.generate(shape),
        };
        g.set_node_value(node_id, Some(&init_data))?;
        Ok(Var::new(node_id, Rc::clone(&self.inner)))
    }

    /// 创建常量张量
    pub fn constant(&self, data: &Tensor) -> Result<Var, GraphError> {
        let node_id = self.inner.borrow_mut().new_constant_node(data, None)?;
        Ok(Var::new(node_id, Rc::clone(&self.inner)))
    }

    /// 创建零张量
    pub fn zeros(&self, shape: &[usize]) -> Result<Var, GraphError> {
        self.constant(&Tensor::zeros(shape))
    }

    /// 创建全一张量
    pub fn ones(&self, shape: &[usize]) -> Result<Var, GraphError> {
        self.constant(&Tensor::ones(shape))
    }

    /// 创建[min, max]均匀分布的随机常量（图有种子时使用图的 RNG）
    pub fn rand_uniform(&self, shape: &[usize], min: f32, max: f32) -> Result<Var, GraphError> {
        let data = self.sample_uniform(shape, min, max);
        self.constant(&data)
    }

    /// 从[min, max]均匀分布采样一个张量（不建立节点；图有种子时使用图的 RNG）
    pub fn sample_uniform(&self, shape: &[usize], min: f32, max: f32) -> Tensor {
        match self.inner.borrow_mut().rng_mut() {
            Some(rng) => Tensor::uniform_with_rng(min, max, shape, rng),
            None => Tensor::uniform(min, max, shape),
        }
    }

    // ==================== 执行 ====================

    /// 前向传播
    pub fn forward(&self, output: &Var) -> Result<(), GraphError> {
        self.inner.borrow_mut().forward(output.node_id())
    }

    /// 反向传播
    pub fn backward(&self, loss: &Var) -> Result<f32, GraphError> {
        loss.backward()
    }

    // ==================== 训练控制 ====================

    /// 清零所有节点上累积的梯度
    pub fn zero_grad(&self) -> Result<(), GraphError> {
        self.inner.borrow_mut().clear_grad()
    }

    /// 所有参数节点（按创建顺序）
    pub fn parameters(&self) -> Vec<Var> {
        self.inner
            .borrow()
            .get_trainable_nodes()
            .into_iter()
            .map(|id| Var::new(id, Rc::clone(&self.inner)))
            .collect()
    }

    /// 图中的节点个数
    pub fn nodes_count(&self) -> usize {
        self.inner.borrow().nodes_count()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
