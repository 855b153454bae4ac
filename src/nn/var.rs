/*
 * @Author       : 老董
 * @Date         : 2026-01-08
 * @Description  : Smart Var - 智能变量句柄，支持算子重载和链式调用
 */

use super::graph::GraphInner;
use super::{GraphError, NodeId};
use crate::tensor::Tensor;
use std::cell::RefCell;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::rc::Rc;

// ==================== Init 枚举 ====================

/// 参数初始化策略
#[derive(Debug, Clone)]
pub enum Init {
    /// 常数初始化
    Constant(f32),
    /// 全零
    Zeros,
    /// 全一
    Ones,
    /// 正态分布（使用 Graph 的 RNG）
    Normal { mean: f32, std: f32 },
    /// Kaiming/He 初始化（适用于 `ReLU`/`LeakyReLU`）
    Kaiming,
    /// Xavier/Glorot 初始化（适用于 Tanh）
    Xavier,
}

impl Init {
    /// 生成初始化后的 Tensor（使用全局 RNG）
    pub fn generate(&self, shape: &[usize]) -> Tensor {
        self.generate_with_rng(shape, &mut rand::thread_rng())
    }

    /// 生成初始化后的 Tensor（使用指定的 RNG）
    pub fn generate_with_rng<R: rand::Rng>(&self, shape: &[usize], rng: &mut R) -> Tensor {
        match self {
            Self::Constant(v) => Tensor::full(*v, shape),
            Self::Zeros => Tensor::zeros(shape),
            Self::Ones => Tensor::ones(shape),
            Self::Normal { mean, std } => Tensor::normal_with_rng(*mean, *std, shape, rng),
            Self::Kaiming => {
                let fan_in = shape[0];
                let std = (2.0 / fan_in as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
            Self::Xavier => {
                let (fan_in, fan_out) = (shape[0], shape.get(1).copied().unwrap_or(1));
                let std = (2.0 / (fan_in + fan_out) as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
        }
    }
}

// ==================== Var 结构 ====================

/// 智能变量句柄 - 携带图引用，支持算子重载和链式调用
///
/// # 设计原则
/// - 持有 `Rc<RefCell<GraphInner>>` 引用，实现算子重载
/// - Clone 语义（非 Copy），但开销极低（Rc clone）
///
/// # 使用示例
/// ```ignore
/// let graph = Graph::new();
/// let x = graph.input_with_grad(&images)?;
/// let h = x.matmul(&w)?.leaky_relu(0.2);
/// let y = &h + &b;
/// let loss = y.mean();
/// loss.backward()?;
/// ```
#[derive(Clone)]
pub struct Var {
    /// 节点 ID
    id: NodeId,
    /// 图引用（用户不可见）
    graph: Rc<RefCell<GraphInner>>,
}

impl std::fmt::Debug for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Var").field("id", &self.id).finish()
    }
}

impl Var {
    /// 创建新的 Var（内部使用）
    pub(crate) const fn new(id: NodeId, graph: Rc<RefCell<GraphInner>>) -> Self {
        Self { id, graph }
    }

    /// 获取节点 ID
    pub const fn node_id(&self) -> NodeId {
        self.id
    }

    /// 获取内部图引用（供 trait 和内部模块使用）
    pub(crate) const fn graph(&self) -> &Rc<RefCell<GraphInner>> {
        &self.graph
    }

    /// 用同一张图包装另一个节点
    pub(crate) fn wrap(&self, id: NodeId) -> Self {
        Self::new(id, Rc::clone(&self.graph))
    }

    /// 检查两个 Var 是否来自同一个 Graph
    pub fn same_graph(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.graph, &other.graph)
    }

    /// 获取 Var 所属的 Graph handle
    ///
    /// 即使原始 Graph handle 已 drop，此方法仍返回有效的 Graph。
    /// 这是因为 Var 持有 `GraphInner` 的强引用（Rc）。
    pub fn get_graph(&self) -> super::graph::Graph {
        super::graph::Graph::from_rc(Rc::clone(&self.graph))
    }

    /// 获取节点的预期输出形状（节点创建时就已确定）
    pub fn value_expected_shape(&self) -> Vec<usize> {
        self.graph
            .borrow()
            .get_node_value_expected_shape(self.id)
            .map(<[usize]>::to_vec)
            .unwrap_or_default()
    }

    /// 本节点是否需要梯度（即能否对它、或经由它对上游节点求导）
    pub fn requires_grad(&self) -> bool {
        self.graph
            .borrow()
            .node_requires_grad(self.id)
            .unwrap_or(false)
    }

    pub(crate) fn check_same_graph(&self, other: &Self, op_name: &str) -> Result<(), GraphError> {
        if self.same_graph(other) {
            Ok(())
        } else {
            Err(GraphError::InvalidOperation(format!(
                "不能对来自不同 Graph 的 Var 进行{}",
                op_name
            )))
        }
    }

    // ==================== 梯度流控制 ====================

    /// 截断梯度流：返回值相同、但不再需要梯度的新 Var
    pub fn detach(&self) -> Result<Self, GraphError> {
        let id = self.graph.borrow_mut().new_detach_node(self.id, None)?;
        Ok(self.wrap(id))
    }

    // ==================== 执行 ====================

    /// 前向传播
    pub fn forward(&self) -> Result<(), GraphError> {
        self.graph.borrow_mut().forward(self.id)
    }

    /// 反向传播（ensure-forward 语义）
    ///
    /// 自动先执行 forward()，然后把梯度累积到参数和需要梯度的输入上。
    /// 返回 loss 的标量值
    pub fn backward(&self) -> Result<f32, GraphError> {
        self.graph.borrow_mut().backward(self.id)
    }

    // ==================== 值访问和设置 ====================

    /// 获取节点的值（克隆的 Tensor）
    pub fn value(&self) -> Result<Option<Tensor>, GraphError> {
        Ok(self.graph.borrow().get_node_value(self.id)?.cloned())
    }

    /// 设置节点的值（只有输入、参数节点可以设置）
    pub fn set_value(&self, value: &Tensor) -> Result<(), GraphError> {
        self.graph.borrow_mut().set_node_value(self.id, Some(value))
    }

    /// 获取标量值（ensure-forward，节点须仅含 1 个元素）
    pub fn item(&self) -> Result<f32, GraphError> {
        self.forward()?;
        let val = self.value()?.ok_or(GraphError::NodeNotFound(self.id))?;
        val.get_data_number().ok_or_else(|| {
            GraphError::InvalidOperation(format!(
                "Tensor 不是标量，其形状为{:?}",
                val.shape()
            ))
        })
    }

    /// 获取`backward`累积的梯度
    pub fn grad(&self) -> Result<Option<Tensor>, GraphError> {
        self.graph.borrow().get_node_grad(self.id)
    }

    /// 与本节点同维数、仅含 1 个元素的常量（广播时不会抬高维数）
    pub(crate) fn scalar_like(&self, value: f32) -> Result<Self, GraphError> {
        let shape = vec![1; self.value_expected_shape().len().max(1)];
        let id = self
            .graph
            .borrow_mut()
            .new_constant_node(&Tensor::full(value, &shape), None)?;
        Ok(self.wrap(id))
    }

    // ==================== 安全版本（返回 Result）====================

    /// 安全的加法（返回 Result）
    pub fn try_add(&self, other: &Self) -> Result<Self, GraphError> {
        self.check_same_graph(other, "加法")?;
        let id = self
            .graph
            .borrow_mut()
            .new_add_node(self.id, other.id, None)?;
        Ok(self.wrap(id))
    }

    /// 安全的减法（返回 Result），支持广播
    pub fn try_sub(&self, other: &Self) -> Result<Self, GraphError> {
        self.check_same_graph(other, "减法")?;
        let id = self
            .graph
            .borrow_mut()
            .new_subtract_node(self.id, other.id, None)?;
        Ok(self.wrap(id))
    }

    /// 安全的元素级乘法（返回 Result）
    pub fn try_mul(&self, other: &Self) -> Result<Self, GraphError> {
        self.check_same_graph(other, "乘法")?;
        let id = self
            .graph
            .borrow_mut()
            .new_multiply_node(self.id, other.id, None)?;
        Ok(self.wrap(id))
    }

    /// 安全的除法（返回 Result）
    ///
    /// 逐元素除法：`self / other`
    pub fn try_div(&self, other: &Self) -> Result<Self, GraphError> {
        self.check_same_graph(other, "除法")?;
        let id = self
            .graph
            .borrow_mut()
            .new_divide_node(self.id, other.id, None)?;
        Ok(self.wrap(id))
    }

    /// 乘以纯数
    pub fn try_scale(&self, scalar: f32) -> Result<Self, GraphError> {
        let id = self
            .graph
            .borrow_mut()
            .new_scalar_multiply_node(self.id, scalar, None)?;
        Ok(self.wrap(id))
    }
}

// ==================== 算子重载 ====================

macro_rules! impl_var_binary_op {
    ($trait:ident, $method:ident, $try_method:ident, $msg:literal) => {
        impl $trait for &Var {
            type Output = Var;

            fn $method(self, other: &Var) -> Var {
                self.$try_method(other).expect($msg)
            }
        }

        impl $trait for Var {
            type Output = Self;

            fn $method(self, other: Self) -> Self {
                (&self).$method(&other)
            }
        }

        impl $trait<Var> for &Var {
            type Output = Var;

            fn $method(self, other: Var) -> Var {
                self.$method(&other)
            }
        }

        impl $trait<&Self> for Var {
            type Output = Self;

            fn $method(self, other: &Self) -> Self {
                (&self).$method(other)
            }
        }
    };
}

impl_var_binary_op!(Add, add, try_add, "Var 加法失败");
impl_var_binary_op!(Sub, sub, try_sub, "Var 减法失败");
impl_var_binary_op!(Mul, mul, try_mul, "Var 乘法失败");
impl_var_binary_op!(Div, div, try_div, "Var 除法失败");

// Var 与纯数的加减：纯数被包装成同维数的 1 元素常量后广播
macro_rules! impl_var_scalar_op {
    ($trait:ident, $method:ident, $try_method:ident, $msg:literal) => {
        impl $trait<f32> for &Var {
            type Output = Var;

            fn $method(self, scalar: f32) -> Var {
                self.scalar_like(scalar)
                    .and_then(|constant| self.$try_method(&constant))
                    .expect($msg)
            }
        }

        impl $trait<f32> for Var {
            type Output = Self;

            fn $method(self, scalar: f32) -> Self {
                (&self).$method(scalar)
            }
        }
    };
}

impl_var_scalar_op!(Add, add, try_add, "Var 与纯数相加失败");
impl_var_scalar_op!(Sub, sub, try_sub, "Var 与纯数相减失败");

// Mul/Div 纯数直接用 ScalarMultiply 节点
impl Mul<f32> for &Var {
    type Output = Var;

    fn mul(self, scalar: f32) -> Var {
        self.try_scale(scalar).expect("Var 与纯数相乘失败")
    }
}

impl Mul<f32> for Var {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        &self * scalar
    }
}

impl Mul<&Var> for f32 {
    type Output = Var;

    fn mul(self, var: &Var) -> Var {
        var * self
    }
}

impl Mul<Var> for f32 {
    type Output = Var;

    fn mul(self, var: Var) -> Var {
        &var * self
    }
}

impl Div<f32> for &Var {
    type Output = Var;

    fn div(self, scalar: f32) -> Var {
        self.try_scale(1.0 / scalar).expect("Var 与纯数相除失败")
    }
}

impl Div<f32> for Var {
    type Output = Self;

    fn div(self, scalar: f32) -> Self {
        &self / scalar
    }
}

// Neg（实现为 -1 * self）
impl Neg for &Var {
    type Output = Var;

    fn neg(self) -> Var {
        self * -1.0
    }
}

impl Neg for Var {
    type Output = Self;

    fn neg(self) -> Self {
        -&self
    }
}
