/*
 * @Author       : 老董
 * @Date         : 2024-01-31 20:23:53
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : 负责神经网络（neural network）的构建：计算图、节点、Var 句柄与求导
 */

pub mod autograd;
mod display;
mod graph;
pub mod layer;
mod module;
mod nodes;
mod var;
mod var_ops;

pub use autograd::{GradOptions, grad};
pub(in crate::nn) use display::format_node_display;
pub use graph::{Graph, GraphError, GraphInner};
pub use layer::Linear;
pub use module::Module;
pub use nodes::NodeId;
pub use var::{Init, Var};
pub use var_ops::{VarActivationOps, VarMathOps, VarMatrixOps, VarReduceOps, VarShapeOps};

#[cfg(test)]
mod tests;
