/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 对任意输入求导（PyTorch `torch.autograd.grad` 风格）
 */

use super::{GraphError, Var};
use crate::tensor::Tensor;

/// 求导选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GradOptions {
    /// 保留梯度图：返回的梯度仍连接在图上，可以参与后续计算并再次求导
    pub create_graph: bool,
    /// 允许某些输入没有参与输出的计算（此时对应结果为 None，而不是报错）
    pub allow_unused: bool,
}

impl GradOptions {
    /// `create_graph = true` 的快捷构造（用于高阶导数，如梯度惩罚）
    pub const fn create_graph() -> Self {
        Self {
            create_graph: true,
            allow_unused: false,
        }
    }

    pub const fn with_allow_unused(mut self, allow_unused: bool) -> Self {
        self.allow_unused = allow_unused;
        self
    }
}

/// 计算`outputs`对`inputs`的梯度 Σᵢ (∂outputsᵢ/∂inputs)ᵀ · grad_outputsᵢ
///
/// - `grad_outputs`为 None 时，所有输出都必须是标量（上游梯度取 1）
/// - 不会修改任何节点上由`backward`累积的梯度
/// - 返回值与`inputs`一一对应；只有`allow_unused`时才可能出现 None
///
/// # 使用示例
/// ```ignore
/// let x = graph.input_with_grad(&data)?;
/// let y = x.square().sum();
/// let grads = grad(&[&y], &[&x], None, GradOptions::create_graph())?;
/// let dx = grads[0].clone().unwrap();   // 2x，仍可继续求导
/// ```
pub fn grad(
    outputs: &[&Var],
    inputs: &[&Var],
    grad_outputs: Option<&[Tensor]>,
    options: GradOptions,
) -> Result<Vec<Option<Var>>, GraphError> {
    let Some(first) = outputs.first().or_else(|| inputs.first()) else {
        return Err(GraphError::InvalidOperation(
            "求导时 outputs 与 inputs 都不能为空".to_string(),
        ));
    };
    for var in outputs.iter().chain(inputs) {
        first.check_same_graph(var, "求导")?;
    }

    let output_ids: Vec<_> = outputs.iter().map(|var| var.node_id()).collect();
    let input_ids: Vec<_> = inputs.iter().map(|var| var.node_id()).collect();
    let grads = first.graph().borrow_mut().grad(
        &output_ids,
        &input_ids,
        grad_outputs,
        options.create_graph,
        options.allow_unused,
    )?;
    Ok(grads
        .into_iter()
        .map(|grad| grad.map(|id| first.wrap(id)))
        .collect())
}
