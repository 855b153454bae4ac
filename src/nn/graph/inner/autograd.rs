/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : GraphInner 对任意输入求导（torch.autograd.grad 语义）
 *
 * - 只计算`outputs`对`inputs`的梯度，不修改任何节点上累积的梯度
 * - `create_graph = true`：梯度节点保留在图中，可以参与后续计算并再次求导
 * - `create_graph = false`：求值后删除临时节点，返回持有梯度值的常量节点
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::tensor::Tensor;

impl GraphInner {
    pub fn grad(
        &mut self,
        outputs: &[NodeId],
        inputs: &[NodeId],
        grad_outputs: Option<&[Tensor]>,
        create_graph: bool,
        allow_unused: bool,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        if outputs.is_empty() || inputs.is_empty() {
            return Err(GraphError::InvalidOperation(
                "求导时 outputs 与 inputs 都不能为空".to_string(),
            ));
        }
        for &input in inputs {
            let node = self.get_node(input)?;
            if !node.requires_grad() {
                return Err(GraphError::RequiresGradMissing(format!(
                    "{}不需要梯度，无法对其求导",
                    node
                )));
            }
        }
        for &output in outputs {
            self.forward(output)?;
            let node = self.get_node(output)?;
            if !node.requires_grad() {
                return Err(GraphError::RequiresGradMissing(format!(
                    "{}不依赖任何需要梯度的节点",
                    node
                )));
            }
        }
        let seed_values = self.grad_seed_values(outputs, grad_outputs)?;

        let mark = self.next_id;
        let result = self.grad_internal(outputs, inputs, &seed_values, create_graph, allow_unused);
        match result {
            Ok(grads) if create_graph => Ok(grads),
            Ok(grads) => {
                // 先取出梯度值，再删除临时节点，最后用常量节点承载结果
                let values = grads
                    .iter()
                    .map(|grad| grad.map(|id| self.get_grad_value(id)).transpose())
                    .collect::<Result<Vec<Option<Tensor>>, GraphError>>()?;
                self.truncate_nodes_after(mark);
                values
                    .iter()
                    .map(|value| {
                        value
                            .as_ref()
                            .map(|value| self.new_constant_node(value, None))
                            .transpose()
                    })
                    .collect()
            }
            Err(e) => {
                self.truncate_nodes_after(mark);
                Err(e)
            }
        }
    }

    /// 上游梯度：显式给出时形状须与输出一致，否则输出必须是标量（此时取 1）
    fn grad_seed_values(
        &self,
        outputs: &[NodeId],
        grad_outputs: Option<&[Tensor]>,
    ) -> Result<Vec<Tensor>, GraphError> {
        match grad_outputs {
            Some(grad_outputs) => {
                if grad_outputs.len() != outputs.len() {
                    return Err(GraphError::InvalidOperation(format!(
                        "grad_outputs 的个数{}与 outputs 的个数{}不一致",
                        grad_outputs.len(),
                        outputs.len()
                    )));
                }
                outputs
                    .iter()
                    .zip(grad_outputs)
                    .map(|(&output, seed)| {
                        let shape = self.get_node_value_expected_shape(output)?;
                        if seed.shape() != shape {
                            return Err(GraphError::ShapeMismatch {
                                expected: shape.to_vec(),
                                got: seed.shape().to_vec(),
                                message: format!(
                                    "grad_outputs 的形状必须与输出节点{}一致",
                                    output
                                ),
                            });
                        }
                        Ok(seed.clone())
                    })
                    .collect()
            }
            None => outputs
                .iter()
                .map(|&output| {
                    let shape = self.get_node_value_expected_shape(output)?;
                    if shape.iter().product::<usize>() != 1 {
                        return Err(GraphError::InvalidOperation(format!(
                            "输出节点{}不是标量（形状为{:?}），必须显式提供 grad_outputs",
                            output, shape
                        )));
                    }
                    Ok(Tensor::ones(shape))
                })
                .collect(),
        }
    }

    fn grad_internal(
        &mut self,
        outputs: &[NodeId],
        inputs: &[NodeId],
        seed_values: &[Tensor],
        create_graph: bool,
        allow_unused: bool,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        let seeds = seed_values
            .iter()
            .map(|value| self.new_constant_node(value, None))
            .collect::<Result<Vec<NodeId>, GraphError>>()?;
        let grads = self.build_grad_graph(outputs, &seeds, inputs)?;

        let mut result = Vec::with_capacity(inputs.len());
        for &input in inputs {
            match grads.get(&input) {
                Some(&grad) => result.push(Some(grad)),
                None if allow_unused => result.push(None),
                None => {
                    return Err(GraphError::UnusedInput(format!(
                        "{}没有参与输出的计算；若这是预期行为，请设置 allow_unused",
                        self.get_node(input)?
                    )));
                }
            }
        }

        let grad_nodes: Vec<NodeId> = result.iter().flatten().copied().collect();
        self.forward_nodes(&grad_nodes)?;
        log::debug!(
            "对{}个输入求导（create_graph={}），得到{}个梯度",
            inputs.len(),
            create_graph,
            grad_nodes.len()
        );
        Ok(result)
    }
}
