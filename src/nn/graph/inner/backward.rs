/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : GraphInner 反向传播
 *
 * 梯度以“图节点”的形式构建：每个算子的 VJP 都在图中新建节点，
 * 因此同一套规则既用于 backward（求值后即清理），也用于 autograd（保留以求高阶导数）。
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::{TraitNode, VjpContext};
use crate::tensor::Tensor;
use std::collections::{HashMap, HashSet};

impl GraphInner {
    /// 把梯度节点求和归约到父节点的形状（父节点曾被广播时需要）
    pub(in crate::nn) fn reduce_grad_to_parent(
        &mut self,
        grad: NodeId,
        parent: NodeId,
    ) -> Result<NodeId, GraphError> {
        let parent_shape = self.get_node_value_expected_shape(parent)?.to_vec();
        if self.get_node_value_expected_shape(grad)? == parent_shape.as_slice() {
            return Ok(grad);
        }
        self.new_sum_to_node(grad, &parent_shape, None)
    }

    /// 从`outputs`出发的拓扑序（父节点在前）
    fn topological_order(&self, outputs: &[NodeId]) -> Result<Vec<NodeId>, GraphError> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        // (节点, 父节点是否已展开)
        let mut stack: Vec<(NodeId, bool)> = outputs.iter().rev().map(|&id| (id, false)).collect();
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            if !visited.insert(id) {
                continue;
            }
            stack.push((id, true));
            for parent in self.get_node_parents(id)?.into_iter().rev() {
                if !visited.contains(&parent) {
                    stack.push((parent, false));
                }
            }
        }
        Ok(order)
    }

    /// 构建`outputs`（以`seeds`为上游梯度）对`targets`的梯度子图
    ///
    /// 只沿着“可导且能到达某个 target”的路径传播，其余分支不会新建任何节点。
    /// 返回 target -> 梯度节点；未被到达的 target 不在结果中
    pub(in crate::nn::graph) fn build_grad_graph(
        &mut self,
        outputs: &[NodeId],
        seeds: &[NodeId],
        targets: &[NodeId],
    ) -> Result<HashMap<NodeId, NodeId>, GraphError> {
        let order = self.topological_order(outputs)?;
        let target_set: HashSet<NodeId> = targets.iter().copied().collect();

        // 1. 正向标记能到达 target 的节点
        let mut leads_to_target = HashSet::new();
        for &id in &order {
            let node = self.get_node(id)?;
            let reaches = target_set.contains(&id)
                || (node.node_type().is_differentiable()
                    && self
                        .get_node_parents(id)?
                        .iter()
                        .any(|parent| leads_to_target.contains(parent)));
            if reaches {
                leads_to_target.insert(id);
            }
        }

        // 2. 播种
        let mut grads: HashMap<NodeId, NodeId> = HashMap::new();
        for (&output, &seed) in outputs.iter().zip(seeds) {
            if leads_to_target.contains(&output) {
                self.accumulate_grad_node(&mut grads, output, seed)?;
            }
        }

        // 3. 逆拓扑序传播
        for &id in order.iter().rev() {
            if !leads_to_target.contains(&id) {
                continue;
            }
            let Some(&upstream) = grads.get(&id) else {
                continue;
            };
            let raw_node = self.get_node(id)?.node_type().clone();
            if !raw_node.is_differentiable() {
                continue;
            }
            let parents = self.get_node_parents(id)?;
            let needs: Vec<bool> = parents
                .iter()
                .map(|parent| leads_to_target.contains(parent))
                .collect();
            if !needs.iter().any(|&need| need) {
                continue;
            }

            let ctx = VjpContext {
                node: id,
                parents: &parents,
                upstream,
                needs: &needs,
            };
            let parent_grads = raw_node.build_grad_to_parents(self, &ctx)?;
            for ((&parent, &need), parent_grad) in parents.iter().zip(&needs).zip(parent_grads) {
                if let (true, Some(parent_grad)) = (need, parent_grad) {
                    self.accumulate_grad_node(&mut grads, parent, parent_grad)?;
                }
            }
        }

        Ok(grads
            .into_iter()
            .filter(|(id, _)| target_set.contains(id))
            .collect())
    }

    /// 同一节点收到多份梯度时用 Add 节点相加
    fn accumulate_grad_node(
        &mut self,
        grads: &mut HashMap<NodeId, NodeId>,
        node: NodeId,
        grad: NodeId,
    ) -> Result<(), GraphError> {
        let accumulated = match grads.get(&node) {
            Some(&existing) => self.new_add_node(existing, grad, None)?,
            None => grad,
        };
        grads.insert(node, accumulated);
        Ok(())
    }

    /// 反向传播（ensure-forward 语义），返回 loss 的标量值
    ///
    /// 梯度会累积到所有能到达的参数节点以及需要梯度的输入节点上（不会自动清零）。
    /// 计算梯度时临时建立的节点在结束后全部删除，图的结构与调用前一致。
    pub fn backward(&mut self, loss_id: NodeId) -> Result<f32, GraphError> {
        self.forward(loss_id)?;
        let loss_value = self
            .get_node(loss_id)?
            .value()
            .and_then(Tensor::get_data_number)
            .ok_or_else(|| {
                GraphError::InvalidOperation(format!(
                    "反向传播的起点必须是标量（仅含 1 个元素），但节点{}的形状为{:?}",
                    loss_id,
                    self.get_node_value_expected_shape(loss_id).unwrap_or(&[])
                ))
            })?;

        let mark = self.next_id;
        let result = self.backward_internal(loss_id);
        self.truncate_nodes_after(mark);
        result?;

        self.last_backward_pass_id += 1;
        Ok(loss_value)
    }

    fn backward_internal(&mut self, loss_id: NodeId) -> Result<(), GraphError> {
        let targets: Vec<NodeId> = self
            .topological_order(&[loss_id])?
            .into_iter()
            .filter(|&id| {
                self.get_node(id)
                    .map(|node| node.is_leaf() && node.requires_grad())
                    .unwrap_or(false)
            })
            .collect();
        if targets.is_empty() {
            log::warn!("节点{}不依赖任何需要梯度的叶子节点，本次反向传播不产生梯度", loss_id);
            return Ok(());
        }

        let loss_shape = self.get_node_value_expected_shape(loss_id)?.to_vec();
        let seed = self.new_constant_node(&Tensor::ones(&loss_shape), None)?;
        let grads = self.build_grad_graph(&[loss_id], &[seed], &targets)?;
        log::debug!(
            "反向传播：loss 节点{}到达{}个叶子节点，新建{}个梯度节点",
            loss_id,
            grads.len(),
            self.next_id - seed.0
        );

        let mut grad_pairs: Vec<(NodeId, NodeId)> = grads.into_iter().collect();
        grad_pairs.sort_unstable();
        let grad_nodes: Vec<NodeId> = grad_pairs.iter().map(|&(_, grad)| grad).collect();
        self.forward_nodes(&grad_nodes)?;

        for (target, grad_node) in grad_pairs {
            let grad_value = self.get_grad_value(grad_node)?;
            self.get_node_mut(target)?.accumulate_grad(&grad_value);
        }
        Ok(())
    }

    /// 读取已经前向计算过的梯度节点的值
    pub(in crate::nn::graph) fn get_grad_value(&self, grad_node: NodeId) -> Result<Tensor, GraphError> {
        self.get_node(grad_node)?.value().cloned().ok_or_else(|| {
            GraphError::ComputationError(format!("梯度节点{}没有值", grad_node))
        })
    }
}
