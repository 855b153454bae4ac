/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : GraphInner 核心操作 + 前向传播
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::{NodeHandle, NodeType, TraitNode};
use crate::tensor::Tensor;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{HashMap, HashSet};

impl GraphInner {
    // ========== 创建 ==========

    pub fn new() -> Self {
        Self::with_name("default_graph")
    }

    /// 创建一个带固定种子的计算图（确保可重复性）
    pub fn new_with_seed(seed: u64) -> Self {
        let mut graph = Self::new();
        graph.set_seed(seed);
        graph
    }

    pub fn with_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: HashMap::new(),
            node_names: HashSet::new(),
            forward_edges: HashMap::new(),
            backward_edges: HashMap::new(),
            last_forward_pass_id: 0,
            last_backward_pass_id: 0,
            next_id: 0,
            rng: None,
        }
    }

    // ========== 基础访问器 ==========

    #[cfg(test)]
    pub(in crate::nn) const fn last_forward_pass_id(&self) -> u64 {
        self.last_forward_pass_id
    }

    #[cfg(test)]
    pub(in crate::nn) const fn last_backward_pass_id(&self) -> u64 {
        self.last_backward_pass_id
    }

    /// 设置/重置图的随机种子
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = Some(StdRng::seed_from_u64(seed));
    }

    /// 检查图是否有固定种子
    pub const fn has_seed(&self) -> bool {
        self.rng.is_some()
    }

    /// 图级别的随机数生成器（未设置种子时为 None）
    pub(in crate::nn) fn rng_mut(&mut self) -> Option<&mut StdRng> {
        self.rng.as_mut()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 所有节点 id（升序）
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub(in crate::nn) fn get_node(&self, id: NodeId) -> Result<&NodeHandle, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub(in crate::nn) fn get_node_mut(&mut self, id: NodeId) -> Result<&mut NodeHandle, GraphError> {
        self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub(in crate::nn) fn get_nodes(&self, ids: &[NodeId]) -> Result<Vec<&NodeHandle>, GraphError> {
        ids.iter().map(|&id| self.get_node(id)).collect()
    }

    pub fn get_node_parents(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        // 先检查节点是否存在
        let _ = self.get_node(id)?;
        Ok(self.backward_edges.get(&id).cloned().unwrap_or_default())
    }

    pub fn get_node_children(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        let _ = self.get_node(id)?;
        Ok(self.forward_edges.get(&id).cloned().unwrap_or_default())
    }

    pub fn get_node_name(&self, id: NodeId) -> Result<&str, GraphError> {
        Ok(self.get_node(id)?.name())
    }

    pub fn get_node_type_name(&self, id: NodeId) -> Result<&'static str, GraphError> {
        Ok(self.get_node(id)?.type_name())
    }

    pub fn get_node_value_expected_shape(&self, id: NodeId) -> Result<&[usize], GraphError> {
        Ok(self.get_node(id)?.value_expected_shape())
    }

    pub fn get_node_value(&self, id: NodeId) -> Result<Option<&Tensor>, GraphError> {
        Ok(self.get_node(id)?.value())
    }

    pub fn set_node_value(&mut self, id: NodeId, value: Option<&Tensor>) -> Result<(), GraphError> {
        self.get_node_mut(id)?.set_value(value)
    }

    pub fn node_requires_grad(&self, id: NodeId) -> Result<bool, GraphError> {
        Ok(self.get_node(id)?.requires_grad())
    }

    /// 获取`backward`累积在节点上的梯度（从未参与反向传播的节点返回 None）
    pub fn get_node_grad(&self, id: NodeId) -> Result<Option<Tensor>, GraphError> {
        Ok(self.get_node(id)?.grad().cloned())
    }

    /// 获取所有可训练的参数节点（按 id 升序）
    pub fn get_trainable_nodes(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .nodes
            .iter()
            .filter_map(|(&id, node)| node.is_parameter().then_some(id))
            .collect();
        ids.sort_unstable();
        ids
    }

    /// 清空所有节点上累积的梯度
    pub fn clear_grad(&mut self) -> Result<(), GraphError> {
        for node in self.nodes.values_mut() {
            node.clear_grad();
        }
        Ok(())
    }

    // ========== ID/名称生成 ==========

    pub(in crate::nn::graph) fn generate_valid_node_id(&mut self) -> NodeId {
        // 先递增再返回，所以第一个节点 ID 是 1
        self.next_id += 1;
        NodeId(self.next_id)
    }

    pub(in crate::nn::graph) fn check_duplicate_node_name(&self, name: &str) -> Result<(), GraphError> {
        if self.node_names.contains(name) {
            return Err(GraphError::DuplicateNodeName(format!(
                "节点{}在图{}中重复",
                name,
                self.name()
            )));
        }
        Ok(())
    }

    /// 未指定名称时按“类型_id”生成，如`add_7`
    fn generate_valid_new_node_name(
        &self,
        name: Option<&str>,
        type_name: &str,
        id: NodeId,
    ) -> Result<String, GraphError> {
        if let Some(name) = name {
            self.check_duplicate_node_name(name)?;
            return Ok(name.to_string());
        }
        let base = format!("{}_{}", type_name.to_lowercase(), id);
        let mut name = base.clone();
        let mut counter = 1;
        while self.node_names.contains(&name) {
            name = format!("{base}_{counter}");
            counter += 1;
        }
        Ok(name)
    }

    /// 把新节点加入图中，并建立与父节点之间的边
    ///
    /// 算子节点是否需要梯度由父节点推出：可导且任一父节点需要梯度
    pub(in crate::nn::graph) fn add_node_to_list(
        &mut self,
        raw_node: NodeType,
        name: Option<&str>,
        parents: &[NodeId],
        requires_grad: Option<bool>,
    ) -> Result<NodeId, GraphError> {
        let requires_grad = match requires_grad {
            Some(flag) => flag,
            None => {
                raw_node.is_differentiable()
                    && self
                        .get_nodes(parents)?
                        .iter()
                        .any(|parent| parent.requires_grad())
            }
        };

        let node_id = self.generate_valid_node_id();
        let node_name = self.generate_valid_new_node_name(name, raw_node.type_name(), node_id)?;
        self.node_names.insert(node_name.clone());

        for &parent_id in parents {
            self.forward_edges.entry(parent_id).or_default().push(node_id);
        }
        self.backward_edges.insert(node_id, parents.to_vec());

        self.nodes.insert(
            node_id,
            NodeHandle::new(node_id, &node_name, raw_node, requires_grad),
        );
        Ok(node_id)
    }

    /// 删除所有 id 大于`mark`的节点（反向传播/求导期间建立的临时节点）
    pub(in crate::nn::graph) fn truncate_nodes_after(&mut self, mark: u64) {
        let removed: Vec<NodeId> = self
            .nodes
            .keys()
            .filter(|id| id.0 > mark)
            .copied()
            .collect();
        if removed.is_empty() {
            return;
        }
        for id in &removed {
            if let Some(node) = self.nodes.remove(id) {
                self.node_names.remove(node.name());
            }
            self.forward_edges.remove(id);
            self.backward_edges.remove(id);
        }
        for children in self.forward_edges.values_mut() {
            children.retain(|child| child.0 <= mark);
        }
        log::trace!("图{}清理了{}个临时节点", self.name, removed.len());
    }

    // ========== 前向传播 ==========

    pub fn forward(&mut self, node_id: NodeId) -> Result<(), GraphError> {
        let node = self.get_node(node_id)?;
        if node.is_leaf() {
            if node.has_value() {
                return Ok(());
            }
            return Err(GraphError::InvalidOperation(format!(
                "{node}是输入/参数类型，其值应通过 set_value 设置，而非通过父节点前向传播计算"
            )));
        }

        let new_graph_forward_pass_id = self.last_forward_pass_id + 1;
        self.forward_node_internal(node_id, new_graph_forward_pass_id)?;
        self.last_forward_pass_id = new_graph_forward_pass_id;
        Ok(())
    }

    /// 在同一次前向传播（同一个 pass id）中计算多个节点，共享的祖先节点只计算一次
    pub(in crate::nn::graph) fn forward_nodes(&mut self, node_ids: &[NodeId]) -> Result<(), GraphError> {
        let new_graph_forward_pass_id = self.last_forward_pass_id + 1;
        for &node_id in node_ids {
            self.forward_node_internal(node_id, new_graph_forward_pass_id)?;
        }
        self.last_forward_pass_id = new_graph_forward_pass_id;
        Ok(())
    }

    fn forward_node_internal(
        &mut self,
        node_id: NodeId,
        new_graph_forward_pass_id: u64,
    ) -> Result<(), GraphError> {
        let node = self.get_node_mut(node_id)?;

        if node.is_leaf() {
            if node.has_value() {
                node.set_last_forward_pass_id(new_graph_forward_pass_id);
                return Ok(());
            }
            return Err(GraphError::InvalidOperation(format!(
                "{}不能直接前向传播",
                node
            )));
        }
        if node.last_forward_pass_id() == new_graph_forward_pass_id {
            return Ok(());
        }

        let parents_ids = self.get_node_parents(node_id)?;
        for parent_id in &parents_ids {
            self.forward_node_internal(*parent_id, new_graph_forward_pass_id)?;
        }

        let value = {
            let node = self.get_node(node_id)?;
            let parent_values = parents_ids
                .iter()
                .map(|&id| {
                    let parent = self.get_node(id)?;
                    parent.value().ok_or_else(|| {
                        GraphError::ComputationError(format!("{}的父节点{}没有值", node, parent))
                    })
                })
                .collect::<Result<Vec<&Tensor>, GraphError>>()?;
            node.node_type().calc_value_by_parents(&parent_values)?
        };

        self.get_node_mut(node_id)?
            .set_computed_value(value, new_graph_forward_pass_id);
        Ok(())
    }
}
