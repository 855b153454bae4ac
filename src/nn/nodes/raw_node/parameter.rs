use super::{TraitNode, VjpContext};
use crate::nn::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;

/// 参数节点：可训练，始终需要梯度
#[derive(Debug, Clone)]
pub(in crate::nn) struct Parameter {
    shape: Vec<usize>,
}

impl Parameter {
    pub(in crate::nn) fn new(shape: &[usize]) -> Result<Self, GraphError> {
        // 支持 1-4 维：偏置 [n] / [1, n]，FC 权重 [in, out]，更高维的核
        if shape.is_empty() || shape.len() > 4 {
            return Err(GraphError::DimensionMismatch {
                expected: 2,
                got: shape.len(),
                message: format!("参数张量必须是 1-4 维，但收到的维度是{}维", shape.len()),
            });
        }
        Ok(Self {
            shape: shape.to_vec(),
        })
    }
}

impl TraitNode for Parameter {
    fn type_name(&self) -> &'static str {
        "Parameter"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, _parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(
            "参数节点的值应通过初始化或 set_value 设置，而非通过父节点计算".to_string(),
        ))
    }

    fn build_grad_to_parents(
        &self,
        _graph: &mut GraphInner,
        _ctx: &VjpContext<'_>,
    ) -> Result<Vec<Option<NodeId>>, GraphError> {
        Ok(vec![])
    }
}
