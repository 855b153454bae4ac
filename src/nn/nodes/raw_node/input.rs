use super::{TraitNode, VjpContext};
use crate::nn::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;

/// 输入节点：值由用户设置；常量也是不需要梯度的输入节点
#[derive(Debug, Clone)]
pub(in crate::nn) struct Input {
    shape: Vec<usize>,
}

impl Input {
    pub(in crate::nn) fn new(shape: &[usize]) -> Result<Self, GraphError> {
        if shape.is_empty() {
            return Err(GraphError::DimensionMismatch {
                expected: 1,
                got: 0,
                message: "输入节点至少需要 1 维".to_string(),
            });
        }
        Ok(Self {
            shape: shape.to_vec(),
        })
    }
}

impl TraitNode for Input {
    fn type_name(&self) -> &'static str {
        "Input"
    }

    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, _parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(
            "输入节点的值应通过 set_value 设置，而非通过父节点计算".to_string(),
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
