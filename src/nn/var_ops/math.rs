use crate::nn::Var;

/// 逐元素数学函数扩展 trait
pub trait VarMathOps {
    /// 逐元素平方
    fn square(&self) -> Var;

    /// 逐元素开方（0 处的梯度取 0）
    fn sqrt(&self) -> Var;
}

impl VarMathOps for Var {
    fn square(&self) -> Var {
        let id = self
            .graph()
            .borrow_mut()
            .new_square_node(self.node_id(), None)
            .expect("创建 Square 节点失败");
        self.wrap(id)
    }

    fn sqrt(&self) -> Var {
        let id = self
            .graph()
            .borrow_mut()
            .new_sqrt_node(self.node_id(), None)
            .expect("创建 Sqrt 节点失败");
        self.wrap(id)
    }
}
