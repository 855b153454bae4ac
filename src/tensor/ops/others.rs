/*
 * @Author       : 老董
 * @Date         : 2023-09-12 19:31:36
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : 张量的其余运算：比较、取反、归约、矩阵乘法以及计算图各节点用到的逐元素函数
 */

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use approx::AbsDiffEq;
use ndarray::{Ix2, Zip};
use std::ops::Neg;

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl AbsDiffEq for Tensor {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::default_epsilon()
    }

    /// 形状严格一致且逐元素误差不超过`epsilon`
    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.is_same_shape(other)
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl Neg for Tensor {
    type Output = Self;

    fn neg(self) -> Self {
        -&self
    }
}

impl Neg for &Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        Tensor {
            data: self.data.mapv(|x| -x),
        }
    }
}

impl Tensor {
    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓归约↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    /// 对张量中的所有元素求和并返回一个形状为[1, 1]的标量。
    pub fn sum(&self) -> Self {
        Self::full(self.data.sum(), &[1, 1])
    }

    /// 所有元素的均值，返回形状为[1, 1]的标量
    pub fn mean(&self) -> Self {
        Self::full(self.data.sum() / self.size() as f32, &[1, 1])
    }
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑归约↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

    /// 二维矩阵乘法：[m, k] @ [k, n] = [m, n]
    pub fn mat_mul(&self, other: &Self) -> Self {
        let operator_error = || TensorError::OperatorError {
            operator: Operator::MatMul,
            tensor1_shape: self.shape().to_vec(),
            tensor2_shape: other.shape().to_vec(),
        };
        let a = self
            .data
            .view()
            .into_dimensionality::<Ix2>()
            .unwrap_or_else(|_| panic!("{}", operator_error()));
        let b = other
            .data
            .view()
            .into_dimensionality::<Ix2>()
            .unwrap_or_else(|_| panic!("{}", operator_error()));
        assert!(a.ncols() == b.nrows(), "{}", operator_error());
        Self {
            data: a.dot(&b).into_dyn(),
        }
    }

    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓逐元素函数↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    pub fn square(&self) -> Self {
        Self {
            data: self.data.mapv(|x| x * x),
        }
    }

    pub fn sqrt(&self) -> Self {
        Self {
            data: self.data.mapv(f32::sqrt),
        }
    }

    pub fn tanh(&self) -> Self {
        Self {
            data: self.data.mapv(f32::tanh),
        }
    }

    /// x if x > 0 else slope * x（slope 为 0 时即 `ReLU`）
    pub fn leaky_relu(&self, slope: f32) -> Self {
        Self {
            data: self.data.mapv(|x| if x > 0.0 { x } else { slope * x }),
        }
    }

    /// `leaky_relu`的导数：1 if x > 0 else slope
    pub fn leaky_relu_mask(&self, slope: f32) -> Self {
        Self {
            data: self.data.mapv(|x| if x > 0.0 { 1.0 } else { slope }),
        }
    }

    /// 逐元素相除，但除数为 0 的位置结果记为 0（形状须严格一致）
    pub fn safe_div(&self, divisor: &Self) -> Self {
        assert!(
            self.is_same_shape(divisor),
            "{}",
            TensorError::OperatorError {
                operator: Operator::Div,
                tensor1_shape: self.shape().to_vec(),
                tensor2_shape: divisor.shape().to_vec(),
            }
        );
        Self {
            data: Zip::from(&self.data)
                .and(&divisor.data)
                .map_collect(|&a, &b| if b == 0.0 { 0.0 } else { a / b }),
        }
    }
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑逐元素函数↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
}
