/*
 * @Author       : 老董
 * @Date         : 2026-10-19
 * @Description  : 张量的四则运算（+、-、*、/），逐元素计算并返回新的张量：
 *                 1. 纯数与张量运算：结果形状与该张量相同；
 *                 2. 张量与张量运算：支持 NumPy 风格广播，形状不兼容时 panic。
 *                 带不带引用的所有组合都由`impl_elementwise_op!`统一生成。
 */

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use ndarray::ArrayD;
use std::ops::{Add, Div, Mul, Sub};

/// 两个张量逐元素运算的公共入口：先检查能否广播，再交给 ndarray 计算
///
/// # Panics
/// 如果形状不兼容（无法广播）
fn broadcast_elementwise<F>(lhs: &Tensor, rhs: &Tensor, operator: Operator, op: F) -> Tensor
where
    F: FnOnce(&ArrayD<f32>, &ArrayD<f32>) -> ArrayD<f32>,
{
    assert!(
        lhs.can_broadcast_with(rhs),
        "{}",
        TensorError::OperatorError {
            operator,
            tensor1_shape: lhs.shape().to_vec(),
            tensor2_shape: rhs.shape().to_vec(),
        }
    );
    Tensor {
        data: op(&lhs.data, &rhs.data),
    }
}

/// 为`Tensor`/`&Tensor`/`f32`的全部组合实现某个二元运算符，
/// 带所有权的版本都转发给`&Tensor`版本
macro_rules! impl_elementwise_op {
    ($op_trait:ident, $method:ident, $operator:expr) => {
        // f32 op 张量
        impl $op_trait<&Tensor> for f32 {
            type Output = Tensor;

            fn $method(self, tensor: &Tensor) -> Tensor {
                Tensor {
                    data: $op_trait::$method(self, &tensor.data),
                }
            }
        }
        impl $op_trait<Tensor> for f32 {
            type Output = Tensor;

            fn $method(self, tensor: Tensor) -> Tensor {
                $op_trait::$method(self, &tensor)
            }
        }

        // 张量 op f32
        impl $op_trait<f32> for &Tensor {
            type Output = Tensor;

            fn $method(self, scalar: f32) -> Tensor {
                Tensor {
                    data: $op_trait::$method(&self.data, scalar),
                }
            }
        }
        impl $op_trait<f32> for Tensor {
            type Output = Tensor;

            fn $method(self, scalar: f32) -> Tensor {
                $op_trait::$method(&self, scalar)
            }
        }

        // 张量 op 张量
        impl $op_trait<&Tensor> for &Tensor {
            type Output = Tensor;

            fn $method(self, other: &Tensor) -> Tensor {
                broadcast_elementwise(self, other, $operator, |a, b| $op_trait::$method(a, b))
            }
        }
        impl $op_trait<Tensor> for &Tensor {
            type Output = Tensor;

            fn $method(self, other: Tensor) -> Tensor {
                $op_trait::$method(self, &other)
            }
        }
        impl $op_trait<&Tensor> for Tensor {
            type Output = Tensor;

            fn $method(self, other: &Tensor) -> Tensor {
                $op_trait::$method(&self, other)
            }
        }
        impl $op_trait<Tensor> for Tensor {
            type Output = Tensor;

            fn $method(self, other: Tensor) -> Tensor {
                $op_trait::$method(&self, &other)
            }
        }
    };
}

impl_elementwise_op!(Add, add, Operator::Add);
impl_elementwise_op!(Sub, sub, Operator::Sub);
impl_elementwise_op!(Mul, mul, Operator::Mul);
impl_elementwise_op!(Div, div, Operator::Div);
