/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @Description  : Var 扩展 trait 模块
 *
 * 按功能领域组织 Var 的扩展方法，用户按需 import。
 *
 * # 模块结构
 * - `activation`: 激活函数（relu, leaky_relu, tanh）
 * - `math`: 逐元素数学函数（square, sqrt）
 * - `matrix`: 矩阵运算（matmul）
 * - `reduce`: 归约（sum, mean, sum_axis, l2_norm）
 * - `shape`: 形状变换（reshape, flatten, transpose, narrow, broadcast_to）
 *
 * # 使用示例
 * ```ignore
 * use wgan_gp::nn::{VarActivationOps, VarMatrixOps, VarReduceOps, VarShapeOps};
 *
 * let h = x.matmul(&w)?.leaky_relu(0.2);
 * let norms = grad.flatten()?.l2_norm(1)?;
 * let loss = h.mean();
 * ```
 */

mod activation;
mod math;
mod matrix;
mod reduce;
mod shape;

pub use activation::VarActivationOps;
pub use math::VarMathOps;
pub use matrix::VarMatrixOps;
pub use reduce::VarReduceOps;
pub use shape::VarShapeOps;
