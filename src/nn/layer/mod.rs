/*
 * @Author       : 老董
 * @Date         : 2025-12-22
 * @Description  : Layer 模块 - 组合 Node 构建常见网络结构
 */

mod linear;

pub use linear::Linear;
