use thiserror::Error;
mod ops;
pub use self::ops::*;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    // 张量二元运算
    #[error(
        "形状不一致，故无法{operator}：第一个张量的形状为{tensor1_shape:?}，第二个张量的形状为{tensor2_shape:?}"
    )]
    OperatorError {
        operator: Operator,
        tensor1_shape: Vec<usize>,
        tensor2_shape: Vec<usize>,
    },

    #[error("张量形状不兼容")]
    IncompatibleShape,
    #[error("张量形状{from:?}无法广播到{to:?}")]
    BroadcastFailed { from: Vec<usize>, to: Vec<usize> },
    #[error("张量形状{from:?}无法求和归约到{to:?}")]
    ReduceFailed { from: Vec<usize>, to: Vec<usize> },
    #[error("该运算需要{expected}维张量，但得到{got}维")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("维度{axis}越界：张量只有{ndim}维")]
    AxisOutOfRange { axis: usize, ndim: usize },
    #[error("区间[{start}, {end})越界：该维度长度为{len}")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },
}
