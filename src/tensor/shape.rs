/*
 * @Author       : 老董
 * @Date         : 2023-10-21 03:22:26
 * @Description  : 张量的形状相关操作：变形、转置、切片/填充、广播与求和归约
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 */

use super::Tensor;
use crate::errors::TensorError;
use ndarray::{Array, Axis, IxDyn, Slice};

/// 计算两个形状按 NumPy 规则广播后的形状，不兼容时返回 None
///
/// # 广播规则
/// - 从右向左对齐维度
/// - 每个维度必须相等，或其中一个为 1
/// - 维度数不同时，较短的形状前面补 1
pub fn broadcast_shape(shape_a: &[usize], shape_b: &[usize]) -> Option<Vec<usize>> {
    let ndim = shape_a.len().max(shape_b.len());
    let mut result = vec![0; ndim];
    for i in 0..ndim {
        let a = if i < ndim - shape_a.len() {
            1
        } else {
            shape_a[i - (ndim - shape_a.len())]
        };
        let b = if i < ndim - shape_b.len() {
            1
        } else {
            shape_b[i - (ndim - shape_b.len())]
        };
        result[i] = match (a, b) {
            (a, b) if a == b => a,
            (1, b) => b,
            (a, 1) => a,
            _ => return None,
        };
    }
    Some(result)
}

impl Tensor {
    /// 判断能否与另一个张量广播
    pub fn can_broadcast_with(&self, other: &Self) -> bool {
        broadcast_shape(self.shape(), other.shape()).is_some()
    }

    /// 按行优先顺序变形，元素总数必须一致，否则panic
    pub fn reshape(&self, shape: &[usize]) -> Self {
        let total_elements: usize = self.size();
        let new_total_elements: usize = shape.iter().product();
        assert!(
            total_elements == new_total_elements,
            "{}",
            TensorError::IncompatibleShape
        );
        let data = Array::from_shape_vec(IxDyn(shape), self.to_vec())
            .unwrap_or_else(|e| panic!("张量变形失败：{e}"));
        Self { data }
    }

    /// 二维张量（矩阵）转置
    pub fn transpose(&self) -> Self {
        assert!(
            self.dimension() == 2,
            "{}",
            TensorError::DimensionMismatch {
                expected: 2,
                got: self.dimension(),
            }
        );
        Self {
            data: self.data.clone().reversed_axes().as_standard_layout().into_owned(),
        }
    }

    /// 沿`axis`截取`[start, start + len)`区间（保留该维度）
    pub fn narrow(&self, axis: usize, start: usize, len: usize) -> Self {
        self.check_axis_range(axis, start, len, self.shape().get(axis).copied());
        Self {
            data: self
                .data
                .slice_axis(Axis(axis), Slice::from(start..start + len))
                .to_owned(),
        }
    }

    /// `narrow`的逆操作：沿`axis`补零至长度`full_len`，本张量放在`[start, start + len)`处
    pub fn pad(&self, axis: usize, start: usize, full_len: usize) -> Self {
        let len = self.shape().get(axis).copied().unwrap_or(0);
        self.check_axis_range(axis, start, len, Some(full_len));
        let mut shape = self.shape().to_vec();
        shape[axis] = full_len;
        let mut data = Array::<f32, _>::zeros(IxDyn(&shape));
        data.slice_axis_mut(Axis(axis), Slice::from(start..start + len))
            .assign(&self.data);
        Self { data }
    }

    fn check_axis_range(&self, axis: usize, start: usize, len: usize, axis_len: Option<usize>) {
        assert!(
            axis < self.dimension(),
            "{}",
            TensorError::AxisOutOfRange {
                axis,
                ndim: self.dimension(),
            }
        );
        let axis_len = axis_len.unwrap_or(0);
        assert!(
            start + len <= axis_len,
            "{}",
            TensorError::RangeOutOfBounds {
                start,
                end: start + len,
                len: axis_len,
            }
        );
    }

    /// 广播到目标形状
    ///
    /// 仅含 1 个元素的张量可以填充到任意形状（不受维度数限制）；
    /// 其余情况遵循 NumPy 广播规则，无法广播时panic
    pub fn broadcast_to(&self, target: &[usize]) -> Self {
        if self.shape() == target {
            return self.clone();
        }
        if let Some(number) = self.get_data_number() {
            return Self::full(number, target);
        }
        let view = self.data.broadcast(IxDyn(target)).unwrap_or_else(|| {
            panic!(
                "{}",
                TensorError::BroadcastFailed {
                    from: self.shape().to_vec(),
                    to: target.to_vec(),
                }
            )
        });
        Self {
            data: view.to_owned(),
        }
    }

    /// 沿被广播的维度求和，把张量归约回`target`形状（`broadcast_to`的伴随操作）
    ///
    /// 目标仅含 1 个元素时对全部元素求和；其余情况下`target`必须能广播到本张量的形状
    pub fn sum_to_shape(&self, target: &[usize]) -> Self {
        if self.shape() == target {
            return self.clone();
        }
        if target.iter().product::<usize>() == 1 {
            return Self::full(self.data.sum(), target);
        }

        let reduce_failed = || TensorError::ReduceFailed {
            from: self.shape().to_vec(),
            to: target.to_vec(),
        };
        assert!(target.len() <= self.dimension(), "{}", reduce_failed());

        let mut data = self.data.clone();
        // 先消去多余的前导维度
        while data.ndim() > target.len() {
            data = data.sum_axis(Axis(0));
        }
        for (axis, &t) in target.iter().enumerate() {
            let s = data.shape()[axis];
            if t == s {
                continue;
            }
            assert!(t == 1, "{}", reduce_failed());
            data = data.sum_axis(Axis(axis)).insert_axis(Axis(axis));
        }
        Self { data }
    }
}
