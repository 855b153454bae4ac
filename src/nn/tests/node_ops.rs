/*
 * @Author       : 老董
 * @Description  : 各算子节点的前向值与梯度（VJP）测试
 *
 * 梯度统一通过 grad(sum(op(...) * c), inputs) 验证，其中 c 为常量权重，
 * 这样每个位置的上游梯度各不相同，能发现转置、广播方向上的错误。
 */

use crate::nn::autograd::{grad, GradOptions};
use crate::nn::{
    Graph, Var, VarActivationOps, VarMathOps, VarMatrixOps, VarReduceOps, VarShapeOps,
};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

fn grads_of(output: &Var, inputs: &[&Var]) -> Vec<Tensor> {
    grad(&[output], inputs, None, GradOptions::default())
        .unwrap()
        .into_iter()
        .map(|grad| grad.unwrap().value().unwrap().unwrap())
        .collect()
}

fn forward_value(var: &Var) -> Tensor {
    var.forward().unwrap();
    var.value().unwrap().unwrap()
}

// ==================== 二元逐元素算子 ====================

#[test]
fn test_add_broadcast() {
    let graph = Graph::new();
    let a = graph
        .input_with_grad(&Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]))
        .unwrap();
    let b = graph
        .input_with_grad(&Tensor::new(&[10., 20., 30.], &[1, 3]))
        .unwrap();
    let c = graph
        .constant(&Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]))
        .unwrap();
    let y = &a + &b;

    assert_eq!(
        forward_value(&y),
        Tensor::new(&[11., 22., 33., 14., 25., 36.], &[2, 3])
    );
    let grads = grads_of(&(&y * &c).sum(), &[&a, &b]);
    assert_eq!(grads[0], Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]));
    // 被广播的父节点沿广播维度求和
    assert_eq!(grads[1], Tensor::new(&[5., 7., 9.], &[1, 3]));
}

#[test]
fn test_subtract() {
    let graph = Graph::new();
    let a = graph
        .input_with_grad(&Tensor::new(&[1., 2., 3., 4.], &[2, 2]))
        .unwrap();
    let b = graph.input_with_grad(&Tensor::new(&[1.], &[1, 1])).unwrap();
    let y = &a - &b;

    assert_eq!(forward_value(&y), Tensor::new(&[0., 1., 2., 3.], &[2, 2]));
    let grads = grads_of(&y.sum(), &[&a, &b]);
    assert_eq!(grads[0], Tensor::ones(&[2, 2]));
    assert_eq!(grads[1], Tensor::new(&[-4.], &[1, 1]));
}

#[test]
fn test_multiply() {
    let graph = Graph::new();
    let a = graph
        .input_with_grad(&Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]))
        .unwrap();
    let b = graph
        .input_with_grad(&Tensor::new(&[10., 20., 30.], &[1, 3]))
        .unwrap();
    let y = &a * &b;

    assert_eq!(
        forward_value(&y),
        Tensor::new(&[10., 40., 90., 40., 100., 180.], &[2, 3])
    );
    let grads = grads_of(&y.sum(), &[&a, &b]);
    assert_eq!(
        grads[0],
        Tensor::new(&[10., 20., 30., 10., 20., 30.], &[2, 3])
    );
    assert_eq!(grads[1], Tensor::new(&[5., 7., 9.], &[1, 3]));
}

#[test]
fn test_divide() {
    let graph = Graph::new();
    let a = graph.input_with_grad(&Tensor::new(&[2., 4.], &[1, 2])).unwrap();
    let b = graph.input_with_grad(&Tensor::new(&[1., 2.], &[1, 2])).unwrap();
    let y = &a / &b;

    assert_eq!(forward_value(&y), Tensor::new(&[2., 2.], &[1, 2]));
    // ∂(a/b)/∂a = 1/b，∂(a/b)/∂b = -a/b²
    let grads = grads_of(&y.sum(), &[&a, &b]);
    assert_abs_diff_eq!(grads[0], Tensor::new(&[1., 0.5], &[1, 2]), epsilon = 1e-6);
    assert_abs_diff_eq!(grads[1], Tensor::new(&[-2., -1.], &[1, 2]), epsilon = 1e-6);
}

#[test]
fn test_safe_divide() {
    let graph = Graph::new();
    let a = graph.input_with_grad(&Tensor::new(&[3., 5.], &[1, 2])).unwrap();
    let b = graph.input_with_grad(&Tensor::new(&[2., 0.], &[1, 2])).unwrap();
    let id = graph
        .inner_mut()
        .new_safe_divide_node(a.node_id(), b.node_id(), None)
        .unwrap();
    let y = graph.wrap_node_id(id);

    // 除数为 0 处结果与梯度均为 0
    assert_eq!(forward_value(&y), Tensor::new(&[1.5, 0.], &[1, 2]));
    let grads = grads_of(&y.sum(), &[&a, &b]);
    assert_abs_diff_eq!(grads[0], Tensor::new(&[0.5, 0.], &[1, 2]), epsilon = 1e-6);
    assert_abs_diff_eq!(grads[1], Tensor::new(&[-0.75, 0.], &[1, 2]), epsilon = 1e-6);
}

#[test]
fn test_scalar_ops() {
    let graph = Graph::new();
    let a = graph.input_with_grad(&Tensor::new(&[1., -2.], &[1, 2])).unwrap();

    let y = 3.0 * &a + 1.0;
    assert_eq!(forward_value(&y), Tensor::new(&[4., -5.], &[1, 2]));
    assert_eq!(grads_of(&y.sum(), &[&a])[0], Tensor::new(&[3., 3.], &[1, 2]));

    let y = (&a - 1.0) / 2.0;
    assert_eq!(forward_value(&y), Tensor::new(&[0., -1.5], &[1, 2]));
    assert_eq!(grads_of(&y.sum(), &[&a])[0], Tensor::new(&[0.5, 0.5], &[1, 2]));

    let y = -&a;
    assert_eq!(forward_value(&y), Tensor::new(&[-1., 2.], &[1, 2]));
    assert_eq!(grads_of(&y.sum(), &[&a])[0], Tensor::new(&[-1., -1.], &[1, 2]));
}

// ==================== 矩阵与形状 ====================

#[test]
fn test_mat_mul() {
    let graph = Graph::new();
    let a = graph.input_with_grad(&Tensor::new(&[1., 2.], &[1, 2])).unwrap();
    let b = graph
        .input_with_grad(&Tensor::new(&[1., 2., 3., 4.], &[2, 2]))
        .unwrap();
    let y = a.matmul(&b).unwrap();

    assert_eq!(forward_value(&y), Tensor::new(&[7., 10.], &[1, 2]));
    // ∂/∂a = g @ bᵀ，∂/∂b = aᵀ @ g
    let grads = grads_of(&y.sum(), &[&a, &b]);
    assert_eq!(grads[0], Tensor::new(&[3., 7.], &[1, 2]));
    assert_eq!(grads[1], Tensor::new(&[1., 1., 2., 2.], &[2, 2]));
}

#[test]
fn test_transpose_and_reshape() {
    let graph = Graph::new();
    let a = graph
        .input_with_grad(&Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]))
        .unwrap();

    let t = a.transpose().unwrap();
    assert_eq!(t.value_expected_shape(), vec![3, 2]);
    assert_eq!(
        forward_value(&t),
        Tensor::new(&[1., 4., 2., 5., 3., 6.], &[3, 2])
    );
    let c = graph
        .constant(&Tensor::new(&[1., 2., 3., 4., 5., 6.], &[3, 2]))
        .unwrap();
    assert_eq!(
        grads_of(&(&t * &c).sum(), &[&a])[0],
        Tensor::new(&[1., 3., 5., 2., 4., 6.], &[2, 3])
    );

    let r = a.reshape(&[3, 2]).unwrap();
    assert_eq!(
        forward_value(&r),
        Tensor::new(&[1., 2., 3., 4., 5., 6.], &[3, 2])
    );
    assert_eq!(
        grads_of(&(&r * &c).sum(), &[&a])[0],
        Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3])
    );
}

#[test]
fn test_sum_to_and_broadcast_to() {
    let graph = Graph::new();
    let a = graph
        .input_with_grad(&Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]))
        .unwrap();

    // 按行求和，保留维度
    let s = a.sum_axis(1).unwrap();
    assert_eq!(forward_value(&s), Tensor::new(&[6., 15.], &[2, 1]));
    let c = graph.constant(&Tensor::new(&[1., 2.], &[2, 1])).unwrap();
    assert_eq!(
        grads_of(&(&s * &c).sum(), &[&a])[0],
        Tensor::new(&[1., 1., 1., 2., 2., 2.], &[2, 3])
    );

    // 整体求和/均值
    assert_eq!(forward_value(&a.sum()), Tensor::new(&[21.], &[1, 1]));
    assert_abs_diff_eq!(a.mean().item().unwrap(), 3.5, epsilon = 1e-6);
    assert_abs_diff_eq!(
        grads_of(&a.mean(), &[&a])[0],
        Tensor::full(1. / 6., &[2, 3]),
        epsilon = 1e-6
    );

    // 广播的梯度是沿广播维度求和
    let row = graph.input_with_grad(&Tensor::new(&[1., 2.], &[1, 2])).unwrap();
    let b = row.broadcast_to(&[3, 2]).unwrap();
    assert_eq!(
        forward_value(&b),
        Tensor::new(&[1., 2., 1., 2., 1., 2.], &[3, 2])
    );
    assert_eq!(grads_of(&b.sum(), &[&row])[0], Tensor::new(&[3., 3.], &[1, 2]));
}

#[test]
fn test_narrow_and_pad() {
    let graph = Graph::new();
    let a = graph
        .input_with_grad(&Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]))
        .unwrap();

    let n = a.narrow(1, 1, 2).unwrap();
    assert_eq!(forward_value(&n), Tensor::new(&[2., 3., 5., 6.], &[2, 2]));
    // 未被截取的位置梯度为 0
    assert_eq!(
        grads_of(&n.square().sum(), &[&a])[0],
        Tensor::new(&[0., 4., 6., 0., 10., 12.], &[2, 3])
    );

    let id = graph
        .inner_mut()
        .new_pad_node(n.node_id(), 1, 0, 4, None)
        .unwrap();
    let p = graph.wrap_node_id(id);
    assert_eq!(
        forward_value(&p),
        Tensor::new(&[2., 3., 0., 0., 5., 6., 0., 0.], &[2, 4])
    );
    let c = graph
        .constant(&Tensor::new(&[1., 2., 3., 4., 5., 6., 7., 8.], &[2, 4]))
        .unwrap();
    assert_eq!(
        grads_of(&(&p * &c).sum(), &[&a])[0],
        Tensor::new(&[0., 1., 2., 0., 5., 6.], &[2, 3])
    );
}

// ==================== 逐元素函数 ====================

#[test]
fn test_square_and_sqrt() {
    let graph = Graph::new();
    let a = graph
        .input_with_grad(&Tensor::new(&[4., 0., 9.], &[1, 3]))
        .unwrap();

    assert_eq!(
        grads_of(&a.square().sum(), &[&a])[0],
        Tensor::new(&[8., 0., 18.], &[1, 3])
    );

    let s = a.sqrt();
    assert_eq!(forward_value(&s), Tensor::new(&[2., 0., 3.], &[1, 3]));
    // 0 处取次梯度 0，而不是无穷大
    let g = grads_of(&s.sum(), &[&a]).remove(0);
    assert_abs_diff_eq!(g, Tensor::new(&[0.25, 0., 1. / 6.], &[1, 3]), epsilon = 1e-6);
}

#[test]
fn test_tanh() {
    let graph = Graph::new();
    let a = graph.input_with_grad(&Tensor::new(&[0., 1.], &[1, 2])).unwrap();
    let y = a.tanh();

    assert_abs_diff_eq!(
        forward_value(&y),
        Tensor::new(&[0., 1f32.tanh()], &[1, 2]),
        epsilon = 1e-6
    );
    let t = 1f32.tanh();
    assert_abs_diff_eq!(
        grads_of(&y.sum(), &[&a])[0],
        Tensor::new(&[1., 1. - t * t], &[1, 2]),
        epsilon = 1e-6
    );

    // 二阶导数：d²tanh/dx² = -2·tanh·(1 - tanh²)
    let grads = grad(&[&y.sum()], &[&a], None, GradOptions::create_graph()).unwrap();
    let dy = grads[0].clone().unwrap();
    assert_abs_diff_eq!(
        grads_of(&dy.sum(), &[&a])[0],
        Tensor::new(&[0., -2. * t * (1. - t * t)], &[1, 2]),
        epsilon = 1e-5
    );
}

#[test]
fn test_leaky_relu() {
    let graph = Graph::new();
    let a = graph
        .input_with_grad(&Tensor::new(&[-2., 0., 3.], &[1, 3]))
        .unwrap();

    let y = a.leaky_relu(0.1);
    assert_abs_diff_eq!(
        forward_value(&y),
        Tensor::new(&[-0.2, 0., 3.], &[1, 3]),
        epsilon = 1e-6
    );
    assert_abs_diff_eq!(
        grads_of(&y.sum(), &[&a])[0],
        Tensor::new(&[0.1, 0.1, 1.], &[1, 3]),
        epsilon = 1e-6
    );

    let y = a.relu();
    assert_eq!(forward_value(&y), Tensor::new(&[0., 0., 3.], &[1, 3]));
    assert_eq!(grads_of(&y.sum(), &[&a])[0], Tensor::new(&[0., 0., 1.], &[1, 3]));

    // 分段线性：二阶导数处处为 0
    let grads = grad(&[&y.sum()], &[&a], None, GradOptions::create_graph()).unwrap();
    let dy = grads[0].clone().unwrap();
    assert!(!dy.requires_grad());
}

#[test]
fn test_detach() {
    let graph = Graph::new();
    let a = graph.input_with_grad(&Tensor::new(&[1., 2.], &[1, 2])).unwrap();
    let d = a.detach().unwrap();

    assert!(!d.requires_grad());
    assert_eq!(forward_value(&d), Tensor::new(&[1., 2.], &[1, 2]));
    assert_eq!(
        grads_of(&(&d * &a).sum(), &[&a])[0],
        Tensor::new(&[1., 2.], &[1, 2])
    );
}
