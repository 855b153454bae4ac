/*
 * @Author       : 老董
 * @Description  : 对任意输入求导（grad）的测试：一阶/二阶导数、create_graph、allow_unused 及错误处理
 */

use crate::assert_err;
use crate::nn::autograd::{grad, GradOptions};
use crate::nn::{Graph, GraphError, Init, Var, VarMathOps, VarReduceOps};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

fn value_of(var: &Option<Var>) -> Tensor {
    var.as_ref().unwrap().value().unwrap().unwrap()
}

/// x = [[1, 2, 3]]（需要梯度）与 y = sum(x³)
fn cubic(graph: &Graph) -> (Var, Var) {
    let x = graph
        .input_with_grad(&Tensor::new(&[1., 2., 3.], &[1, 3]))
        .unwrap();
    let y = (x.square() * &x).sum();
    (x, y)
}

// ==================== 一阶/二阶导数 ====================

#[test]
fn test_grad_first_order() {
    let graph = Graph::new();
    let (x, y) = cubic(&graph);
    let nodes_count = graph.nodes_count();

    let grads = grad(&[&y], &[&x], None, GradOptions::default()).unwrap();
    assert_eq!(grads.len(), 1);
    assert_abs_diff_eq!(
        value_of(&grads[0]),
        Tensor::new(&[3., 12., 27.], &[1, 3]),
        epsilon = 1e-5
    );
    // create_graph = false：临时节点被清理，只留下 1 个承载结果的常量节点
    assert_eq!(graph.nodes_count(), nodes_count + 1);
    assert!(!grads[0].as_ref().unwrap().requires_grad());
}

#[test]
fn test_grad_second_order() {
    let graph = Graph::new();
    let (x, y) = cubic(&graph);

    let grads = grad(&[&y], &[&x], None, GradOptions::create_graph()).unwrap();
    let dx = grads[0].clone().unwrap();
    assert!(dx.requires_grad());
    assert_abs_diff_eq!(
        dx.value().unwrap().unwrap(),
        Tensor::new(&[3., 12., 27.], &[1, 3]),
        epsilon = 1e-5
    );

    // d(sum(3x²))/dx = 6x
    let grads = grad(&[&dx.sum()], &[&x], None, GradOptions::default()).unwrap();
    assert_abs_diff_eq!(
        value_of(&grads[0]),
        Tensor::new(&[6., 12., 18.], &[1, 3]),
        epsilon = 1e-5
    );
}

#[test]
fn test_grad_of_grad_norm_through_backward() {
    // loss = sum((∂(w·x²)/∂x)²) = sum((2wx)²)，∂loss/∂w = 8wx²
    let graph = Graph::new();
    let x = graph
        .input_with_grad(&Tensor::new(&[1., 2.], &[1, 2]))
        .unwrap();
    let w = graph.parameter(&[1, 1], Init::Constant(0.5), "w").unwrap();
    let f = (x.square() * &w).sum();

    let grads = grad(&[&f], &[&x], None, GradOptions::create_graph()).unwrap();
    let dx = grads[0].clone().unwrap();
    let loss = dx.square().sum();
    // dx = [1, 2]，loss = 5
    assert_abs_diff_eq!(loss.backward().unwrap(), 5., epsilon = 1e-5);
    // ∂loss/∂w = sum(8 * 0.5 * x²) = 4 * (1 + 4) = 20
    assert_abs_diff_eq!(
        w.grad().unwrap().unwrap(),
        Tensor::new(&[20.], &[1, 1]),
        epsilon = 1e-4
    );
}

#[test]
fn test_grad_does_not_touch_accumulated_grads() {
    let graph = Graph::new();
    let w = graph.parameter(&[1, 2], Init::Ones, "w").unwrap();
    let loss = w.square().sum();

    grad(&[&loss], &[&w], None, GradOptions::default()).unwrap();
    assert_eq!(w.grad().unwrap(), None);

    loss.backward().unwrap();
    grad(&[&loss], &[&w], None, GradOptions::create_graph()).unwrap();
    assert_eq!(w.grad().unwrap(), Some(Tensor::new(&[2., 2.], &[1, 2])));
}

#[test]
fn test_grad_multiple_outputs_and_inputs() {
    let graph = Graph::new();
    let a = graph.input_with_grad(&Tensor::new(&[2.], &[1, 1])).unwrap();
    let b = graph.input_with_grad(&Tensor::new(&[3.], &[1, 1])).unwrap();
    let y1 = &a * &b;
    let y2 = a.square();

    // 多个输出的梯度相加：∂(ab + a²)/∂a = b + 2a = 7，∂/∂b = a = 2
    let grads = grad(&[&y1, &y2], &[&a, &b], None, GradOptions::default()).unwrap();
    assert_abs_diff_eq!(value_of(&grads[0]), Tensor::new(&[7.], &[1, 1]), epsilon = 1e-6);
    assert_abs_diff_eq!(value_of(&grads[1]), Tensor::new(&[2.], &[1, 1]), epsilon = 1e-6);
}

#[test]
fn test_grad_with_grad_outputs() {
    let graph = Graph::new();
    let x = graph
        .input_with_grad(&Tensor::new(&[1., 2., 3.], &[1, 3]))
        .unwrap();
    let y = x.square();

    // 非标量输出必须显式提供上游梯度
    assert_err!(
        grad(&[&y], &[&x], None, GradOptions::default()),
        GraphError::InvalidOperation(msg) if msg.contains("grad_outputs")
    );

    let seeds = [Tensor::new(&[1., 0., -1.], &[1, 3])];
    let grads = grad(&[&y], &[&x], Some(&seeds), GradOptions::default()).unwrap();
    assert_abs_diff_eq!(
        value_of(&grads[0]),
        Tensor::new(&[2., 0., -6.], &[1, 3]),
        epsilon = 1e-6
    );

    // 形状不一致 / 个数不一致
    let wrong_shape = [Tensor::ones(&[3, 1])];
    assert_err!(
        grad(&[&y], &[&x], Some(&wrong_shape), GradOptions::default()),
        GraphError::ShapeMismatch { .. }
    );
    let wrong_count = [Tensor::ones(&[1, 3]), Tensor::ones(&[1, 3])];
    assert_err!(
        grad(&[&y], &[&x], Some(&wrong_count), GradOptions::default()),
        GraphError::InvalidOperation(_)
    );
}

// ==================== allow_unused ====================

#[test]
fn test_grad_unused_input() {
    let graph = Graph::new();
    let (x, y) = cubic(&graph);
    let z = graph.input_with_grad(&Tensor::new(&[1.], &[1, 1])).unwrap();
    let nodes_count = graph.nodes_count();

    assert_err!(
        grad(&[&y], &[&x, &z], None, GradOptions::default()),
        GraphError::UnusedInput(_)
    );
    // 出错时临时节点同样被清理
    assert_eq!(graph.nodes_count(), nodes_count);

    let options = GradOptions::create_graph().with_allow_unused(true);
    let grads = grad(&[&y], &[&x, &z], None, options).unwrap();
    assert!(grads[0].is_some());
    assert!(grads[1].is_none());
}

// ==================== 错误 ====================

#[test]
fn test_grad_requires_grad_missing() {
    let graph = Graph::new();
    let x = graph.input(&Tensor::new(&[1., 2.], &[1, 2])).unwrap();
    let w = graph.parameter(&[1, 2], Init::Ones, "w").unwrap();
    let y = (&x * &w).sum();

    // 1. 输入不需要梯度
    assert_err!(
        grad(&[&y], &[&x], None, GradOptions::default()),
        GraphError::RequiresGradMissing(_)
    );
    // 2. 输出不依赖任何需要梯度的节点
    let c = x.sum();
    assert_err!(
        grad(&[&c], &[&w], None, GradOptions::default()),
        GraphError::RequiresGradMissing(_)
    );
    // 3. 空的 outputs/inputs
    assert_err!(
        grad(&[], &[&w], None, GradOptions::default()),
        GraphError::InvalidOperation(_)
    );
    assert_err!(
        grad(&[&y], &[], None, GradOptions::default()),
        GraphError::InvalidOperation(_)
    );
}

#[test]
fn test_grad_across_graphs() {
    let graph_1 = Graph::new();
    let graph_2 = Graph::new();
    let x = graph_1.input_with_grad(&Tensor::new(&[1.], &[1, 1])).unwrap();
    let y = graph_2.input_with_grad(&Tensor::new(&[1.], &[1, 1])).unwrap();
    let loss = y.square().sum();

    assert_err!(
        grad(&[&loss], &[&x], None, GradOptions::default()),
        GraphError::InvalidOperation(msg) if msg.contains("不同 Graph")
    );
}
