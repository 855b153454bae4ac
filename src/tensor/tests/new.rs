use crate::assert_panic;
use crate::tensor::Tensor;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn test_new() {
    let tensor = Tensor::new(&[1., 2., 3., 4.], &[2, 2]);
    assert_eq!(tensor.shape(), &[2, 2]);
    assert_eq!(tensor.dimension(), 2);
    assert_eq!(tensor.size(), 4);
    assert_eq!(tensor.to_vec(), vec![1., 2., 3., 4.]);

    // 数据长度与形状不匹配
    assert_panic!(Tensor::new(&[1., 2., 3.], &[2, 2]));
}

#[test]
fn test_zeros_ones_full() {
    assert_eq!(Tensor::zeros(&[2, 3]).to_vec(), vec![0.; 6]);
    assert_eq!(Tensor::ones(&[3, 1]).to_vec(), vec![1.; 3]);
    let tensor = Tensor::full(2.5, &[1, 1]);
    assert!(tensor.is_scalar());
    assert_eq!(tensor.get_data_number(), Some(2.5));
    assert_eq!(Tensor::ones(&[2]).get_data_number(), None);
}

#[test]
fn test_uniform_with_rng() {
    let mut rng = StdRng::seed_from_u64(42);
    let tensor = Tensor::uniform_with_rng(-1., 1., &[4, 5], &mut rng);
    assert_eq!(tensor.shape(), &[4, 5]);
    assert!(tensor.to_vec().iter().all(|x| (-1.0..=1.0).contains(x)));

    // 相同种子得到相同结果
    let mut rng1 = StdRng::seed_from_u64(7);
    let mut rng2 = StdRng::seed_from_u64(7);
    assert_eq!(
        Tensor::uniform_with_rng(0., 1., &[3], &mut rng1),
        Tensor::uniform_with_rng(0., 1., &[3], &mut rng2)
    );
}

#[test]
fn test_normal_with_rng() {
    let mut rng = StdRng::seed_from_u64(0);
    let tensor = Tensor::normal_with_rng(1., 0.5, &[100, 100], &mut rng);
    assert!(tensor.is_finite());
    let mean = tensor.mean().get_data_number().unwrap();
    assert!((mean - 1.).abs() < 0.05, "均值偏差过大：{}", mean);
    // 奇数个元素
    assert_eq!(Tensor::normal_with_rng(0., 1., &[3], &mut rng).size(), 3);
}
