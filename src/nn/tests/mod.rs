mod autograd;
mod node_ops;
