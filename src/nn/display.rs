/*
 * @Author       : 老董
 * @Date         : 2024-02-04 20:37:13
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-19
 * @Description  : 节点在日志、错误信息中的统一显示格式
 */

use super::NodeId;

/// 如`节点[id=7, name=critic_W, type=Parameter]`
pub(in crate::nn) fn format_node_display(id: NodeId, name: &str, type_name: &str) -> String {
    format!("节点[id={}, name={}, type={}]", id, name, type_name)
}
