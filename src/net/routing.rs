//! 全局路由
//!
//! 类似“全局路由助手”：拓扑搭完后一次性为每个 (from, dst) 计算最短跳数下一跳。
//! 之后新增的链路不会自动进表，需要再次 `populate`。

use std::collections::{HashMap, VecDeque};

use super::id::NodeId;

#[derive(Debug, Default, Clone)]
pub struct RoutingTable {
    /// (from, dst) -> 所有等价最短路径的下一跳
    next_hops: HashMap<(NodeId, NodeId), Vec<NodeId>>,
    /// 上次计算时的链路数，用于判断表是否过期
    built_for_links: Option<usize>,
    /// ECMP hashing 的盐（来自实验种子）
    hash_salt: u64,
}

impl RoutingTable {
    pub fn new(hash_salt: u64) -> Self {
        Self {
            next_hops: HashMap::new(),
            built_for_links: None,
            hash_salt,
        }
    }

    pub fn set_hash_salt(&mut self, salt: u64) {
        self.hash_salt = salt;
    }

    /// 是否已经计算过
    pub fn is_populated(&self) -> bool {
        self.built_for_links.is_some()
    }

    /// 表是否落后于当前拓扑
    pub fn is_stale(&self, link_count: usize) -> bool {
        self.built_for_links != Some(link_count)
    }

    /// 基于邻接表重算整张表。
    ///
    /// `adj[from]` 为 `from` 的出边邻居，`link_count` 记录本次依据的拓扑规模。
    pub fn populate(&mut self, adj: &[Vec<NodeId>], link_count: usize) {
        let n = adj.len();
        let mut rev: Vec<Vec<NodeId>> = vec![Vec::new(); n];
        for (from, outs) in adj.iter().enumerate() {
            for to in outs {
                rev[to.0].push(NodeId(from));
            }
        }

        self.next_hops.clear();
        let mut dist = vec![usize::MAX; n];
        let mut q = VecDeque::new();

        // 对每个 dst 在反向图上 BFS 得到 dist[*]，
        // 再对每个 from 取 dist[next] == dist[from] - 1 的邻居。
        for dst_idx in 0..n {
            dist.fill(usize::MAX);
            q.clear();
            dist[dst_idx] = 0;
            q.push_back(dst_idx);

            while let Some(v) = q.pop_front() {
                for pred in &rev[v] {
                    if dist[pred.0] == usize::MAX {
                        dist[pred.0] = dist[v] + 1;
                        q.push_back(pred.0);
                    }
                }
            }

            for (from_idx, outs) in adj.iter().enumerate() {
                let df = dist[from_idx];
                if from_idx == dst_idx || df == usize::MAX {
                    continue;
                }
                let mut cands: Vec<NodeId> = outs
                    .iter()
                    .copied()
                    .filter(|nh| dist[nh.0] == df - 1)
                    .collect();
                cands.sort();
                cands.dedup();
                if !cands.is_empty() {
                    self.next_hops.insert((NodeId(from_idx), NodeId(dst_idx)), cands);
                }
            }
        }

        self.built_for_links = Some(link_count);
    }

    /// (from, dst) 的全部等价下一跳
    pub fn next_hops(&self, from: NodeId, dst: NodeId) -> Option<&[NodeId]> {
        self.next_hops.get(&(from, dst)).map(|v| v.as_slice())
    }

    /// 选出一个下一跳；同一 `key`（flow）总是走同一条路径。
    pub fn next_hop(&self, from: NodeId, dst: NodeId, key: u64) -> Option<NodeId> {
        let cands = self.next_hops(from, dst)?;
        if cands.len() == 1 {
            return Some(cands[0]);
        }
        let h = mix64(
            key ^ (from.0 as u64).wrapping_mul(0x9E3779B97F4A7C15)
                ^ (dst.0 as u64)
                ^ self.hash_salt,
        );
        Some(cands[(h as usize) % cands.len()])
    }
}

/// splitmix64：确定性的 64-bit 混合，运行间结果稳定。
fn mix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
