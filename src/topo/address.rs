//! IPv4 地址分配
//!
//! 在一个网段内按顺序给设备分配主机地址：第一个设备拿到第一个可用主机地址。

use std::net::Ipv4Addr;

use crate::engine::Engine;
use crate::error::{ExperimentError, Result};
use crate::net::DeviceId;
use tracing::debug;

/// 一个网段（网络地址 + 掩码）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    network: u32,
    mask: u32,
}

impl Block {
    fn new(base: Ipv4Addr, mask: Ipv4Addr) -> Result<Self> {
        let (network, m) = (u32::from(base), u32::from(mask));
        let contiguous = m.leading_ones() + m.trailing_zeros() == 32;
        if !contiguous || network & !m != 0 {
            return Err(ExperimentError::InvalidNetwork { base, mask });
        }
        Ok(Self { network, mask: m })
    }

    /// 可用主机地址数（去掉网络地址和广播地址）
    fn host_count(&self) -> u64 {
        let size = 1u64 << self.mask.trailing_zeros();
        size.saturating_sub(2)
    }

    fn overlaps(&self, other: &Block) -> bool {
        let m = self.mask & other.mask;
        self.network & m == other.network & m
    }

    fn base(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.network)
    }

    fn mask(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.mask)
    }
}

/// 顺序分配器。切换网段用 `set_base`，不允许与用过的网段重叠。
#[derive(Debug, Clone)]
pub struct Ipv4AddressHelper {
    block: Block,
    /// 下一个要分配的主机号（从 1 开始）
    next_host: u64,
    used: Vec<Block>,
}

impl Ipv4AddressHelper {
    pub fn new(base: Ipv4Addr, mask: Ipv4Addr) -> Result<Self> {
        let block = Block::new(base, mask)?;
        Ok(Self {
            block,
            next_host: 1,
            used: vec![block],
        })
    }

    pub fn set_base(&mut self, base: Ipv4Addr, mask: Ipv4Addr) -> Result<()> {
        let block = Block::new(base, mask)?;
        if self.used.iter().any(|b| b.overlaps(&block)) {
            return Err(ExperimentError::AddressOverlap { base, mask });
        }
        self.used.push(block);
        self.block = block;
        self.next_host = 1;
        Ok(())
    }

    pub fn base(&self) -> Ipv4Addr {
        self.block.base()
    }

    pub fn mask(&self) -> Ipv4Addr {
        self.block.mask()
    }

    /// 当前网段剩余可分配的主机地址数
    pub fn remaining(&self) -> u64 {
        (self.block.host_count() + 1).saturating_sub(self.next_host)
    }

    /// 当前网段能否再分配 `requested` 个地址
    pub fn check_capacity(&self, requested: u64) -> Result<()> {
        let available = self.remaining();
        if requested > available {
            return Err(ExperimentError::AddressExhausted {
                base: self.base(),
                mask: self.mask(),
                requested: usize::try_from(requested).unwrap_or(usize::MAX),
                available: usize::try_from(available).unwrap_or(usize::MAX),
            });
        }
        Ok(())
    }

    /// 给 `devices` 依次分配地址；地址不够时一个都不分配。
    pub fn assign<E: Engine + ?Sized>(
        &mut self,
        engine: &mut E,
        devices: &[DeviceId],
    ) -> Result<Ipv4InterfaceContainer> {
        self.check_capacity(devices.len() as u64)?;

        let mask = self.mask();
        let mut out = Ipv4InterfaceContainer::default();
        for &dev in devices {
            let addr = Ipv4Addr::from(self.block.network + self.next_host as u32);
            engine.assign_ipv4(dev, addr, mask)?;
            self.next_host += 1;
            out.push(dev, addr);
        }
        debug!(base = %self.base(), %mask, count = devices.len(), "分配 IPv4 地址");
        Ok(out)
    }
}

/// 分配结果：设备及其地址，保持分配顺序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ipv4InterfaceContainer {
    entries: Vec<(DeviceId, Ipv4Addr)>,
}

impl Ipv4InterfaceContainer {
    fn push(&mut self, dev: DeviceId, addr: Ipv4Addr) {
        self.entries.push((dev, addr));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 第 `i` 个分配的地址
    pub fn get_address(&self, i: usize) -> Option<Ipv4Addr> {
        self.entries.get(i).map(|&(_, a)| a)
    }

    pub fn address_of(&self, dev: DeviceId) -> Option<Ipv4Addr> {
        self.entries
            .iter()
            .find_map(|&(d, a)| (d == dev).then_some(a))
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeviceId, Ipv4Addr)> + '_ {
        self.entries.iter().copied()
    }
}
