use std::collections::HashSet;
use std::net::Ipv4Addr;

use super::fake_engine::FakeEngine;
use crate::engine::{Engine, LinkProfile};
use crate::error::ExperimentError;
use crate::net::DeviceId;
use crate::sim::SimTime;
use crate::topo::Ipv4AddressHelper;

const MASK24: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

fn engine_with_devices(links: usize) -> (FakeEngine, Vec<DeviceId>) {
    let mut e = FakeEngine::default();
    let profile = LinkProfile::mbps(5, SimTime::from_millis(10));
    let mut devs = Vec::new();
    for i in 0..links {
        let a = e.create_node(&format!("a{i}"));
        let b = e.create_node(&format!("b{i}"));
        let pair = e.install_p2p_link(a, b, &profile).expect("link");
        devs.push(pair.a);
        devs.push(pair.b);
    }
    (e, devs)
}

#[test]
fn assigns_sequential_hosts_starting_at_first_usable() {
    let (mut e, devs) = engine_with_devices(2);
    let mut helper = Ipv4AddressHelper::new(Ipv4Addr::new(10, 1, 1, 0), MASK24).expect("helper");
    let ifaces = helper.assign(&mut e, &devs).expect("assign");

    assert_eq!(ifaces.len(), 4);
    assert_eq!(ifaces.get_address(0), Some(Ipv4Addr::new(10, 1, 1, 1)));
    assert_eq!(ifaces.get_address(3), Some(Ipv4Addr::new(10, 1, 1, 4)));
    assert_eq!(ifaces.address_of(devs[2]), Some(Ipv4Addr::new(10, 1, 1, 3)));
    assert_eq!(e.address_of(devs[1]), Some(Ipv4Addr::new(10, 1, 1, 2)));
    assert!(e.addrs.iter().all(|&(_, _, m)| m == MASK24));
    assert_eq!(helper.remaining(), 250);
}

#[test]
fn set_base_restarts_numbering_in_new_block() {
    let (mut e, devs) = engine_with_devices(2);
    let mut helper = Ipv4AddressHelper::new(Ipv4Addr::new(10, 1, 1, 0), MASK24).expect("helper");
    let first = helper.assign(&mut e, &devs[..2]).expect("assign");
    helper
        .set_base(Ipv4Addr::new(10, 2, 1, 0), MASK24)
        .expect("set_base");
    let second = helper.assign(&mut e, &devs[2..]).expect("assign");

    assert_eq!(first.get_address(0), Some(Ipv4Addr::new(10, 1, 1, 1)));
    assert_eq!(second.get_address(0), Some(Ipv4Addr::new(10, 2, 1, 1)));
    assert_eq!(second.get_address(1), Some(Ipv4Addr::new(10, 2, 1, 2)));
}

#[test]
fn exhaustion_is_detected_before_any_assignment() {
    let (mut e, devs) = engine_with_devices(128);
    assert_eq!(devs.len(), 256);
    let mut helper = Ipv4AddressHelper::new(Ipv4Addr::new(10, 1, 1, 0), MASK24).expect("helper");

    let err = helper.assign(&mut e, &devs).expect_err("only 254 hosts in a /24");
    assert!(matches!(
        err,
        ExperimentError::AddressExhausted {
            requested: 256,
            available: 254,
            ..
        }
    ));
    assert!(e.addrs.is_empty());

    let ok = helper.assign(&mut e, &devs[..254]).expect("exactly fits");
    let distinct: HashSet<Ipv4Addr> = ok.iter().map(|(_, a)| a).collect();
    assert_eq!(distinct.len(), 254);
    assert_eq!(ok.get_address(253), Some(Ipv4Addr::new(10, 1, 1, 254)));
}

#[test]
fn overlapping_or_malformed_blocks_are_rejected() {
    let mut helper = Ipv4AddressHelper::new(Ipv4Addr::new(10, 1, 1, 0), MASK24).expect("helper");

    let err = helper
        .set_base(Ipv4Addr::new(10, 1, 0, 0), Ipv4Addr::new(255, 255, 0, 0))
        .expect_err("10.1.0.0/16 covers 10.1.1.0/24");
    assert!(matches!(err, ExperimentError::AddressOverlap { .. }));
    assert_eq!(helper.base(), Ipv4Addr::new(10, 1, 1, 0));

    let err = helper
        .set_base(Ipv4Addr::new(10, 2, 1, 7), MASK24)
        .expect_err("host bits set");
    assert!(matches!(err, ExperimentError::InvalidNetwork { .. }));

    let err = Ipv4AddressHelper::new(Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(255, 0, 255, 0))
        .expect_err("non-contiguous mask");
    assert!(matches!(err, ExperimentError::InvalidNetwork { .. }));
}
