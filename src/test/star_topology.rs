use std::collections::HashSet;
use std::net::Ipv4Addr;

use super::fake_engine::FakeEngine;
use crate::engine::{LinkProfile, NetEngine};
use crate::error::ExperimentError;
use crate::proto::{StackConfig, TcpVariant};
use crate::sim::SimTime;
use crate::topo::{Ipv4AddressHelper, build_star, connect_hubs};

fn spoke_link() -> LinkProfile {
    LinkProfile::mbps(5, SimTime::from_millis(10))
}

fn hub_link() -> LinkProfile {
    LinkProfile::mbps(1, SimTime::from_millis(20))
}

#[test]
fn star_has_one_hub_and_requested_spokes() {
    for n in [1u32, 2, 8, 50] {
        let mut e = FakeEngine::default();
        let star = build_star(&mut e, "a", n, &spoke_link()).expect("star");

        assert_eq!(star.spoke_count(), n as usize);
        assert_eq!(e.nodes.len(), n as usize + 1);
        assert_eq!(e.degree(star.hub()), n as usize);
        for &spoke in star.spokes() {
            assert_eq!(e.degree(spoke), 1);
        }
        assert!(e.links.iter().all(|(a, _, p)| *a == star.hub() && *p == spoke_link()));
    }
}

#[test]
fn zero_spokes_is_rejected() {
    let mut e = FakeEngine::default();
    let err = build_star(&mut e, "a", 0, &spoke_link()).expect_err("no spokes");
    assert!(matches!(err, ExperimentError::InvalidSpokeCount(0)));
    assert!(e.nodes.is_empty());
}

#[test]
fn connecting_hubs_adds_one_to_each_hub_degree() {
    let mut e = FakeEngine::default();
    let a = build_star(&mut e, "a", 4, &spoke_link()).expect("star a");
    let b = build_star(&mut e, "b", 4, &spoke_link()).expect("star b");

    connect_hubs(&mut e, a.hub(), b.hub(), &hub_link()).expect("interconnect");
    assert_eq!(e.degree(a.hub()), 5);
    assert_eq!(e.degree(b.hub()), 5);
    assert_eq!(e.links.last().map(|l| l.2), Some(hub_link()));

    let err = connect_hubs(&mut e, a.hub(), a.hub(), &hub_link()).expect_err("self loop");
    assert!(matches!(err, ExperimentError::SelfLoop(n) if n == a.hub()));
}

#[test]
fn install_stack_covers_hub_and_spokes() {
    let mut e = FakeEngine::default();
    let star = build_star(&mut e, "a", 3, &spoke_link()).expect("star");
    let stack = StackConfig::with_transport(TcpVariant::Hybla);
    star.install_stack(&mut e, &stack).expect("stack");

    assert_eq!(e.stacks.len(), 4);
    assert_eq!(e.stacks.get(&star.hub()), Some(&stack));
    for spoke in star.spokes() {
        assert_eq!(e.stacks[spoke].transport, TcpVariant::Hybla);
    }
}

#[test]
fn star_addresses_interleave_hub_and_spoke_devices() {
    let mut e = FakeEngine::default();
    let mut star = build_star(&mut e, "a", 3, &spoke_link()).expect("star");
    assert!(star.spoke_ipv4_address(0).is_none());

    let mut helper =
        Ipv4AddressHelper::new(Ipv4Addr::new(10, 1, 1, 0), Ipv4Addr::new(255, 255, 255, 0))
            .expect("helper");
    let ifaces = star.assign_ipv4_addresses(&mut e, &mut helper).expect("addresses");
    assert_eq!(ifaces.len(), 6);

    for i in 0..3u8 {
        assert_eq!(
            star.hub_ipv4_address(i as usize),
            Some(Ipv4Addr::new(10, 1, 1, 2 * i + 1))
        );
        assert_eq!(
            star.spoke_ipv4_address(i as usize),
            Some(Ipv4Addr::new(10, 1, 1, 2 * i + 2))
        );
    }
    assert!(star.spoke_ipv4_address(3).is_none());
}

#[test]
fn largest_star_fits_a_slash_24_and_one_more_spoke_does_not() {
    let mask = Ipv4Addr::new(255, 255, 255, 0);

    let mut e = FakeEngine::default();
    let mut star = build_star(&mut e, "a", 127, &spoke_link()).expect("star");
    let mut helper = Ipv4AddressHelper::new(Ipv4Addr::new(10, 1, 1, 0), mask).expect("helper");
    star.assign_ipv4_addresses(&mut e, &mut helper).expect("254 hosts");
    assert_eq!(star.spoke_ipv4_address(126), Some(Ipv4Addr::new(10, 1, 1, 254)));

    let mut e = FakeEngine::default();
    let mut star = build_star(&mut e, "a", 128, &spoke_link()).expect("star");
    let mut helper = Ipv4AddressHelper::new(Ipv4Addr::new(10, 1, 1, 0), mask).expect("helper");
    let err = star
        .assign_ipv4_addresses(&mut e, &mut helper)
        .expect_err("256 devices");
    assert!(matches!(err, ExperimentError::AddressExhausted { .. }));
    assert!(!star.is_addressed());
}

#[test]
fn real_engine_topology_matches_fake_engine_shape() {
    let mut e = NetEngine::new();
    let a = build_star(&mut e, "a", 8, &spoke_link()).expect("star a");
    let b = build_star(&mut e, "b", 8, &spoke_link()).expect("star b");
    let pair = connect_hubs(&mut e, a.hub(), b.hub(), &hub_link()).expect("interconnect");

    let net = e.network();
    assert_eq!(net.node_count(), 18);
    // 每条点到点链路是两条单向链路
    assert_eq!(net.link_count(), 2 * (8 + 8 + 1));
    assert_eq!(net.degree(a.hub()), 9);
    assert_eq!(net.degree(b.hub()), 9);
    assert_eq!(net.node(a.spoke(0).expect("spoke")).map(|n| n.name.as_str()), Some("a-spoke0"));

    let dev = net.device(pair.a).expect("device");
    assert_eq!(dev.node, a.hub());
    let bottleneck = net.link(dev.egress).expect("link");
    assert_eq!(bottleneck.bandwidth_bps, 1_000_000);
    assert_eq!(bottleneck.latency, SimTime::from_millis(20));

    let distinct: HashSet<_> = a.spokes().iter().chain(b.spokes()).collect();
    assert_eq!(distinct.len(), 16);
}
