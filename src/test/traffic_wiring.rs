use std::net::{Ipv4Addr, SocketAddrV4};

use super::fake_engine::{FakeApp, FakeEngine};
use crate::engine::LinkProfile;
use crate::error::ExperimentError;
use crate::experiment::{TrafficOpts, wire_bulk_traffic};
use crate::sim::SimTime;
use crate::topo::{Ipv4AddressHelper, StarTopology, build_star};

const MASK24: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

fn addressed_stars(e: &mut FakeEngine, n: u32) -> (StarTopology, StarTopology) {
    let profile = LinkProfile::mbps(5, SimTime::from_millis(10));
    let mut a = build_star(e, "a", n, &profile).expect("star a");
    let mut b = build_star(e, "b", n, &profile).expect("star b");
    let mut helper = Ipv4AddressHelper::new(Ipv4Addr::new(10, 1, 1, 0), MASK24).expect("helper");
    a.assign_ipv4_addresses(e, &mut helper).expect("a addresses");
    helper
        .set_base(Ipv4Addr::new(10, 2, 1, 0), MASK24)
        .expect("set_base");
    b.assign_ipv4_addresses(e, &mut helper).expect("b addresses");
    (a, b)
}

#[test]
fn sender_i_targets_receiver_i() {
    let mut e = FakeEngine::default();
    let (a, b) = addressed_stars(&mut e, 8);
    let plan = wire_bulk_traffic(&mut e, &a, &b, &TrafficOpts::default()).expect("wire");

    assert_eq!(plan.len(), 8);
    for (i, flow) in plan.flows().iter().enumerate() {
        assert_eq!(flow.index, i);
        assert_eq!(flow.sender, b.spokes()[i]);
        assert_eq!(flow.receiver, a.spokes()[i]);
        let addr = a.spoke_ipv4_address(i).expect("address");
        assert_eq!(flow.remote, SocketAddrV4::new(addr, 5000));
    }
    assert_eq!(plan.flows()[0].remote.ip(), &Ipv4Addr::new(10, 1, 1, 2));
    assert_eq!(plan.flows()[7].remote.ip(), &Ipv4Addr::new(10, 1, 1, 16));
}

#[test]
fn sinks_and_senders_use_documented_ports_and_start_times() {
    let mut e = FakeEngine::default();
    let (a, b) = addressed_stars(&mut e, 3);
    let plan = wire_bulk_traffic(&mut e, &a, &b, &TrafficOpts::default()).expect("wire");

    for flow in plan.flows() {
        assert_eq!(
            e.apps[flow.sink.0],
            FakeApp::Sink {
                node: flow.receiver,
                port: 5000,
                start: SimTime::from_secs(1),
            }
        );
        assert_eq!(
            e.apps[flow.source.0],
            FakeApp::BulkSend {
                node: flow.sender,
                remote: flow.remote,
                max_bytes: 0,
                start: SimTime::from_secs(2),
            }
        );
    }
    // 先装完所有 sink 再装 sender
    let kinds: Vec<bool> = e
        .apps
        .iter()
        .map(|a| matches!(a, FakeApp::Sink { .. }))
        .collect();
    assert_eq!(kinds, vec![true, true, true, false, false, false]);
}

#[test]
fn wiring_is_identical_across_runs() {
    let wire = || {
        let mut e = FakeEngine::default();
        let (a, b) = addressed_stars(&mut e, 5);
        let plan = wire_bulk_traffic(&mut e, &a, &b, &TrafficOpts::default()).expect("wire");
        (plan, e.apps)
    };
    assert_eq!(wire(), wire());
}

#[test]
fn unaddressed_receivers_are_rejected() {
    let mut e = FakeEngine::default();
    let profile = LinkProfile::mbps(5, SimTime::from_millis(10));
    let a = build_star(&mut e, "a", 2, &profile).expect("star a");
    let b = build_star(&mut e, "b", 2, &profile).expect("star b");

    let err = wire_bulk_traffic(&mut e, &a, &b, &TrafficOpts::default()).expect_err("unaddressed");
    assert!(matches!(err, ExperimentError::Unaddressed(name) if name == "a"));
    assert!(e.apps.is_empty());
}

#[test]
fn mismatched_star_sizes_are_rejected() {
    let mut e = FakeEngine::default();
    let profile = LinkProfile::mbps(5, SimTime::from_millis(10));
    let mut a = build_star(&mut e, "a", 2, &profile).expect("star a");
    let b = build_star(&mut e, "b", 3, &profile).expect("star b");
    let mut helper = Ipv4AddressHelper::new(Ipv4Addr::new(10, 1, 1, 0), MASK24).expect("helper");
    a.assign_ipv4_addresses(&mut e, &mut helper).expect("addresses");

    let err = wire_bulk_traffic(&mut e, &a, &b, &TrafficOpts::default()).expect_err("mismatch");
    assert!(matches!(err, ExperimentError::MismatchedStars { a: 2, b: 3 }));
}
