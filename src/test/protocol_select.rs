use crate::experiment::{ExperimentConfig, PROTOCOL_NAMES, variant_for_name};
use crate::proto::{StackConfig, TcpVariant};

#[test]
fn every_documented_name_maps_to_a_variant() {
    let expected = [
        ("TcpNewReno", TcpVariant::NewReno),
        ("TcpHybla", TcpVariant::Hybla),
        ("TcpHighSpeed", TcpVariant::HighSpeed),
        ("TcpHtcp", TcpVariant::Htcp),
        ("TcpVegas", TcpVariant::Vegas),
        ("TcpScalable", TcpVariant::Scalable),
        ("TcpVeno", TcpVariant::Veno),
        ("TcpBic", TcpVariant::Bic),
        ("TcpYeah", TcpVariant::Yeah),
        ("TcpIllinois", TcpVariant::Illinois),
        ("TcpWestwood", TcpVariant::Westwood),
        ("TcpWestwoodPlus", TcpVariant::Westwood),
    ];
    assert_eq!(expected.len(), PROTOCOL_NAMES.len());
    for (name, variant) in expected {
        assert!(PROTOCOL_NAMES.contains(&name));
        assert_eq!(variant_for_name(name), Some(variant), "{name}");
    }
}

#[test]
fn westwood_plus_is_an_alias_for_westwood() {
    assert_eq!(
        variant_for_name("TcpWestwoodPlus"),
        variant_for_name("TcpWestwood")
    );
}

#[test]
fn names_are_case_sensitive_and_exact() {
    for name in ["tcphybla", "Hybla", "TcpCubic", "", " TcpHybla"] {
        assert_eq!(variant_for_name(name), None, "{name:?}");
    }
}

#[test]
fn unknown_name_keeps_prior_selection() {
    let mut stack = StackConfig::default();
    assert_eq!(stack.transport, TcpVariant::NewReno);

    assert!(!stack.select_protocol("TcpCubic"));
    assert_eq!(stack.transport, TcpVariant::NewReno);

    assert!(stack.select_protocol("TcpVeno"));
    assert!(!stack.select_protocol("NotAProtocol"));
    assert_eq!(stack.transport, TcpVariant::Veno);
}

#[test]
fn experiment_config_resolves_stack_from_protocol_name() {
    let cfg = ExperimentConfig::default();
    assert_eq!(cfg.stack().transport, TcpVariant::Hybla);

    let cfg = ExperimentConfig {
        protocol: "Bogus".to_string(),
        ..ExperimentConfig::default()
    };
    assert_eq!(cfg.stack().transport, TcpVariant::NewReno);
}
