use std::process::Command;

fn two_star_tcp(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_two_star_tcp"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run two_star_tcp")
}

#[test]
fn prints_one_line_per_sink_then_totals() {
    let output = two_star_tcp(&["--nSpokes=2", "--Protocol=TcpNewReno"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4, "stdout:\n{stdout}");
    assert!(lines[0].starts_with("Sink 0\tTotalRx: "));
    assert!(lines[1].starts_with("Sink 1\tTotalRx: "));
    assert_eq!(lines[2], "");
    assert!(lines[3].starts_with("Totals\tTotalRx: "));

    for line in [lines[0], lines[1], lines[3]] {
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields.len(), 3, "{line}");
        let mb: f64 = fields[1]
            .strip_prefix("TotalRx: ")
            .and_then(|s| s.strip_suffix("Mb"))
            .expect("TotalRx field")
            .parse()
            .expect("TotalRx number");
        let mbps: f64 = fields[2]
            .strip_prefix("Throughput: ")
            .and_then(|s| s.strip_suffix("Mbps"))
            .expect("Throughput field")
            .parse()
            .expect("Throughput number");
        assert!(mb > 0.0, "{line}");
        assert!((mbps - mb / 60.0).abs() < 1e-4, "{line}");
    }
}

#[test]
fn unknown_protocol_still_runs() {
    let output = two_star_tcp(&["--nSpokes", "1", "--Protocol", "TcpCubic"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    assert_eq!(stdout.lines().count(), 3);
}

#[test]
fn rejects_unknown_flags() {
    let output = two_star_tcp(&["--nSpokes=2", "--endTime=10"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn zero_spokes_exits_with_error() {
    let output = two_star_tcp(&["--nSpokes=0"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("spoke"), "stderr: {stderr}");
}

#[test]
fn spoke_count_beyond_address_block_exits_with_error() {
    let output = two_star_tcp(&["--nSpokes=4294967295"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}
