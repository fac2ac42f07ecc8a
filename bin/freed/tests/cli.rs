//! ---
//! freed_section: "05-networking-external-interfaces"
//! freed_subsection: "test"
//! freed_type: "test"
//! freed_scope: "code"
//! freed_description: "Process-level checks of the freed command-line tool."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::io::Write;
use std::net::UdpSocket;
use std::time::Duration;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn freed() -> Command {
    let mut cmd = Command::cargo_bin("freed").expect("freed binary");
    cmd.env_remove("FREED_PORT")
        .env_remove("FREED_TARGET_IP")
        .env_remove("FREED_LISTEN_IP")
        .env_remove("FREED_LOG_FORMAT")
        .timeout(Duration::from_secs(20));
    cmd
}

fn pose_log() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        "timestamp,frame,valid,x_pos,y_pos,z_pos,pan,tilt,roll,zoom,focus\n\
         2024-05-01 10:00:00.000,1,True,0,0,2000,0,0,0,32768,16384\n\
         2024-05-01 10:00:00.050,2,True,10,0,2000,5,0,0,32768,16384"
    )
    .expect("write log");
    file
}

#[test]
fn version_prints_product_name() {
    freed()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("freed "));
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    freed().assert().code(2);
}

#[test]
fn unknown_pattern_exits_with_code_four() {
    freed()
        .args(["simulate", "hexagon"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("unknown pattern 'hexagon'"));
}

#[test]
fn conformance_suite_passes() {
    freed()
        .arg("test")
        .assert()
        .success()
        .stdout(predicate::str::contains("[PASS]"))
        .stdout(predicate::str::contains("9 of 9 cases passed"));
}

#[test]
fn analyze_prints_statistics() {
    let log = pose_log();
    freed()
        .arg("analyze")
        .arg(log.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Packets: 2"))
        .stdout(predicate::str::contains("X: 0.00 to 10.00"));
}

#[test]
fn analyze_missing_file_fails() {
    freed()
        .args(["analyze", "/no/such/pose-log.csv"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unable to open pose log"));
}

#[test]
fn busy_port_exits_with_code_three() {
    let holder = UdpSocket::bind("127.0.0.1:0").expect("bind holder");
    let port = holder.local_addr().expect("addr").port().to_string();
    freed()
        .args(["validate", "--ip", "127.0.0.1", "--port", &port, "--timeout", "1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("port unavailable"));
}

#[test]
fn validate_stops_after_inactivity() {
    freed()
        .args(["validate", "--ip", "127.0.0.1", "--port", "0", "--timeout", "0.3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Listening for FreeD packets on 127.0.0.1:"))
        .stdout(predicate::str::contains("0 packets: 0 valid (0.0%), 0 invalid"));
}

#[test]
fn validate_stops_at_total_duration_with_rate_lines() {
    freed()
        .args([
            "validate", "--ip", "127.0.0.1", "--port", "0", "--duration", "1.5", "--rate",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rate: 0.0 packets/second (0 total)"))
        .stdout(predicate::str::contains("Listened for 1.5 seconds, stopping"));
}

#[test]
fn bounded_simulation_reaches_receiver() {
    let receiver = UdpSocket::bind("127.0.0.1:0").expect("bind receiver");
    let port = receiver.local_addr().expect("addr").port().to_string();
    freed()
        .args([
            "simulate",
            "circle",
            "--port",
            &port,
            "--rate",
            "20",
            "--duration",
            "0.5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Frame: 0,"))
        .stdout(predicate::str::contains("Simulation completed: sent 10 frames"));

    receiver
        .set_read_timeout(Some(Duration::from_secs(1)))
        .expect("timeout");
    let mut buf = [0u8; 64];
    let (len, _) = receiver.recv_from(&mut buf).expect("datagram");
    assert_eq!(len, 29);
    assert_eq!(buf[0], 0xD1);
}

#[test]
fn replay_sends_log() {
    let receiver = UdpSocket::bind("127.0.0.1:0").expect("bind receiver");
    let port = receiver.local_addr().expect("addr").port().to_string();
    let log = pose_log();
    freed()
        .arg("replay")
        .arg(log.path())
        .args(["--port", &port, "--speed", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Replay complete: 2 packets sent"));
}
