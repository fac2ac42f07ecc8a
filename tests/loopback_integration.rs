//! ---
//! freed_section: "15-testing-qa-runbook"
//! freed_subsection: "integration-tests"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Simulator to validator sessions over the loopback interface."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use freed_common::{cancel_pair, CancelSignal, ListenerConfig, SimulatorConfig};
use freed_proto::OutcomeKind;
use freed_sim::{PatternKind, PatternSpec, SampleEvent, SimError, SimState, Simulator};
use freed_validator::{Listener, ListenerEvent, ListenerExit};

async fn loopback_listener(timeout: Duration) -> Listener {
    let config = ListenerConfig {
        ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        inactivity_timeout: Some(timeout),
        ..ListenerConfig::default()
    };
    Listener::bind(&config).await.expect("bind listener")
}

fn circle(duration: Duration, rate_hz: f64) -> PatternSpec {
    PatternSpec::builder(PatternKind::Circle)
        .duration(duration)
        .rate_hz(rate_hz)
        .build()
        .expect("valid spec")
}

fn sim_config(port: u16) -> SimulatorConfig {
    SimulatorConfig {
        target_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port,
        ..SimulatorConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn one_second_circle_arrives_intact() {
    let mut listener = loopback_listener(Duration::from_millis(750)).await;
    let port = listener.local_addr().expect("local addr").port();

    let receiving = tokio::spawn(async move {
        let mut kinds = Vec::new();
        let exit = listener
            .run(&mut CancelSignal::never(), |event| {
                if let ListenerEvent::Packet(report) = event {
                    kinds.push(report.kind());
                }
            })
            .await
            .expect("listener session");
        (exit, kinds, listener.summary())
    });

    let mut simulator =
        Simulator::new(circle(Duration::from_secs(1), 30.0), sim_config(port)).expect("simulator");
    let report = simulator
        .run(&mut CancelSignal::never(), |_| {})
        .await
        .expect("simulation");
    assert_eq!(report.state, SimState::Completed);
    assert_eq!(report.sent, 30);
    assert_eq!(report.failed, 0);
    assert_eq!(report.planned, Some(30));

    let (exit, kinds, summary) = receiving.await.expect("listener task");
    assert_eq!(exit, ListenerExit::InactivityTimeout);
    assert_eq!(kinds.len(), 30);
    assert!(kinds.iter().all(|kind| *kind == OutcomeKind::Valid));
    assert_eq!(summary.valid, 30);
    assert_eq!(summary.invalid(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelling_stops_the_stream() {
    let mut listener = loopback_listener(Duration::from_millis(500)).await;
    let port = listener.local_addr().expect("local addr").port();
    let receiving = tokio::spawn(async move {
        listener
            .run(&mut CancelSignal::never(), |_| {})
            .await
            .expect("listener session");
        listener.summary()
    });

    let mut simulator =
        Simulator::new(circle(Duration::from_secs(5), 50.0), sim_config(port)).expect("simulator");
    let (handle, mut signal) = cancel_pair();
    let mut sent = 0u64;
    let report = simulator
        .run(&mut signal, |event| {
            if let SampleEvent::Sent(_) = event {
                sent += 1;
                if sent == 10 {
                    handle.cancel();
                }
            }
        })
        .await
        .expect("simulation");
    assert_eq!(report.state, SimState::Cancelled);
    assert_eq!(report.sent, 10);
    assert!(report.sent < report.planned.expect("bounded run"));

    let summary = receiving.await.expect("listener task");
    assert_eq!(summary.valid, 10);
    assert_eq!(summary.invalid(), 0);

    assert!(matches!(
        simulator.run(&mut CancelSignal::never(), |_| {}).await,
        Err(SimError::NotIdle(SimState::Cancelled))
    ));
}

#[test]
fn unknown_pattern_is_rejected_by_name() {
    let err = "hexagon".parse::<PatternKind>().unwrap_err();
    assert!(matches!(err, SimError::UnknownPattern(ref name) if name == "hexagon"));
    assert!(err.to_string().contains("circle, figure8, oscillate"));
}
