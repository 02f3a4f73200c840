//! Integration tests for the MonitorService → control loop → actuators
//! pipeline.
//!
//! Bytes go in through the mock transport's inbound handle exactly as a
//! radio callback would deliver them; assertions are made on the actuator
//! and event histories.

use aquamon::app::commands::MonitorCommand;
use aquamon::app::events::MonitorEvent;
use aquamon::app::service::MonitorService;
use aquamon::config::MonitorConfig;
use aquamon::control::{AlarmState, ControlStatus, CRITICAL_ALERT};
use aquamon::error::{Error, RegistryError, SessionError};
use aquamon::link::session::ConnectionState;
use aquamon::link::telegram::TelegramSchema;
use aquamon::prediction::{PredictionFeature, PredictionResponse, WaterQuality};
use futures_lite::future::block_on;

use super::mock_link::{ActuatorCall, MockActuator, MockTransport, RecordingSink};

const POND_A: &str = "98:D3:31:F5:0A:01";
const ANON: &str = "98:D3:31:F5:0A:03";

fn make_app() -> (MonitorService<MockTransport>, MockActuator, RecordingSink) {
    let app = MonitorService::new(MonitorConfig::default(), MockTransport::stations()).unwrap();
    (app, MockActuator::new(), RecordingSink::new())
}

fn connected_app() -> (MonitorService<MockTransport>, MockActuator, RecordingSink) {
    let (mut app, hw, mut sink) = make_app();
    block_on(app.discover(&mut sink)).unwrap();
    block_on(app.connect(POND_A, &mut sink)).unwrap();
    sink.clear();
    (app, hw, sink)
}

// ── Telegram → control loop → actuators ───────────────────────

#[test]
fn critical_telegram_runs_pump_and_latches_alarm() {
    let (mut app, mut hw, mut sink) = connected_app();

    app.transport().push(b"1,2,3,3.0,7\n");
    assert_eq!(app.poll_link(&mut hw, &mut sink), 1);

    assert_eq!(
        hw.calls,
        vec![
            ActuatorCall::SetPump(true),
            ActuatorCall::RaiseAlarm(CRITICAL_ALERT.to_string()),
        ]
    );
    let state = app.control_state();
    assert!(state.pump_on);
    assert_eq!(state.alarm, AlarmState::Triggered);

    assert!(matches!(sink.events[0], MonitorEvent::TelegramReceived(_)));
    assert!(matches!(
        sink.events[1],
        MonitorEvent::AlarmRaised { reading } if reading.value == 3.0
    ));
    assert!(matches!(sink.events[2], MonitorEvent::ControlUpdated(_)));
    assert_eq!(sink.events.len(), 3);
}

#[test]
fn split_and_coalesced_chunks_evaluate_in_order() {
    let (mut app, mut hw, mut sink) = connected_app();

    app.transport().push(b"10,20,30,8");
    assert_eq!(app.poll_link(&mut hw, &mut sink), 0);
    app.transport().push(b".0,7\n10,20,30,6.0,7\n");
    assert_eq!(app.poll_link(&mut hw, &mut sink), 2);

    assert_eq!(
        hw.calls,
        vec![ActuatorCall::SetPump(false), ActuatorCall::SetPump(true)]
    );
    assert_eq!(app.control_state().status, ControlStatus::Regulating);
    let reading = app.snapshot().last_reading.unwrap();
    assert_eq!(reading.value, 6.0);
    assert_eq!(reading.observed_at, 1);
}

#[test]
fn next_link_event_handles_queued_telegram() {
    let (mut app, mut hw, mut sink) = connected_app();
    app.transport().push(b"1,2,3,9.0,7\n");
    assert_eq!(block_on(app.next_link_event(&mut hw, &mut sink)), 1);
    assert!(!hw.pump_on());
}

#[test]
fn alarm_stays_latched_through_recovery_until_reset() {
    let (mut app, mut hw, mut sink) = connected_app();

    app.transport().push(b"1,2,3,2.5,7\n1,2,3,3.5,7\n1,2,3,8.0,7\n");
    app.poll_link(&mut hw, &mut sink);
    assert_eq!(hw.alarms(), 1);
    assert!(!hw.pump_on());
    assert_eq!(app.control_state().alarm, AlarmState::Triggered);

    hw.calls.clear();
    sink.clear();
    let state = app.reset_alarm(&mut sink);
    assert_eq!(state.alarm, AlarmState::Armed);
    assert_eq!(state.status.to_string(), "alarm reset");
    assert!(hw.calls.is_empty(), "reset must not touch the pump");
    assert_eq!(sink.events[0], MonitorEvent::AlarmReset);

    // Re-armed: the next critical reading alerts again.
    app.transport().push(b"1,2,3,1.0,7\n");
    app.poll_link(&mut hw, &mut sink);
    assert_eq!(hw.alarms(), 1);
}

#[test]
fn malformed_telegrams_never_reach_the_pump() {
    let (mut app, mut hw, mut sink) = connected_app();
    app.transport().push(b"1,2,3,abc,7\n1,2,3\n1,2,3,NaN,7\n");
    assert_eq!(app.poll_link(&mut hw, &mut sink), 0);
    assert!(hw.calls.is_empty());
    assert_eq!(app.snapshot().dropped_frames, 3);
}

// ── Manual override ───────────────────────────────────────────

#[test]
fn manual_reading_uses_the_same_loop() {
    let (mut app, mut hw, mut sink) = make_app();
    let state = app.manual_reading(" 5.5 ", &mut hw, &mut sink).unwrap();
    assert!(state.pump_on);
    assert_eq!(state.status, ControlStatus::Regulating);

    let err = app.manual_reading("five", &mut hw, &mut sink).unwrap_err();
    assert!(matches!(err, Error::Control(_)));
    assert!(matches!(
        sink.events.last(),
        Some(MonitorEvent::InvalidReading(_))
    ));
    assert_eq!(app.control_state(), state);
}

// ── Connection lifecycle ──────────────────────────────────────

#[test]
fn connect_emits_connecting_then_connected() {
    let (mut app, _hw, mut sink) = make_app();
    block_on(app.discover(&mut sink)).unwrap();
    assert_eq!(sink.events[0], MonitorEvent::DevicesDiscovered(3));

    block_on(app.connect(POND_A, &mut sink)).unwrap();
    assert!(matches!(
        &sink.events[1],
        MonitorEvent::ConnectionChanged(ConnectionState::Connecting(d)) if d.id == POND_A
    ));
    assert!(matches!(
        &sink.events[2],
        MonitorEvent::ConnectionChanged(ConnectionState::Connected(d)) if d.id == POND_A
    ));
}

#[test]
fn second_connect_is_refused_without_events() {
    let (mut app, _hw, mut sink) = connected_app();
    let err = block_on(app.connect(ANON, &mut sink)).unwrap_err();
    assert_eq!(
        err,
        Error::Session(SessionError::AlreadyConnected(POND_A.into()))
    );
    assert!(sink.events.is_empty());
    assert_eq!(app.transport().connects(), 1);
}

#[test]
fn disconnect_reports_device_once() {
    let (mut app, _hw, mut sink) = make_app();
    block_on(app.discover(&mut sink)).unwrap();
    block_on(app.connect(ANON, &mut sink)).unwrap();
    sink.clear();

    block_on(app.disconnect(&mut sink)).unwrap();
    assert_eq!(
        sink.events[0],
        MonitorEvent::ConnectionChanged(ConnectionState::Disconnected)
    );
    match &sink.events[1] {
        MonitorEvent::DisconnectedFrom(d) => assert_eq!(d.label(), "Unknown Device"),
        other => panic!("unexpected event {other:?}"),
    }

    sink.clear();
    block_on(app.disconnect(&mut sink)).unwrap();
    assert!(sink.events.is_empty());
}

#[test]
fn refused_connect_surfaces_transport_failure() {
    let (mut app, _hw, mut sink) = make_app();
    block_on(app.discover(&mut sink)).unwrap();
    app.transport_mut().refuse_connect = true;
    sink.clear();

    assert!(block_on(app.connect(POND_A, &mut sink)).is_err());
    assert!(matches!(sink.events[1], MonitorEvent::TransportFailure(_)));
    assert_eq!(
        sink.events[2],
        MonitorEvent::ConnectionChanged(ConnectionState::Disconnected)
    );
}

#[test]
fn discovery_failure_is_reported() {
    let (mut app, _hw, mut sink) = make_app();
    app.transport_mut().fail_enable = true;
    assert!(block_on(app.discover(&mut sink)).is_err());
    assert!(matches!(
        sink.events.as_slice(),
        [MonitorEvent::TransportFailure(_)]
    ));
}

#[test]
fn unknown_or_missing_selection_is_rejected() {
    let (mut app, _hw, mut sink) = make_app();
    block_on(app.discover(&mut sink)).unwrap();

    assert_eq!(
        block_on(app.connect("00:00", &mut sink)),
        Err(Error::Registry(RegistryError::NotFound("00:00".into())))
    );
    assert_eq!(
        block_on(app.connect_selected(&mut sink)),
        Err(Error::Registry(RegistryError::NoSelection))
    );
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn command_flow_from_ui() {
    let (mut app, mut hw, mut sink) = make_app();
    let run = |app: &mut MonitorService<MockTransport>,
               hw: &mut MockActuator,
               sink: &mut RecordingSink,
               cmd: MonitorCommand| block_on(app.handle_command(cmd, hw, sink));

    run(&mut app, &mut hw, &mut sink, MonitorCommand::Discover).unwrap();
    run(&mut app, &mut hw, &mut sink, MonitorCommand::Select(POND_A.into())).unwrap();
    run(&mut app, &mut hw, &mut sink, MonitorCommand::ConnectSelected).unwrap();
    assert!(app.connection().is_connected());

    run(
        &mut app,
        &mut hw,
        &mut sink,
        MonitorCommand::ManualReading("2.0".into()),
    )
    .unwrap();
    assert_eq!(hw.alarms(), 1);

    run(&mut app, &mut hw, &mut sink, MonitorCommand::ResetAlarm).unwrap();
    assert_eq!(app.control_state().alarm, AlarmState::Armed);

    run(&mut app, &mut hw, &mut sink, MonitorCommand::Disconnect).unwrap();
    let snap = app.snapshot();
    assert_eq!(snap.connection, ConnectionState::Disconnected);
    assert_eq!(snap.selected.map(|d| d.id), Some(POND_A.to_string()));
    assert_eq!(snap.devices.len(), 3);
}

// ── Prediction screen ─────────────────────────────────────────

#[test]
fn prediction_schema_fills_form_without_control() {
    let (mut app, mut hw, mut sink) = connected_app();
    app.set_schema(TelegramSchema::Prediction);

    app.transport().push(b"410,120,3.5,7.9\n");
    assert_eq!(app.poll_link(&mut hw, &mut sink), 1);
    assert!(hw.calls.is_empty());
    assert!(
        !sink
            .events
            .iter()
            .any(|e| matches!(e, MonitorEvent::ControlUpdated(_)))
    );

    let form = app.form();
    assert_eq!(form.get(PredictionFeature::Hardness), Some(120.0));
    assert_eq!(form.get(PredictionFeature::Ph), Some(7.9));
    assert_eq!(form.get(PredictionFeature::Co3), None);

    for (feature, text) in [
        (PredictionFeature::Co3, "2"),
        (PredictionFeature::Hco3, "140"),
        (PredictionFeature::Alkalinity, "110"),
        (PredictionFeature::CaMgRatio, "3.2"),
        (PredictionFeature::DissolvedOxygen, "6.1"),
    ] {
        block_on(app.handle_command(
            MonitorCommand::SetFeature(feature, text.into()),
            &mut hw,
            &mut sink,
        ))
        .unwrap();
    }
    let req = app.prediction_request().unwrap();
    assert_eq!(req.hardness, 120.0);
    assert_eq!(req.dissolved_oxygen, 6.1);

    let verdict: PredictionResponse = serde_json::from_str(r#"{"prediction":1}"#).unwrap();
    assert_eq!(verdict.verdict(), Ok(WaterQuality::Optimal));
}
