//! WebSocket message and dispatch tests

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::auth::{Identity, Role};
use crate::config::ServerConfig;
use crate::queue::QueueKey;
use crate::rooms::Channel;
use crate::state::AppState;

use super::messages::{ClientEvent, ServerEvent};
use super::processor::handle_client_event;
use super::state::ConnectionState;

mod parsing {
    use super::*;

    #[test]
    fn identify_event_parses() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"type":"identify","token":"abc"}"#).unwrap();
        assert!(matches!(event, ClientEvent::Identify { token } if token == "abc"));
    }

    #[test]
    fn queue_events_use_camel_case_fields() {
        let event: ClientEvent = serde_json::from_str(
            r#"{"type":"joinQueue","doctorId":"d1","hospitalId":"h1","patientId":"p1"}"#,
        )
        .unwrap();
        match event {
            ClientEvent::JoinQueue {
                doctor_id,
                hospital_id,
                patient_id,
            } => {
                assert_eq!(doctor_id, "d1");
                assert_eq!(hospital_id, "h1");
                assert_eq!(patient_id, "p1");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn toggle_event_carries_is_active() {
        let event: ClientEvent = serde_json::from_str(
            r#"{"type":"toggleQueueStatus","doctorId":"d1","hospitalId":"h1","isActive":false}"#,
        )
        .unwrap();
        assert!(matches!(
            event,
            ClientEvent::ToggleQueueStatus {
                is_active: false,
                ..
            }
        ));
    }

    #[test]
    fn signal_payload_stays_opaque() {
        let event: ClientEvent = serde_json::from_str(
            r#"{"type":"videoCallSignal","signal":{"sdp":"v=0","nested":{"a":1}},"from":"u1","to":"u2"}"#,
        )
        .unwrap();
        match event {
            ClientEvent::VideoCallSignal { signal, .. } => {
                assert_eq!(signal, json!({"sdp": "v=0", "nested": {"a": 1}}));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let result: Result<ClientEvent, _> = serde_json::from_str(r#"{"type":"selfDestruct"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn server_events_serialize_with_camel_case_tags() {
        let event = ServerEvent::PositionUpdate {
            doctor_id: "d1".into(),
            hospital_id: "h1".into(),
            position: 2,
            estimated_wait_minutes: 30,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "positionUpdate");
        assert_eq!(value["estimatedWaitMinutes"], 30);
    }
}

mod dispatch {
    use super::*;

    fn app(auth_required: bool) -> Arc<AppState> {
        let config = ServerConfig {
            auth_required,
            ..ServerConfig::default()
        };
        AppState::new(config)
    }

    /// Registered connection plus the receiver that drains its room deliveries
    fn connection(app: &Arc<AppState>) -> (ConnectionState, mpsc::Receiver<ServerEvent>) {
        let conn_id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(32);
        app.rooms.register(conn_id, tx);
        (ConnectionState::new(conn_id), rx)
    }

    fn identify_as(state: &mut ConnectionState, user_id: &str, role: Role) {
        state.identity = Some(Identity {
            user_id: user_id.into(),
            role,
        });
    }

    /// Channel standing in for the connection's direct reply path
    fn reply_channel() -> (mpsc::Sender<ServerEvent>, mpsc::Receiver<ServerEvent>) {
        mpsc::channel(32)
    }

    #[tokio::test]
    async fn unidentified_connection_cannot_control_queues() {
        let app = app(true);
        let (mut state, _room_rx) = connection(&app);
        let (tx, mut rx) = reply_channel();

        handle_client_event(
            ClientEvent::StartQueue {
                doctor_id: "d1".into(),
                hospital_id: "h1".into(),
            },
            &mut state,
            &tx,
            &app,
        )
        .await;

        assert!(matches!(rx.try_recv().unwrap(), ServerEvent::Error { .. }));
        let key = QueueKey::new("d1", "h1");
        assert!(app.queues.snapshot(&key).await.is_err());
    }

    #[tokio::test]
    async fn patient_cannot_call_next() {
        let app = app(true);
        let (mut state, _room_rx) = connection(&app);
        identify_as(&mut state, "p1", Role::Patient);
        let (tx, mut rx) = reply_channel();

        handle_client_event(
            ClientEvent::CallNextPatient {
                doctor_id: "d1".into(),
                hospital_id: "h1".into(),
            },
            &mut state,
            &tx,
            &app,
        )
        .await;

        match rx.try_recv().unwrap() {
            ServerEvent::Error { message } => {
                assert!(message.contains("doctor"), "unexpected message: {message}")
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn patient_cannot_join_for_someone_else() {
        let app = app(true);
        let (mut doctor, _d_rx) = connection(&app);
        identify_as(&mut doctor, "d1", Role::Doctor);
        let (d_tx, _d_out) = reply_channel();
        handle_client_event(
            ClientEvent::StartQueue {
                doctor_id: "d1".into(),
                hospital_id: "h1".into(),
            },
            &mut doctor,
            &d_tx,
            &app,
        )
        .await;

        let (mut patient, _p_rx) = connection(&app);
        identify_as(&mut patient, "p1", Role::Patient);
        let (tx, mut rx) = reply_channel();

        handle_client_event(
            ClientEvent::JoinQueue {
                doctor_id: "d1".into(),
                hospital_id: "h1".into(),
                patient_id: "p2".into(),
            },
            &mut patient,
            &tx,
            &app,
        )
        .await;

        assert!(matches!(rx.try_recv().unwrap(), ServerEvent::Error { .. }));
        let snap = app
            .queues
            .snapshot(&QueueKey::new("d1", "h1"))
            .await
            .unwrap();
        assert!(snap.waiting.is_empty());
    }

    #[tokio::test]
    async fn doctor_flow_reaches_queue_subscribers() {
        let app = app(true);
        let key = QueueKey::new("d1", "h1");

        let (mut doctor, mut doctor_rx) = connection(&app);
        identify_as(&mut doctor, "d1", Role::Doctor);
        let (d_tx, _d_out) = reply_channel();

        handle_client_event(
            ClientEvent::StartQueue {
                doctor_id: "d1".into(),
                hospital_id: "h1".into(),
            },
            &mut doctor,
            &d_tx,
            &app,
        )
        .await;

        let (mut patient, _p_rx) = connection(&app);
        identify_as(&mut patient, "p1", Role::Patient);
        let (p_tx, mut p_out) = reply_channel();

        handle_client_event(
            ClientEvent::JoinQueue {
                doctor_id: "d1".into(),
                hospital_id: "h1".into(),
                patient_id: "p1".into(),
            },
            &mut patient,
            &p_tx,
            &app,
        )
        .await;

        // No error reply for the patient.
        assert!(p_out.try_recv().is_err());

        // Both connections are on the queue channel and the doctor saw the
        // join land.
        assert_eq!(app.rooms.member_count(&Channel::queue(&key)), 2);
        let mut saw_update = false;
        while let Ok(event) = doctor_rx.try_recv() {
            if matches!(event, ServerEvent::QueueUpdate { ref queue, .. } if queue.len() == 1) {
                saw_update = true;
            }
        }
        assert!(saw_update);
    }

    #[tokio::test]
    async fn signaling_requires_matching_sender_identity() {
        let app = app(true);
        let (mut state, _room_rx) = connection(&app);
        identify_as(&mut state, "u1", Role::Patient);
        let (tx, mut rx) = reply_channel();

        handle_client_event(
            ClientEvent::VideoCallSignal {
                signal: json!({"sdp": "v=0"}),
                from: "impostor".into(),
                to: "u2".into(),
            },
            &mut state,
            &tx,
            &app,
        )
        .await;

        assert!(matches!(rx.try_recv().unwrap(), ServerEvent::Error { .. }));
    }

    #[tokio::test]
    async fn auth_disabled_skips_role_checks() {
        let app = app(false);
        let (mut state, _room_rx) = connection(&app);
        let (tx, mut rx) = reply_channel();

        handle_client_event(
            ClientEvent::StartQueue {
                doctor_id: "d1".into(),
                hospital_id: "h1".into(),
            },
            &mut state,
            &tx,
            &app,
        )
        .await;

        assert!(rx.try_recv().is_err());
        let snap = app
            .queues
            .snapshot(&QueueKey::new("d1", "h1"))
            .await
            .unwrap();
        assert!(snap.is_active);
    }
}
