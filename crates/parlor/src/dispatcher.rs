//! The dispatcher: routes transport events and user intents.
//!
//! The dispatcher is the only owner of the [`Session`]. It sits between
//! the transport, the codec, the room directory and the render sink:
//!
//! ```text
//!   TransportEvent ──→ handle_event ──decode──→ Session / RenderSink
//!   user text      ──→ send_message ──encode──→ Transport
//!   room name      ──→ join_room ──resolve_room──→ Session
//! ```
//!
//! Every method runs to completion on the caller's task before the next
//! event is handled, so session transitions never interleave.

use parlor_protocol::{ChatMessage, Codec, Envelope, RoomId};
use parlor_room::{RoomDirectory, RoomSummary, resolve_room, validate_room_name};
use parlor_session::Session;
use parlor_transport::{Transport, TransportEvent};

use crate::{ClientError, RenderSink};

/// Routes inbound frames to the session and sink, and user intents to the
/// transport and room directory.
pub struct Dispatcher<T: Transport, C: Codec, R: RenderSink> {
    transport: T,
    codec: C,
    sink: R,
    session: Session,
}

impl<T, C, R> Dispatcher<T, C, R>
where
    T: Transport,
    C: Codec,
    R: RenderSink,
{
    /// Creates a dispatcher with an empty session.
    pub fn new(transport: T, codec: C, sink: R) -> Self {
        Self {
            transport,
            codec,
            sink,
            session: Session::new(),
        }
    }

    /// The current identity and room.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The transport outbound frames go to.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The sink everything is rendered to.
    pub fn sink(&self) -> &R {
        &self.sink
    }

    // ---- Inbound ----

    /// Handles one transport event.
    ///
    /// A lost connection resets the identity; the room is kept so the user
    /// can see where they were.
    ///
    /// # Errors
    /// Only what [`handle_frame`](Self::handle_frame) reports.
    pub fn handle_event(&mut self, event: TransportEvent) -> Result<(), ClientError> {
        match event {
            TransportEvent::Opened => {
                tracing::info!("connection opened");
                Ok(())
            }
            TransportEvent::MessageReceived(frame) => self.handle_frame(&frame),
            TransportEvent::Errored(reason) => {
                tracing::warn!(%reason, "connection errored");
                self.session.reset_identity();
                self.sink.display_error(&format!("connection error: {reason}"));
                Ok(())
            }
            TransportEvent::Closed(reason) => {
                tracing::info!(%reason, "connection closed");
                self.session.reset_identity();
                Ok(())
            }
        }
    }

    /// Decodes one inbound text frame and routes it.
    ///
    /// Frames that fail to decode are logged and dropped; they never touch
    /// the session or the connection.
    ///
    /// # Errors
    /// Returns [`SessionError::IdentityReassigned`](parlor_session::SessionError::IdentityReassigned)
    /// (wrapped) if a second `welcome` carries a different id. The
    /// connection stays open and the first identity is kept.
    pub fn handle_frame(&mut self, frame: &str) -> Result<(), ClientError> {
        let envelope = match self.codec.decode(frame) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(error = %e, len = frame.len(), "dropping undecodable frame");
                return Ok(());
            }
        };

        match envelope {
            Envelope::Welcome(welcome) => {
                self.session.apply_welcome(welcome.id.clone())?;
                self.sink.display_client_id(&welcome.id);
            }
            Envelope::ChatMessage(ChatMessage { room_id, message }) => {
                tracing::debug!(room_id = ?room_id, "chat message received");
                self.sink.display_message(&message, false);
            }
            Envelope::Unrecognized(frame) => {
                tracing::debug!(kind = frame.kind(), "ignoring unrecognized frame");
            }
        }
        Ok(())
    }

    // ---- Outbound ----

    /// Posts `text` to the current room and echoes it locally.
    ///
    /// Empty text is ignored. The session is never modified.
    ///
    /// # Errors
    /// - [`SessionError::NotReady`](parlor_session::SessionError::NotReady)
    ///   if there is no identity or no room; nothing is sent
    /// - [`TransportError::NotConnected`](parlor_transport::TransportError::NotConnected)
    ///   if the connection is not open
    pub fn send_message(&mut self, text: &str) -> Result<(), ClientError> {
        if text.is_empty() {
            tracing::debug!("ignoring empty message");
            return Ok(());
        }

        let ready = self.session.require_ready()?;
        let frame = self
            .codec
            .encode(&Envelope::outbound_chat(ready.room_id, text))?;
        self.transport.send(frame)?;

        self.sink.display_message(text, true);
        Ok(())
    }

    /// Resolves `name` to a room, joins it, and makes it the current room.
    ///
    /// Requires an identity: asking before the server's `welcome` fails
    /// immediately rather than waiting for one. The session is only
    /// updated after the whole flow succeeded.
    ///
    /// # Errors
    /// - [`RoomError::InvalidRoomName`](parlor_room::RoomError::InvalidRoomName)
    ///   for blank names, before anything else is checked
    /// - [`SessionError::NotReady`](parlor_session::SessionError::NotReady)
    ///   without an identity
    /// - [`RoomError::ResolutionFailed`](parlor_room::RoomError::ResolutionFailed)
    ///   naming the step that failed
    pub async fn join_room<D>(&mut self, directory: &D, name: &str) -> Result<RoomId, ClientError>
    where
        D: RoomDirectory + ?Sized,
    {
        let name = validate_room_name(name)?;
        let client_id = self.session.require_client_id()?.clone();

        let room_id = resolve_room(directory, &client_id, name).await?;
        self.session.set_room(room_id.clone());
        Ok(room_id)
    }

    /// Fetches the server's room listing and shows it.
    ///
    /// # Errors
    /// Returns [`DirectoryError`](parlor_room::DirectoryError) (wrapped) if
    /// the request fails.
    pub async fn list_rooms<D>(&mut self, directory: &D) -> Result<Vec<RoomSummary>, ClientError>
    where
        D: RoomDirectory + ?Sized,
    {
        let rooms = directory.list_rooms().await?;
        tracing::debug!(count = rooms.len(), "rooms listed");
        self.sink.display_rooms(&rooms);
        Ok(rooms)
    }

    /// Asks the transport to close the connection.
    ///
    /// # Errors
    /// Returns a wrapped [`TransportError`](parlor_transport::TransportError)
    /// if the close request could not be delivered.
    pub fn close(&self) -> Result<(), ClientError> {
        self.transport.close()?;
        Ok(())
    }

    /// Shows an error through the sink.
    pub fn report(&mut self, error: &ClientError) {
        self.sink.display_error(&error.to_string());
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use parlor_protocol::{ClientId, JsonCodec};
    use parlor_room::{CreateOutcome, DirectoryError, RoomError, Stage};
    use parlor_session::{Missing, SessionError};
    use parlor_transport::{ConnectionState, TransportError};

    use super::*;

    // ---- Doubles ----

    #[derive(Clone)]
    struct MockTransport {
        state: Arc<Mutex<ConnectionState>>,
        sent: Arc<Mutex<Vec<String>>>,
    }

    impl MockTransport {
        fn open() -> Self {
            Self {
                state: Arc::new(Mutex::new(ConnectionState::Open)),
                sent: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Transport for MockTransport {
        fn state(&self) -> ConnectionState {
            *self.state.lock().unwrap()
        }

        fn send(&self, frame: String) -> Result<(), TransportError> {
            let state = self.state();
            if !state.is_open() {
                return Err(TransportError::NotConnected(state));
            }
            self.sent.lock().unwrap().push(frame);
            Ok(())
        }

        fn close(&self) -> Result<(), TransportError> {
            *self.state.lock().unwrap() = ConnectionState::Closed;
            Ok(())
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Shown {
        Message(String, bool),
        ClientId(String),
        Error(String),
        Rooms(Vec<String>),
    }

    #[derive(Default)]
    struct RecordingSink {
        shown: Vec<Shown>,
    }

    impl RenderSink for RecordingSink {
        fn display_message(&mut self, text: &str, is_self: bool) {
            self.shown.push(Shown::Message(text.to_owned(), is_self));
        }

        fn display_client_id(&mut self, id: &ClientId) {
            self.shown.push(Shown::ClientId(id.to_string()));
        }

        fn display_error(&mut self, message: &str) {
            self.shown.push(Shown::Error(message.to_owned()));
        }

        fn display_rooms(&mut self, rooms: &[RoomSummary]) {
            self.shown
                .push(Shown::Rooms(rooms.iter().map(|r| r.name.clone()).collect()));
        }
    }

    /// Directory that creates every room as `r-{name}` and records joins.
    #[derive(Default)]
    struct FakeDirectory {
        joins: Mutex<Vec<(ClientId, RoomId)>>,
        fail_join: bool,
    }

    impl RoomDirectory for FakeDirectory {
        async fn create_room(&self, name: &str) -> Result<CreateOutcome, DirectoryError> {
            Ok(CreateOutcome::Created(RoomId::new(format!("r-{name}"))))
        }

        async fn lookup_room_by_name(&self, name: &str) -> Result<RoomId, DirectoryError> {
            Ok(RoomId::new(format!("r-{name}")))
        }

        async fn join_room(
            &self,
            client_id: &ClientId,
            room_id: &RoomId,
        ) -> Result<(), DirectoryError> {
            if self.fail_join {
                return Err(DirectoryError::Request("join refused".into()));
            }
            self.joins
                .lock()
                .unwrap()
                .push((client_id.clone(), room_id.clone()));
            Ok(())
        }

        async fn list_rooms(&self) -> Result<Vec<RoomSummary>, DirectoryError> {
            Ok(vec![RoomSummary {
                id: RoomId::new("r-lobby"),
                name: "lobby".into(),
            }])
        }
    }

    type TestDispatcher = Dispatcher<MockTransport, JsonCodec, RecordingSink>;

    fn dispatcher() -> (TestDispatcher, MockTransport) {
        let transport = MockTransport::open();
        let dispatcher = Dispatcher::new(transport.clone(), JsonCodec, RecordingSink::default());
        (dispatcher, transport)
    }

    fn welcome(id: &str) -> TransportEvent {
        TransportEvent::MessageReceived(format!(
            r#"{{"type":"welcome","payload":{{"id":"{id}"}}}}"#
        ))
    }

    fn chat(text: &str) -> TransportEvent {
        TransportEvent::MessageReceived(format!(
            r#"{{"type":"chat_message","payload":{{"message":"{text}"}}}}"#
        ))
    }

    // ---- Inbound ----

    #[test]
    fn test_handle_event_renders_in_arrival_order() {
        let (mut d, _) = dispatcher();

        for event in [welcome("A"), chat("m1"), chat("m2")] {
            d.handle_event(event).unwrap();
        }

        assert_eq!(
            d.sink().shown,
            vec![
                Shown::ClientId("A".into()),
                Shown::Message("m1".into(), false),
                Shown::Message("m2".into(), false),
            ]
        );
        assert_eq!(d.session().client_id(), Some(&ClientId::new("A")));
    }

    #[test]
    fn test_handle_frame_malformed_frames_change_nothing() {
        let (mut d, transport) = dispatcher();
        d.handle_event(welcome("A")).unwrap();
        let before = d.session().clone();

        for frame in [
            "not json",
            "{}",
            r#"{"type":42}"#,
            r#"{"type":"welcome","payload":{}}"#,
            r#"{"type":"chat_message","payload":{"text":"x"}}"#,
        ] {
            d.handle_frame(frame).unwrap();
        }

        assert_eq!(*d.session(), before);
        assert_eq!(transport.state(), ConnectionState::Open);
        assert_eq!(d.sink().shown, vec![Shown::ClientId("A".into())]);
    }

    #[test]
    fn test_handle_frame_unrecognized_is_ignored() {
        let (mut d, _) = dispatcher();
        d.handle_frame(r#"{"type":"typing","payload":{"who":"B"}}"#)
            .unwrap();
        assert!(d.sink().shown.is_empty());
    }

    #[test]
    fn test_handle_frame_inbound_chat_with_room_id_is_displayed() {
        let (mut d, _) = dispatcher();
        d.handle_frame(r#"{"type":"chat_message","payload":{"room_id":"r1","message":"yo"}}"#)
            .unwrap();
        assert_eq!(d.sink().shown, vec![Shown::Message("yo".into(), false)]);
    }

    #[test]
    fn test_handle_frame_second_welcome_different_id_reports_and_keeps_first() {
        let (mut d, transport) = dispatcher();
        d.handle_event(welcome("A")).unwrap();

        let result = d.handle_event(welcome("B"));

        assert!(matches!(
            result,
            Err(ClientError::Session(SessionError::IdentityReassigned { .. }))
        ));
        assert_eq!(d.session().client_id(), Some(&ClientId::new("A")));
        assert_eq!(transport.state(), ConnectionState::Open);
    }

    #[test]
    fn test_handle_event_closed_resets_identity_keeps_room() {
        let (mut d, _) = dispatcher();
        d.handle_event(welcome("A")).unwrap();
        d.session.set_room(RoomId::new("r1"));

        d.handle_event(TransportEvent::Closed("bye".into())).unwrap();

        assert_eq!(d.session().client_id(), None);
        assert_eq!(d.session().room_id(), Some(&RoomId::new("r1")));
    }

    #[test]
    fn test_handle_event_errored_surfaces_error() {
        let (mut d, _) = dispatcher();
        d.handle_event(welcome("A")).unwrap();

        d.handle_event(TransportEvent::Errored("reset by peer".into()))
            .unwrap();

        assert_eq!(d.session().client_id(), None);
        assert_eq!(
            d.sink().shown.last(),
            Some(&Shown::Error("connection error: reset by peer".into()))
        );
    }

    // ---- Outbound ----

    #[test]
    fn test_send_message_without_room_is_not_ready_and_sends_nothing() {
        let (mut d, transport) = dispatcher();
        d.handle_event(welcome("A")).unwrap();

        let result = d.send_message("hi");

        assert!(matches!(
            result,
            Err(ClientError::Session(SessionError::NotReady(Missing::Room)))
        ));
        assert!(transport.sent().is_empty());
        assert_eq!(d.sink().shown, vec![Shown::ClientId("A".into())]);
    }

    #[test]
    fn test_send_message_empty_text_is_ignored() {
        let (mut d, transport) = dispatcher();
        d.send_message("").unwrap();
        assert!(transport.sent().is_empty());
        assert!(d.sink().shown.is_empty());
    }

    #[test]
    fn test_send_message_on_closed_transport_is_not_connected() {
        let (mut d, transport) = dispatcher();
        d.handle_event(welcome("A")).unwrap();
        d.session.set_room(RoomId::new("r1"));
        transport.close().unwrap();

        let result = d.send_message("hi");

        assert!(matches!(
            result,
            Err(ClientError::Transport(TransportError::NotConnected(
                ConnectionState::Closed
            )))
        ));
        assert!(!d.sink().shown.contains(&Shown::Message("hi".into(), true)));
    }

    #[test]
    fn test_send_message_does_not_touch_session() {
        let (mut d, _) = dispatcher();
        d.handle_event(welcome("A")).unwrap();
        d.session.set_room(RoomId::new("r1"));
        let before = d.session().clone();

        d.send_message("hello").unwrap();

        assert_eq!(*d.session(), before);
    }

    // ---- Rooms ----

    #[tokio::test]
    async fn test_join_room_then_send_produces_exact_frame() {
        let (mut d, transport) = dispatcher();
        let directory = FakeDirectory::default();
        d.handle_event(welcome("c1")).unwrap();

        let room = d.join_room(&directory, "lobby").await.unwrap();
        d.send_message("hi").unwrap();

        assert_eq!(room, RoomId::new("r-lobby"));
        assert_eq!(
            *directory.joins.lock().unwrap(),
            vec![(ClientId::new("c1"), RoomId::new("r-lobby"))]
        );
        let sent: Vec<serde_json::Value> = transport
            .sent()
            .iter()
            .map(|f| serde_json::from_str(f).unwrap())
            .collect();
        assert_eq!(
            sent,
            vec![serde_json::json!({
                "type": "chat_message",
                "payload": { "room_id": "r-lobby", "message": "hi" }
            })]
        );
        assert_eq!(d.sink().shown.last(), Some(&Shown::Message("hi".into(), true)));
    }

    #[tokio::test]
    async fn test_join_room_blank_name_fails_before_identity_check() {
        let (mut d, _) = dispatcher();
        let directory = FakeDirectory::default();

        let result = d.join_room(&directory, "   ").await;

        assert!(matches!(
            result,
            Err(ClientError::Room(RoomError::InvalidRoomName))
        ));
        assert!(directory.joins.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_join_room_without_identity_fails_fast() {
        let (mut d, _) = dispatcher();
        let directory = FakeDirectory::default();

        let result = d.join_room(&directory, "lobby").await;

        assert!(matches!(
            result,
            Err(ClientError::Session(SessionError::NotReady(Missing::ClientId)))
        ));
        assert!(directory.joins.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_join_room_failure_leaves_previous_room() {
        let (mut d, _) = dispatcher();
        d.handle_event(welcome("c1")).unwrap();
        d.join_room(&FakeDirectory::default(), "lobby").await.unwrap();

        let failing = FakeDirectory {
            fail_join: true,
            ..FakeDirectory::default()
        };
        let result = d.join_room(&failing, "general").await;

        assert!(matches!(
            result,
            Err(ClientError::Room(RoomError::ResolutionFailed {
                stage: Stage::Join,
                ..
            }))
        ));
        assert_eq!(d.session().room_id(), Some(&RoomId::new("r-lobby")));
    }

    #[tokio::test]
    async fn test_list_rooms_renders_listing() {
        let (mut d, _) = dispatcher();

        let rooms = d.list_rooms(&FakeDirectory::default()).await.unwrap();

        assert_eq!(rooms.len(), 1);
        assert_eq!(d.sink().shown, vec![Shown::Rooms(vec!["lobby".into()])]);
    }

    #[test]
    fn test_report_goes_to_sink() {
        let (mut d, _) = dispatcher();
        d.report(&ClientError::Session(SessionError::NotReady(Missing::Room)));
        assert_eq!(
            d.sink().shown,
            vec![Shown::Error("session not ready: no room selected".into())]
        );
    }
}
