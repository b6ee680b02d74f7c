use crate::error::{Error, Result};
use crate::keypair::Keypair;
use crate::networking::codec::encode_payload;
use crate::networking::correlator::{Correlator, RequestKind, ResponseReceiver};
use crate::networking::dispatch::{dispatch, DispatchContext, Effect};
use crate::networking::envelope::Envelope;
use crate::networking::message_type::MessageType;
use crate::networking::message_types::handshake::{HandshakeInit, HandshakeNonce};
use crate::networking::session_log::SessionLog;
use crate::settings::ClientSettings;
use crate::time::create_timestamp;
use prost::Message;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Handshaking,
    Ready,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Handshaking => "handshaking",
            SessionState::Ready => "ready",
        };
        f.write_str(name)
    }
}

pub type OutboundSender = mpsc::UnboundedSender<Vec<u8>>;

/// All mutable state of one client connection. Shared as
/// `Arc<RwLock<Session>>`; every method runs under the write lock and
/// none of them await.
///
/// Each socket gets a fresh `connection_id`. Events carrying an older id
/// come from a connection we already gave up on and are ignored.
pub struct Session {
    settings: ClientSettings,
    keypair: Arc<Keypair>,
    state: SessionState,
    state_sender: watch::Sender<SessionState>,
    outbound: Option<OutboundSender>,
    connection_id: u64,
    init_payload: Option<Vec<u8>>,
    handshake_rejection: Option<String>,
    correlator: Correlator,
    log: SessionLog,
}

impl Session {
    pub fn new(settings: ClientSettings, keypair: Arc<Keypair>) -> Self {
        let (state_sender, _) = watch::channel(SessionState::Disconnected);
        let log = SessionLog::new(settings.log_capacity);
        Session {
            settings,
            keypair,
            state: SessionState::Disconnected,
            state_sender,
            outbound: None,
            connection_id: 0,
            init_payload: None,
            handshake_rejection: None,
            correlator: Correlator::new(),
            log,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn connection_id(&self) -> u64 {
        self.connection_id
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_sender.subscribe()
    }

    pub fn logs(&self) -> Vec<String> {
        self.log.entries()
    }

    pub fn correlator(&self) -> &Correlator {
        &self.correlator
    }

    pub fn log(&mut self, level: Level, message: &str) {
        self.log.push(level, message);
    }

    /// Why the last connection attempt did not end in `Ready`.
    pub fn connect_error(&self) -> Error {
        match &self.handshake_rejection {
            Some(reason) => Error::HandshakeRejected(reason.clone()),
            None => Error::NotConnected,
        }
    }

    fn set_state(&mut self, state: SessionState) {
        self.state = state;
        self.state_sender.send_replace(state);
    }

    fn is_current(&self, connection_id: u64) -> bool {
        connection_id == self.connection_id && self.state != SessionState::Disconnected
    }

    /// Claim the session for a new socket. `None` if one already exists.
    pub fn begin_connect(&mut self) -> Option<u64> {
        if self.state != SessionState::Disconnected {
            return None;
        }
        self.connection_id += 1;
        self.handshake_rejection = None;
        self.set_state(SessionState::Connecting);
        let message = format!("Connecting to {}", self.settings.endpoint);
        self.log(Level::INFO, &message);
        Some(self.connection_id)
    }

    pub fn on_connect_failed(&mut self, connection_id: u64, error: &Error) {
        if !self.is_current(connection_id) {
            return;
        }
        self.set_state(SessionState::Disconnected);
        self.log(Level::ERROR, &format!("WebSocket error: {}", error));
    }

    /// The socket is up: start the handshake.
    pub fn on_open(&mut self, connection_id: u64, outbound: OutboundSender) -> Result<()> {
        if !self.is_current(connection_id) {
            return Err(Error::ConnectionLost);
        }
        self.outbound = Some(outbound);
        self.set_state(SessionState::Handshaking);
        self.log(Level::INFO, "WebSocket connected");

        let nonce = HandshakeNonce::new(create_timestamp());
        let init = match HandshakeInit::new(self.keypair.address(), &nonce) {
            Ok(init) => init,
            Err(err) => {
                self.close(&format!("Could not build handshake: {}", err));
                return Err(err);
            }
        };
        self.init_payload = Some(init.payload.clone());
        if let Err(err) = self.send_message(MessageType::HandshakeInit, init.encode_to_vec()) {
            self.close("WebSocket closed before handshake");
            return Err(err);
        }
        self.log(Level::INFO, "Handshake initiated");
        Ok(())
    }

    /// Process one inbound binary frame.
    pub fn handle_frame(&mut self, connection_id: u64, bytes: &[u8]) {
        if !self.is_current(connection_id) {
            return;
        }
        let expected_server = match self.settings.expected_server_address() {
            Ok(expected_server) => expected_server,
            Err(err) => {
                self.close(&format!("Invalid server_address setting: {}", err));
                return;
            }
        };

        let transition = {
            let context = DispatchContext {
                keypair: self.keypair.as_ref(),
                init_payload: self.init_payload.as_deref(),
                expected_server,
                timestamp: create_timestamp(),
            };
            dispatch(self.state, &context, bytes)
        };

        for effect in transition.effects {
            match effect {
                Effect::Send {
                    message_type,
                    payload,
                } => {
                    if self
                        .send_message(message_type, encode_payload(&payload))
                        .is_err()
                    {
                        self.close("WebSocket closed while sending");
                        return;
                    }
                }
                Effect::Resolve(response) => {
                    let kind = response.kind();
                    if !self.correlator.resolve(response) {
                        let message =
                            format!("Received {} for unknown request", kind.response_type());
                        self.log(Level::WARN, &message);
                    }
                }
                Effect::Log(level, message) => self.log(level, &message),
                Effect::Close(reason) => {
                    if self.state == SessionState::Handshaking {
                        self.handshake_rejection = Some(reason.clone());
                    }
                    self.close(&reason);
                    return;
                }
            }
        }

        if transition.state != self.state {
            if transition.state == SessionState::Ready {
                self.init_payload = None;
            }
            self.set_state(transition.state);
        }
    }

    /// The socket went away on its own.
    pub fn on_close(&mut self, connection_id: u64) {
        if !self.is_current(connection_id) {
            return;
        }
        self.close("WebSocket disconnected");
    }

    /// Close the socket on our side. The reader of the old connection is
    /// detached by bumping `connection_id`.
    pub fn disconnect(&mut self) {
        if self.state == SessionState::Disconnected {
            return;
        }
        self.connection_id += 1;
        self.close("WebSocket closed by client");
    }

    fn close(&mut self, reason: &str) {
        // dropping the sender ends the writer task, which closes the sink
        self.outbound = None;
        self.init_payload = None;
        self.set_state(SessionState::Disconnected);
        self.log(Level::INFO, reason);

        let rejected = self.correlator.reject_all();
        if rejected > 0 {
            self.log(
                Level::WARN,
                &format!("Rejected {} pending request(s), connection lost", rejected),
            );
        }
    }

    /// Frame `payload` and queue it on the socket.
    pub fn send_message(&mut self, message_type: MessageType, payload: Vec<u8>) -> Result<()> {
        let outbound = self.outbound.as_ref().ok_or(Error::NotConnected)?;
        let envelope = Envelope::new(
            self.settings.version,
            self.keypair.checksum_address(),
            message_type,
            create_timestamp(),
            payload,
        );
        outbound
            .send(envelope.serialize())
            .map_err(|_| Error::ConnectionLost)?;
        self.log(Level::DEBUG, &format!("Sent message: {}", message_type));
        Ok(())
    }

    /// Register a request of `kind` and send it. The slot exists before the
    /// frame leaves, so even an immediate answer finds its waiter.
    pub fn issue(
        &mut self,
        kind: RequestKind,
        payload: Vec<u8>,
    ) -> Result<(u64, ResponseReceiver)> {
        if !self.is_ready() {
            return Err(Error::NotConnected);
        }
        let (request_id, receiver) = self.correlator.register(kind)?;
        if let Err(err) = self.send_message(kind.request_type(), payload) {
            self.correlator.expire(kind, request_id);
            return Err(err);
        }
        Ok((request_id, receiver))
    }

    /// Give up on `request_id` after its deadline passed.
    pub fn expire(&mut self, kind: RequestKind, request_id: u64) {
        if self.correlator.expire(kind, request_id) {
            let message = format!(
                "{} request timed out after {} seconds",
                kind,
                kind.timeout().as_secs()
            );
            self.log(Level::WARN, &message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networking::correlator::Response;
    use crate::networking::message_types::bytes_message::BytesMessage;
    use crate::test_utilities::{test_keypair, test_settings};

    fn frame(message_type: MessageType, payload: Vec<u8>) -> Vec<u8> {
        Envelope::new(1, String::from("node"), message_type, 0, payload).serialize()
    }

    fn open_session() -> (Session, u64, mpsc::UnboundedReceiver<Vec<u8>>) {
        let mut session = Session::new(test_settings(), Arc::new(test_keypair()));
        let connection_id = session.begin_connect().unwrap();
        let (sender, receiver) = mpsc::unbounded_channel();
        session.on_open(connection_id, sender).unwrap();
        (session, connection_id, receiver)
    }

    #[test]
    fn begin_connect_is_exclusive_test() {
        let mut session = Session::new(test_settings(), Arc::new(test_keypair()));
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(session.begin_connect().is_some());
        assert_eq!(session.state(), SessionState::Connecting);
        assert!(session.begin_connect().is_none());
    }

    #[test]
    fn on_open_sends_handshake_init_test() {
        let (session, _, mut receiver) = open_session();
        assert_eq!(session.state(), SessionState::Handshaking);

        let envelope = Envelope::deserialize(&receiver.try_recv().unwrap()).unwrap();
        assert_eq!(envelope.message_type().unwrap(), MessageType::HandshakeInit);
        let header = envelope.header.clone().unwrap();
        assert_eq!(header.sender_id, test_keypair().checksum_address());
        assert_eq!(header.version, test_settings().version);

        let init = HandshakeInit::decode(envelope.payload.as_slice()).unwrap();
        assert_eq!(init.wallet_address, test_keypair().address().to_vec());
        let nonce: HandshakeNonce = serde_json::from_slice(&init.payload).unwrap();
        assert!(nonce.time > 0);
    }

    #[test]
    fn issue_requires_ready_test() {
        let (mut session, _, _receiver) = open_session();
        assert!(matches!(
            session.issue(RequestKind::Nonce, vec![]),
            Err(Error::NotConnected)
        ));
        assert_eq!(session.correlator().pending_count(), 0);
    }

    #[tokio::test]
    async fn stale_connection_events_are_ignored_test() {
        let (mut session, old_id, _receiver) = open_session();
        session.disconnect();
        assert_eq!(session.state(), SessionState::Disconnected);

        let new_id = session.begin_connect().unwrap();
        assert_ne!(old_id, new_id);

        session.handle_frame(
            old_id,
            &frame(MessageType::Nonce, BytesMessage::new(vec![1]).encode_to_vec()),
        );
        session.on_close(old_id);
        assert_eq!(session.state(), SessionState::Connecting);
    }

    #[tokio::test]
    async fn close_rejects_pending_requests_test() {
        let (mut session, connection_id, _receiver) = open_session();
        // skip the handshake, only the correlator matters here
        session.set_state(SessionState::Ready);
        let (_, receiver) = session.issue(RequestKind::Nonce, vec![]).unwrap();

        session.on_close(connection_id);
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(matches!(receiver.await.unwrap(), Err(Error::ConnectionLost)));
        assert!(session
            .logs()
            .iter()
            .any(|entry| entry.ends_with("WebSocket disconnected")));
    }

    #[tokio::test]
    async fn unknown_response_is_logged_test() {
        let (mut session, connection_id, _receiver) = open_session();
        session.set_state(SessionState::Ready);
        session.handle_frame(
            connection_id,
            &frame(MessageType::Nonce, BytesMessage::new(vec![7]).encode_to_vec()),
        );
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.logs()[0].ends_with("Received nonce for unknown request"));

        let (_, receiver) = session.issue(RequestKind::Nonce, vec![]).unwrap();
        session.handle_frame(
            connection_id,
            &frame(MessageType::Nonce, BytesMessage::new(vec![7]).encode_to_vec()),
        );
        assert_eq!(receiver.await.unwrap().unwrap(), Response::Nonce(7));
    }
}
