use crate::error::Result;
use crate::keypair::Keypair;
use crate::networking::client::SessionClient;
use crate::networking::envelope::Envelope;
use crate::networking::message_type::MessageType;
use crate::networking::message_types::{
    bytes_message::BytesMessage,
    handshake::{HandshakeAck, HandshakeInit},
};
use crate::settings::ClientSettings;
use crate::test_utilities::mocks::make_mock_frame;
use crate::test_utilities::{test_keypair, test_server_keypair};
use prost::Message;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Plays the node on the other end of an in-memory transport.
pub struct TestManager {
    pub client: SessionClient,
    pub server_keypair: Keypair,
    client_frames: mpsc::UnboundedReceiver<Vec<u8>>,
    node_sender: Option<mpsc::UnboundedSender<Result<Vec<u8>>>>,
    init_payload: Option<Vec<u8>>,
}

impl TestManager {
    /// A client attached to the mock node; the handshake has only been initiated.
    pub async fn new(settings: ClientSettings) -> Self {
        let client = SessionClient::new(settings, Arc::new(test_keypair()));
        let (outbound_sender, client_frames) = mpsc::unbounded_channel();
        let (node_sender, node_receiver) = mpsc::unbounded_channel();
        client
            .attach(outbound_sender, UnboundedReceiverStream::new(node_receiver))
            .await
            .unwrap();

        TestManager {
            client,
            server_keypair: test_server_keypair(),
            client_frames,
            node_sender: Some(node_sender),
            init_payload: None,
        }
    }

    /// A client that completed the handshake.
    pub async fn ready(settings: ClientSettings) -> Self {
        let mut test_manager = TestManager::new(settings).await;
        test_manager.complete_handshake().await;
        test_manager
    }

    pub async fn complete_handshake(&mut self) {
        self.expect_message(MessageType::HandshakeInit).await;
        self.send_ack(b"mock node challenge");
        self.expect_message(MessageType::HandshakeConfirm).await;
        self.wait_until_ready().await;
    }

    pub async fn wait_until_ready(&self) {
        self.client
            .wait_until_ready(Duration::from_secs(5))
            .await
            .unwrap();
    }

    /// The next frame the client sent, `None` once the client closed the socket.
    pub async fn next_frame(&mut self) -> Option<Envelope> {
        let bytes = self.client_frames.recv().await?;
        Some(Envelope::deserialize(&bytes).unwrap())
    }

    pub fn try_frame(&mut self) -> Option<Envelope> {
        self.client_frames
            .try_recv()
            .ok()
            .map(|bytes| Envelope::deserialize(&bytes).unwrap())
    }

    pub async fn expect_message(&mut self, message_type: MessageType) -> Envelope {
        let envelope = self
            .next_frame()
            .await
            .unwrap_or_else(|| panic!("socket closed while waiting for {}", message_type));
        assert_eq!(envelope.message_type().unwrap(), message_type);
        if message_type == MessageType::HandshakeInit {
            let init = HandshakeInit::decode(envelope.payload.as_slice()).unwrap();
            self.init_payload = Some(init.payload);
        }
        envelope
    }

    pub fn send(&self, message_type: MessageType, payload: Vec<u8>) {
        self.send_raw(make_mock_frame(&self.server_keypair, message_type, payload));
    }

    pub fn send_bytes(&self, message_type: MessageType, data: Vec<u8>) {
        self.send(message_type, BytesMessage::new(data).encode_to_vec());
    }

    pub fn send_raw(&self, bytes: Vec<u8>) {
        if let Some(node_sender) = &self.node_sender {
            node_sender.send(Ok(bytes)).unwrap();
        }
    }

    /// Answer the last `handshake_init` with `challenge`, signed by the node.
    pub fn send_ack(&self, challenge: &[u8]) {
        let init_payload = self.init_payload.clone().unwrap_or_default();
        let ack = HandshakeAck {
            wallet_address: self.server_keypair.address().to_vec(),
            payload: challenge.to_vec(),
            signature: self.server_keypair.sign_bytes(&init_payload).unwrap().to_vec(),
        };
        self.send(MessageType::HandshakeAck, ack.encode_to_vec());
    }

    /// Give the reader task time to drain what was sent so far.
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    /// Close the node's side of the transport.
    pub fn hang_up(&mut self) {
        self.node_sender = None;
    }
}
