use crate::crypto::FichainAddress;
use crate::error::{Error, Result};
use crate::keypair::Keypair;
use crate::networking::correlator::{RequestKind, Response};
use crate::networking::message_type::MessageType;
use crate::networking::message_types::{
    bytes_message::BytesMessage,
    call_data::{CallSmartContractData, CallSmartContractResponse},
    receipt::Receipt,
    transaction::Transaction,
};
use crate::networking::session::{OutboundSender, Session, SessionState};
use crate::networking::socket::{open_websocket, read_frames};
use crate::settings::ClientSettings;
use bigint::U256;
use futures::Stream;
use prost::Message;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tracing::{event, Level};

/// The async API of a wallet session.
///
/// Cheap to clone; every clone drives the same `Session`. Requests are
/// answered through the correlator: each call registers a slot for its
/// `RequestKind`, sends the frame and waits on the slot with the kind's
/// deadline.
#[derive(Clone)]
pub struct SessionClient {
    session_lock: Arc<RwLock<Session>>,
    keypair: Arc<Keypair>,
    chain_id: u64,
}

impl SessionClient {
    pub fn new(settings: ClientSettings, keypair: Arc<Keypair>) -> Self {
        let chain_id = settings.chain_id;
        SessionClient {
            session_lock: Arc::new(RwLock::new(Session::new(settings, keypair.clone()))),
            keypair,
            chain_id,
        }
    }

    pub fn session_lock(&self) -> Arc<RwLock<Session>> {
        self.session_lock.clone()
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// Open the websocket in the background and start the handshake.
    /// Does nothing while a socket already exists. Failures are not returned,
    /// they leave the session `Disconnected` with a log entry.
    pub async fn connect(&self) {
        let (connection_id, endpoint) = {
            let mut session = self.session_lock.write().await;
            match session.begin_connect() {
                Some(connection_id) => (connection_id, session.settings().endpoint.clone()),
                None => return,
            }
        };

        let session_lock = self.session_lock.clone();
        tokio::spawn(async move {
            match open_websocket(&endpoint).await {
                Ok((outbound, inbound)) => {
                    let opened = session_lock.write().await.on_open(connection_id, outbound);
                    match opened {
                        Ok(()) => read_frames(session_lock, connection_id, inbound).await,
                        Err(err) => event!(Level::WARN, "socket opened too late: {}", err),
                    }
                }
                Err(err) => {
                    session_lock
                        .write()
                        .await
                        .on_connect_failed(connection_id, &err);
                }
            }
        });
    }

    /// Run the session over an already established transport. `outbound`
    /// receives every frame the session sends; `inbound` yields the frames
    /// the node sends, and ending it counts as the node hanging up.
    pub async fn attach<S>(&self, outbound: OutboundSender, inbound: S) -> Result<()>
    where
        S: Stream<Item = Result<Vec<u8>>> + Send + Unpin + 'static,
    {
        let connection_id = {
            let mut session = self.session_lock.write().await;
            let connection_id = session
                .begin_connect()
                .ok_or_else(|| Error::Transport(String::from("session already connected")))?;
            session.on_open(connection_id, outbound)?;
            connection_id
        };
        tokio::spawn(read_frames(self.session_lock.clone(), connection_id, inbound));
        Ok(())
    }

    pub async fn disconnect(&self) {
        self.session_lock.write().await.disconnect();
    }

    /// True once the handshake completed and until the socket closes.
    pub async fn is_connected(&self) -> bool {
        self.session_lock.read().await.is_ready()
    }

    pub async fn state(&self) -> SessionState {
        self.session_lock.read().await.state()
    }

    /// Session log, newest entry first.
    pub async fn logs(&self) -> Vec<String> {
        self.session_lock.read().await.logs()
    }

    pub async fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.session_lock.read().await.subscribe()
    }

    /// Wait for the handshake to complete.
    ///
    /// Returns early once a connection attempt that was under way when this
    /// was called, or that started while waiting, falls back to
    /// `Disconnected`: with `HandshakeRejected` when the node failed the
    /// handshake, `NotConnected` otherwise. `NotConnected` on the deadline too.
    pub async fn wait_until_ready(&self, timeout: Duration) -> Result<()> {
        let mut state_receiver = self.subscribe().await;
        let mut attempted = *state_receiver.borrow() != SessionState::Disconnected;
        let ready = async {
            loop {
                let state = *state_receiver.borrow();
                match state {
                    SessionState::Ready => return Ok(()),
                    SessionState::Disconnected if attempted => {
                        return Err(self.session_lock.read().await.connect_error());
                    }
                    SessionState::Disconnected => {}
                    _ => attempted = true,
                }
                if state_receiver.changed().await.is_err() {
                    return Err(Error::ConnectionLost);
                }
            }
        };
        tokio::time::timeout(timeout, ready)
            .await
            .map_err(|_| Error::NotConnected)?
    }

    /// Send a raw payload under `message_type`, without waiting for an answer.
    pub async fn send_message(&self, message_type: MessageType, payload: Vec<u8>) -> Result<()> {
        self.session_lock
            .write()
            .await
            .send_message(message_type, payload)
    }

    async fn issue(&self, kind: RequestKind, payload: Vec<u8>) -> Result<Response> {
        let (request_id, receiver) = self.session_lock.write().await.issue(kind, payload)?;
        // the deadline runs on its own, even if nobody awaits this request
        let session_lock = self.session_lock.clone();
        tokio::spawn(async move {
            tokio::time::sleep(kind.timeout()).await;
            session_lock.write().await.expire(kind, request_id);
        });
        // a dropped sender means the session itself is gone
        receiver.await.unwrap_or(Err(Error::ConnectionLost))
    }

    /// The next nonce of our wallet.
    pub async fn get_nonce(&self) -> Result<u64> {
        let payload = BytesMessage::new(self.keypair.address().to_vec()).encode_to_vec();
        match self.issue(RequestKind::Nonce, payload).await? {
            Response::Nonce(nonce) => Ok(nonce),
            other => Err(Error::UnexpectedResponse(other.kind())),
        }
    }

    /// Balance of our wallet. The node knows who we are from the handshake.
    pub async fn get_balance(&self) -> Result<U256> {
        match self.issue(RequestKind::Balance, vec![]).await? {
            Response::Balance(balance) => Ok(balance),
            other => Err(Error::UnexpectedResponse(other.kind())),
        }
    }

    /// Submit a signed transaction and wait until it is mined.
    pub async fn send_transaction(&self, transaction: Transaction) -> Result<Receipt> {
        let payload = transaction.encode_to_vec();
        match self.issue(RequestKind::Transaction, payload).await? {
            Response::Receipt(receipt) => Ok(receipt),
            other => Err(Error::UnexpectedResponse(other.kind())),
        }
    }

    pub async fn call_smart_contract(
        &self,
        call: CallSmartContractData,
    ) -> Result<CallSmartContractResponse> {
        let payload = call.encode_to_vec();
        match self.issue(RequestKind::SmartContractCall, payload).await? {
            Response::CallResult(response) => Ok(response),
            other => Err(Error::UnexpectedResponse(other.kind())),
        }
    }

    /// Fetch our nonce, build and sign a transaction for it and send it.
    pub async fn transfer(
        &self,
        to_address: FichainAddress,
        amount: U256,
        data: Vec<u8>,
        gas: u64,
        gas_price: U256,
        message: String,
    ) -> Result<Receipt> {
        let nonce = self.get_nonce().await?;
        let mut transaction =
            Transaction::new(to_address, nonce, amount, data, gas, gas_price, message);
        transaction.sign(&self.keypair, self.chain_id)?;
        event!(
            Level::INFO,
            "sending transaction {} with nonce {}",
            hex::encode(transaction.get_hash()),
            nonce
        );
        self.send_transaction(transaction).await
    }

    /// Sign and run a read-only contract call.
    pub async fn call(
        &self,
        to_address: FichainAddress,
        data: Vec<u8>,
    ) -> Result<CallSmartContractResponse> {
        let mut call = CallSmartContractData::new(to_address, data);
        call.sign(&self.keypair)?;
        self.call_smart_contract(call).await
    }
}
