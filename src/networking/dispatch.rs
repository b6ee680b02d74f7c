use crate::crypto::{to_checksum_address, FichainAddress};
use crate::keypair::Keypair;
use crate::networking::codec::{bytes_to_u256, bytes_to_u64, decode_payload, Payload};
use crate::networking::correlator::Response;
use crate::networking::envelope::Envelope;
use crate::networking::message_type::MessageType;
use crate::networking::message_types::{
    bytes_message::BytesMessage,
    handshake::{HandshakeAck, HandshakeConfirm},
    ping_pong::Pong,
};
use crate::networking::session::SessionState;
use tracing::Level;

/// Something the session must do as a consequence of an inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Send {
        message_type: MessageType,
        payload: Payload,
    },
    Resolve(Response),
    Log(Level, String),
    /// Tear the connection down. The string is the reason logged.
    Close(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: SessionState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn stay(state: SessionState) -> Self {
        Transition {
            state,
            effects: vec![],
        }
    }

    fn log(mut self, level: Level, message: String) -> Self {
        self.effects.push(Effect::Log(level, message));
        self
    }

    fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// What `dispatch` may read about the session besides its state.
pub struct DispatchContext<'a> {
    pub keypair: &'a Keypair,
    /// Our `handshake_init` payload, while the handshake is in progress.
    pub init_payload: Option<&'a [u8]>,
    /// The node address we insist on, if configured.
    pub expected_server: Option<FichainAddress>,
    /// Unix seconds, stamped into `pong`.
    pub timestamp: u64,
}

/// The inbound transition table. Pure: no I/O, no clock, no randomness, so
/// the same state, context and bytes always produce the same transition.
/// Decoding problems never fail the call, they become `Effect::Log` and the
/// frame is dropped.
pub fn dispatch(state: SessionState, context: &DispatchContext<'_>, bytes: &[u8]) -> Transition {
    let envelope = match Envelope::deserialize(bytes) {
        Ok(envelope) => envelope,
        Err(err) => {
            return Transition::stay(state).log(Level::WARN, format!("Dropped frame: {}", err))
        }
    };

    let message_type = match envelope.message_type() {
        Ok(message_type) => message_type,
        Err(_) => {
            return Transition::stay(state).log(
                Level::WARN,
                format!(
                    "Received unknown message: {}",
                    envelope.message_type_str().unwrap_or("<no header>")
                ),
            )
        }
    };

    let transition =
        Transition::stay(state).log(Level::DEBUG, format!("Received message: {}", message_type));

    let payload = match decode_payload(message_type, &envelope.payload) {
        Ok(payload) => payload,
        Err(err) => return transition.log(Level::WARN, format!("Dropped frame: {}", err)),
    };

    match payload {
        Payload::HandshakeAck(ack) => on_handshake_ack(transition, context, &ack),
        Payload::Ping(ping) => {
            let pong = Pong {
                node_id: context.keypair.checksum_address(),
                timestamp: context.timestamp as i64,
            };
            transition
                .log(Level::DEBUG, format!("Ping from {}", ping.node_id))
                .with(Effect::Send {
                    message_type: MessageType::Pong,
                    payload: Payload::Pong(pong),
                })
        }
        Payload::Pong(pong) => transition.log(Level::DEBUG, format!("Pong from {}", pong.node_id)),
        Payload::Bytes(bytes_message) => {
            on_bytes_response(transition, message_type, &bytes_message.data)
        }
        Payload::Receipt(receipt) => transition.with(Effect::Resolve(Response::Receipt(receipt))),
        Payload::CallResult(response) => {
            transition.with(Effect::Resolve(Response::CallResult(response)))
        }
        Payload::Opaque(mined) if message_type == MessageType::TxMined => {
            // the node wants the raw tx_mined payload back as the receipt key
            transition
                .log(Level::INFO, String::from("Transaction mined, requesting receipt"))
                .with(Effect::Send {
                    message_type: MessageType::GetReceipt,
                    payload: Payload::Bytes(BytesMessage::new(mined)),
                })
        }
        _ => transition.log(
            Level::DEBUG,
            format!("No handler for {}, ignoring", message_type),
        ),
    }
}

fn on_handshake_ack(
    transition: Transition,
    context: &DispatchContext<'_>,
    ack: &HandshakeAck,
) -> Transition {
    let init_payload = match (transition.state, context.init_payload) {
        (SessionState::Handshaking, Some(init_payload)) => init_payload,
        _ => {
            return transition.log(
                Level::WARN,
                String::from("Received handshake_ack outside of a handshake"),
            )
        }
    };

    let mut transition = match ack.recover_server_address(init_payload) {
        Ok(Some(server)) => match context.expected_server {
            Some(expected) if expected != server => {
                return abort(
                    transition,
                    format!(
                        "Handshake rejected: node signed as {}, expected {}",
                        to_checksum_address(&server),
                        to_checksum_address(&expected)
                    ),
                )
            }
            _ => transition.log(
                Level::INFO,
                format!("Node identified as {}", to_checksum_address(&server)),
            ),
        },
        Ok(None) if context.expected_server.is_some() => {
            return abort(
                transition,
                String::from("Handshake rejected: node did not sign the handshake"),
            )
        }
        Ok(None) => transition,
        Err(err) if context.expected_server.is_some() => {
            return abort(transition, format!("Handshake rejected: {}", err))
        }
        Err(err) => transition.log(
            Level::WARN,
            format!("Could not verify node signature: {}", err),
        ),
    };

    match HandshakeConfirm::sign(ack, context.keypair) {
        Ok(confirm) => {
            // the node sends nothing back for a valid confirm, so the session
            // is considered ready as soon as the confirm is queued
            transition.state = SessionState::Ready;
            transition
                .with(Effect::Send {
                    message_type: MessageType::HandshakeConfirm,
                    payload: Payload::HandshakeConfirm(confirm),
                })
                .log(Level::INFO, String::from("Handshake complete"))
        }
        Err(err) => abort(
            transition,
            format!("Could not sign handshake challenge: {}", err),
        ),
    }
}

fn on_bytes_response(transition: Transition, message_type: MessageType, data: &[u8]) -> Transition {
    match message_type {
        MessageType::Nonce => match bytes_to_u64(data) {
            Ok(nonce) => transition.with(Effect::Resolve(Response::Nonce(nonce))),
            Err(err) => transition.log(Level::WARN, format!("Dropped nonce: {}", err)),
        },
        MessageType::Balance => match bytes_to_u256(data) {
            Ok(balance) => transition.with(Effect::Resolve(Response::Balance(balance))),
            Err(err) => transition.log(Level::WARN, format!("Dropped balance: {}", err)),
        },
        _ => transition.log(
            Level::DEBUG,
            format!("No handler for {}, ignoring", message_type),
        ),
    }
}

fn abort(mut transition: Transition, reason: String) -> Transition {
    transition.state = SessionState::Disconnected;
    transition.with(Effect::Close(reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{keccak256, recover_address};
    use crate::networking::codec::encode_payload;
    use crate::networking::message_types::receipt::Receipt;
    use crate::test_utilities::{test_keypair, test_server_keypair};
    use bigint::U256;
    use prost::Message;

    const INIT_PAYLOAD: &[u8] =
        br#"{"time":1700000000,"uuid":"0b7d0c1e-4c1f-4a55-9a39-0f8f6a0e8c11"}"#;

    fn frame(message_type: MessageType, payload: Vec<u8>) -> Vec<u8> {
        Envelope::new(1, String::from("node"), message_type, 1_700_000_000, payload).serialize()
    }

    fn signed_ack() -> Vec<u8> {
        let server = test_server_keypair();
        let ack = HandshakeAck {
            wallet_address: server.address().to_vec(),
            payload: b"server challenge".to_vec(),
            signature: server.sign_bytes(INIT_PAYLOAD).unwrap().to_vec(),
        };
        frame(MessageType::HandshakeAck, ack.encode_to_vec())
    }

    fn sent(transition: &Transition) -> Vec<(MessageType, Vec<u8>)> {
        transition
            .effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Send {
                    message_type,
                    payload,
                } => Some((*message_type, encode_payload(payload))),
                _ => None,
            })
            .collect()
    }

    fn resolved(transition: &Transition) -> Vec<Response> {
        transition
            .effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Resolve(response) => Some(response.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn handshake_ack_confirms_and_becomes_ready_test() {
        let keypair = test_keypair();
        let context = DispatchContext {
            keypair: &keypair,
            init_payload: Some(INIT_PAYLOAD),
            expected_server: Some(test_server_keypair().address()),
            timestamp: 0,
        };

        let transition = dispatch(SessionState::Handshaking, &context, &signed_ack());
        assert_eq!(transition.state, SessionState::Ready);

        let sends = sent(&transition);
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0].0, MessageType::HandshakeConfirm);
        let confirm = HandshakeConfirm::decode(sends[0].1.as_slice()).unwrap();
        assert_eq!(
            recover_address(&keccak256(b"server challenge"), &confirm.signature).unwrap(),
            keypair.address()
        );

        // same input, same output
        assert_eq!(
            dispatch(SessionState::Handshaking, &context, &signed_ack()),
            transition
        );
    }

    #[test]
    fn handshake_ack_from_wrong_node_is_rejected_test() {
        let keypair = test_keypair();
        let context = DispatchContext {
            keypair: &keypair,
            init_payload: Some(INIT_PAYLOAD),
            expected_server: Some(keypair.address()),
            timestamp: 0,
        };

        let transition = dispatch(SessionState::Handshaking, &context, &signed_ack());
        assert_eq!(transition.state, SessionState::Disconnected);
        assert!(sent(&transition).is_empty());
        assert!(transition
            .effects
            .iter()
            .any(|effect| matches!(effect, Effect::Close(_))));
    }

    #[test]
    fn handshake_ack_outside_handshake_is_ignored_test() {
        let keypair = test_keypair();
        let context = DispatchContext {
            keypair: &keypair,
            init_payload: None,
            expected_server: None,
            timestamp: 0,
        };
        let transition = dispatch(SessionState::Ready, &context, &signed_ack());
        assert_eq!(transition.state, SessionState::Ready);
        assert!(sent(&transition).is_empty());
    }

    #[test]
    fn responses_resolve_by_kind_test() {
        let keypair = test_keypair();
        let context = DispatchContext {
            keypair: &keypair,
            init_payload: None,
            expected_server: None,
            timestamp: 0,
        };

        let nonce = frame(
            MessageType::Nonce,
            BytesMessage::new(vec![0x05]).encode_to_vec(),
        );
        assert_eq!(
            resolved(&dispatch(SessionState::Ready, &context, &nonce)),
            vec![Response::Nonce(5)]
        );

        let balance = frame(
            MessageType::Balance,
            BytesMessage::new(vec![0x01, 0x00]).encode_to_vec(),
        );
        assert_eq!(
            resolved(&dispatch(SessionState::Ready, &context, &balance)),
            vec![Response::Balance(U256::from(256u64))]
        );

        let receipt = Receipt {
            status: 1,
            ..Receipt::default()
        };
        let receipt_frame = frame(MessageType::Receipt, receipt.encode_to_vec());
        // a receipt settles the transaction and nothing else
        assert_eq!(
            resolved(&dispatch(SessionState::Ready, &context, &receipt_frame)),
            vec![Response::Receipt(receipt)]
        );
    }

    #[test]
    fn tx_mined_requests_receipt_once_test() {
        let keypair = test_keypair();
        let context = DispatchContext {
            keypair: &keypair,
            init_payload: None,
            expected_server: None,
            timestamp: 0,
        };
        let mined = crate::networking::message_types::transaction::Transaction {
            nonce: 1,
            ..Default::default()
        }
        .encode_to_vec();
        // not a protobuf message at all, it still goes back as is
        let opaque = vec![0xff; 32];

        for payload in [mined, opaque] {
            let transition = dispatch(
                SessionState::Ready,
                &context,
                &frame(MessageType::TxMined, payload.clone()),
            );
            let sends = sent(&transition);
            assert_eq!(sends.len(), 1);
            assert_eq!(sends[0].0, MessageType::GetReceipt);
            assert_eq!(
                BytesMessage::decode(sends[0].1.as_slice()).unwrap().data,
                payload
            );
            assert!(resolved(&transition).is_empty());
        }
    }

    #[test]
    fn ping_is_answered_with_pong_test() {
        let keypair = test_keypair();
        let context = DispatchContext {
            keypair: &keypair,
            init_payload: None,
            expected_server: None,
            timestamp: 42,
        };
        let ping = crate::networking::message_types::ping_pong::Ping {
            node_id: String::from("node-1"),
            timestamp: 41,
        };
        let transition = dispatch(
            SessionState::Ready,
            &context,
            &frame(MessageType::Ping, ping.encode_to_vec()),
        );
        let sends = sent(&transition);
        assert_eq!(sends[0].0, MessageType::Pong);
        let pong = Pong::decode(sends[0].1.as_slice()).unwrap();
        assert_eq!(pong.node_id, keypair.checksum_address());
        assert_eq!(pong.timestamp, 42);
    }

    #[test]
    fn bad_frames_only_log_test() {
        let keypair = test_keypair();
        let context = DispatchContext {
            keypair: &keypair,
            init_payload: None,
            expected_server: None,
            timestamp: 0,
        };
        let garbage = [0x0a, 0x05, 0x01];
        let unknown = Envelope {
            header: Some(crate::networking::envelope::MessageHeader {
                message_type: String::from("mystery"),
                ..Default::default()
            }),
            payload: vec![],
        }
        .serialize();
        let malformed_balance = frame(MessageType::Balance, garbage.to_vec());
        let oversized_nonce = frame(
            MessageType::Nonce,
            BytesMessage::new(vec![0x01; 9]).encode_to_vec(),
        );

        for bytes in [
            garbage.to_vec(),
            unknown,
            malformed_balance,
            oversized_nonce,
        ] {
            let transition = dispatch(SessionState::Ready, &context, &bytes);
            assert_eq!(transition.state, SessionState::Ready);
            assert!(transition
                .effects
                .iter()
                .all(|effect| matches!(effect, Effect::Log(_, _))));
        }
    }
}
