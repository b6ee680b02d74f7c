/*!

# Networking Interfaces and Methods

## Introduction

A client talks to a FiChain node over a single websocket. Every binary frame
carries exactly one protobuf `Envelope`; text frames are not used.

## Envelope

```text
Envelope {
    header: MessageHeader {
        version       uint32   protocol version from the settings
        sender_id     string   EIP-55 address of the sending wallet
        message_type  string   see below
        timestamp     int64    unix seconds
        signature     bytes    always empty
    }
    payload: bytes             schema selected by message_type
}
```

The header is not signed per frame. The node authenticates the wallet once,
during the handshake, and trusts the socket afterwards.

## Handshake

```text
client                                   node
  | handshake_init {address, payload} ---> |   payload = {"time":<secs>,"uuid":"<v4>"}
  | <--- handshake_ack {address, payload, signature}
  | handshake_confirm {signature} -------> |   signature over keccak256(ack.payload)
```

The node signs `keccak256(init.payload)` in the ack, so the client can recover
the node's address and, when `server_address` is configured, refuse to talk to
anyone else. The node sends nothing back for a valid confirm: the session is
`Ready` as soon as the confirm is queued.

## Requests

| request               | payload                 | answer        | deadline |
|-----------------------|-------------------------|---------------|----------|
| `get_nonce`           | `BytesMessage{address}` | `nonce`       | 10 s     |
| `get_balance`         | empty                   | `balance`     | 10 s     |
| `send_transaction`    | `Transaction`           | `receipt`     | 30 s     |
| `call_smart_contract` | `CallSmartContractData` | `call_result` | 30 s     |

Answers carry no request id, they are matched by message type. For that reason
only one request of each kind is outstanding at a time; see `correlator`.

A transaction is answered in two steps. The node first broadcasts `tx_mined`
with the mined transaction; the client replies `get_receipt` with the same
bytes and the node answers `receipt`.

## Other messages

`ping` is answered with `pong`. `peer_list`, `validator`, `head_block`,
`block`, `receipts` and `chain_event` are accepted and logged but not
interpreted.
*/
pub mod client;
pub mod codec;
pub mod correlator;
pub mod dispatch;
pub mod envelope;
pub mod message_type;
pub mod message_types;
pub mod session;
pub mod session_log;
pub mod signals;
pub mod socket;
