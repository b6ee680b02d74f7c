use crate::error::{Error, Result};
use crate::networking::message_type::MessageType;
use crate::networking::message_types::{call_data::CallSmartContractResponse, receipt::Receipt};
use bigint::U256;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::sync::oneshot;

pub const SHORT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const LONG_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The node answers by message type only, so at most one request per kind
/// can be outstanding at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Nonce,
    Balance,
    Transaction,
    SmartContractCall,
}

/// What `register` does when a request of the same kind is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InFlightPolicy {
    /// Refuse the new request, the old one keeps waiting.
    Reject,
    /// Fail the old waiter with `Superseded` and take its slot.
    Supersede,
}

impl RequestKind {
    pub fn timeout(&self) -> Duration {
        match self {
            RequestKind::Nonce | RequestKind::Balance => SHORT_REQUEST_TIMEOUT,
            RequestKind::Transaction | RequestKind::SmartContractCall => LONG_REQUEST_TIMEOUT,
        }
    }

    pub fn in_flight_policy(&self) -> InFlightPolicy {
        match self {
            // a newer balance is always at least as useful as an older one
            RequestKind::Balance => InFlightPolicy::Supersede,
            _ => InFlightPolicy::Reject,
        }
    }

    /// The message type the request goes out as.
    pub fn request_type(&self) -> MessageType {
        match self {
            RequestKind::Nonce => MessageType::GetNonce,
            RequestKind::Balance => MessageType::GetBalance,
            RequestKind::Transaction => MessageType::SendTransaction,
            RequestKind::SmartContractCall => MessageType::CallSmartContract,
        }
    }

    /// The message type that settles the request.
    pub fn response_type(&self) -> MessageType {
        match self {
            RequestKind::Nonce => MessageType::Nonce,
            RequestKind::Balance => MessageType::Balance,
            RequestKind::Transaction => MessageType::Receipt,
            RequestKind::SmartContractCall => MessageType::CallResult,
        }
    }

    /// The request kind an inbound message type settles, if any.
    pub fn for_response(message_type: MessageType) -> Option<RequestKind> {
        match message_type {
            MessageType::Nonce => Some(RequestKind::Nonce),
            MessageType::Balance => Some(RequestKind::Balance),
            MessageType::Receipt => Some(RequestKind::Transaction),
            MessageType::CallResult => Some(RequestKind::SmartContractCall),
            _ => None,
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestKind::Nonce => "nonce",
            RequestKind::Balance => "balance",
            RequestKind::Transaction => "transaction",
            RequestKind::SmartContractCall => "smart contract call",
        };
        f.write_str(name)
    }
}

/// A decoded answer, ready to hand to the waiting caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Nonce(u64),
    Balance(U256),
    Receipt(Receipt),
    CallResult(CallSmartContractResponse),
}

impl Response {
    pub fn kind(&self) -> RequestKind {
        match self {
            Response::Nonce(_) => RequestKind::Nonce,
            Response::Balance(_) => RequestKind::Balance,
            Response::Receipt(_) => RequestKind::Transaction,
            Response::CallResult(_) => RequestKind::SmartContractCall,
        }
    }
}

pub type ResponseSender = oneshot::Sender<Result<Response>>;
pub type ResponseReceiver = oneshot::Receiver<Result<Response>>;

#[derive(Debug)]
pub struct PendingRequest {
    request_id: u64,
    sender: ResponseSender,
}

impl PendingRequest {
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    fn settle(self, result: Result<Response>) {
        // the caller may have given up already, nothing left to notify
        let _ = self.sender.send(result);
    }
}

/// One slot per `RequestKind`. Each slot carries a request id so a stale
/// timeout can never clear a newer request's slot.
#[derive(Debug, Default)]
pub struct Correlator {
    pending: HashMap<RequestKind, PendingRequest>,
    request_count: u64,
}

impl Correlator {
    pub fn new() -> Self {
        Correlator::default()
    }

    /// Claim the slot for `kind`, applying its in-flight policy.
    pub fn register(&mut self, kind: RequestKind) -> Result<(u64, ResponseReceiver)> {
        if self.pending.contains_key(&kind) {
            match kind.in_flight_policy() {
                InFlightPolicy::Reject => return Err(Error::RequestInFlight(kind)),
                InFlightPolicy::Supersede => {
                    if let Some(previous) = self.pending.remove(&kind) {
                        previous.settle(Err(Error::Superseded(kind)));
                    }
                }
            }
        }

        self.request_count += 1;
        let request_id = self.request_count;
        let (sender, receiver) = oneshot::channel();
        self.pending.insert(kind, PendingRequest { request_id, sender });
        Ok((request_id, receiver))
    }

    pub fn is_pending(&self, kind: RequestKind) -> bool {
        self.pending.contains_key(&kind)
    }

    pub fn pending_request_id(&self, kind: RequestKind) -> Option<u64> {
        self.pending.get(&kind).map(PendingRequest::request_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Hand `response` to the waiter of its kind. Returns false when nobody
    /// was waiting.
    pub fn resolve(&mut self, response: Response) -> bool {
        match self.pending.remove(&response.kind()) {
            Some(pending) => {
                pending.settle(Ok(response));
                true
            }
            None => false,
        }
    }

    pub fn reject(&mut self, kind: RequestKind, error: Error) -> bool {
        match self.pending.remove(&kind) {
            Some(pending) => {
                pending.settle(Err(error));
                true
            }
            None => false,
        }
    }

    /// Fail the slot for `kind` with `Error::Timeout` if it still belongs to
    /// `request_id`.
    pub fn expire(&mut self, kind: RequestKind, request_id: u64) -> bool {
        if self.pending_request_id(kind) != Some(request_id) {
            return false;
        }
        self.reject(
            kind,
            Error::Timeout {
                kind,
                after: kind.timeout(),
            },
        )
    }

    /// Fail every waiter with `ConnectionLost`.
    pub fn reject_all(&mut self) -> usize {
        let count = self.pending.len();
        for (_, pending) in self.pending.drain() {
            pending.settle(Err(Error::ConnectionLost));
        }
        count
    }
}
