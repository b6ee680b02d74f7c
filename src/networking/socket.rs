use crate::error::{Error, Result};
use crate::networking::session::{OutboundSender, Session};
use futures::{future, FutureExt, Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_tungstenite::{connect_async, tungstenite, tungstenite::Message};
use tracing::{event, Level};

/// Open a binary websocket to `endpoint`.
///
/// Returns the channel that feeds the socket and the stream of inbound binary
/// frames. A writer task owns the sink; it sends a close frame and exits once
/// every clone of the returned sender is dropped. Text, ping and pong frames
/// are not part of the protocol and are skipped.
pub async fn open_websocket(
    endpoint: &str,
) -> Result<(
    OutboundSender,
    impl Stream<Item = Result<Vec<u8>>> + Send + Unpin + 'static,
)> {
    let url = url::Url::parse(endpoint).map_err(|err| Error::Transport(err.to_string()))?;
    let (ws_stream, _) = connect_async(url).await?;
    let (write_sink, read_stream) = ws_stream.split();

    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<Vec<u8>>();
    let outbound_receiver = UnboundedReceiverStream::new(outbound_receiver)
        .map(|bytes| Ok::<Message, tungstenite::Error>(Message::binary(bytes)));
    tokio::task::spawn(outbound_receiver.forward(write_sink).map(|result| {
        if let Err(err) = result {
            event!(Level::ERROR, "error sending websocket msg: {}", err);
        }
    }));

    let inbound = read_stream.filter_map(|message| {
        future::ready(match message {
            Ok(Message::Binary(bytes)) => Some(Ok(bytes)),
            Ok(_) => None,
            Err(err) => Some(Err(Error::WebSocket(err))),
        })
    });
    Ok((outbound_sender, inbound))
}

/// Feed inbound frames to the session in delivery order until the stream ends
/// or fails, then report the close.
pub async fn read_frames<S>(session_lock: Arc<RwLock<Session>>, connection_id: u64, mut inbound: S)
where
    S: Stream<Item = Result<Vec<u8>>> + Unpin,
{
    while let Some(result) = inbound.next().await {
        match result {
            Ok(bytes) => {
                let mut session = session_lock.write().await;
                session.handle_frame(connection_id, &bytes);
            }
            Err(err) => {
                event!(Level::ERROR, "error receiving ws message: {}", err);
                break;
            }
        }
    }
    session_lock.write().await.on_close(connection_id);
}
