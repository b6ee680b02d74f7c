/*!
# Welcome to the FiChain Client

A wallet-side session layer for FiChain nodes. One persistent binary websocket
carries a signed handshake and then any number of typed request/response
exchanges, each of which surfaces as an `async fn` returning
`fichain_client::Result`.

# Usage

```no_run
use fichain_client::{keypair::Keypair, networking::client::SessionClient, settings::ClientSettings};
use std::{sync::Arc, time::Duration};

# async fn example() -> fichain_client::Result<()> {
let settings = ClientSettings::load(None)?;
let client = SessionClient::new(settings, Arc::new(Keypair::new()));
client.connect().await;
client.wait_until_ready(Duration::from_secs(10)).await?;
println!("nonce {}", client.get_nonce().await?);
# Ok(())
# }
```

See the `networking` module for the wire protocol.
*/
pub mod crypto;
pub mod error;
pub mod keypair;
pub mod networking;
pub mod runtime;
pub mod settings;
pub mod time;

#[cfg(test)]
pub mod test_utilities;

pub use error::{Error, Result};
