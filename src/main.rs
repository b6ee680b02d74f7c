/*!
# FiChain Client

Connects to a FiChain node, completes the wallet handshake and prints the
wallet's nonce and balance, then keeps the session open until interrupted.

## Example Usage

```bash
fichain_client --config fichain --endpoint ws://localhost:9001/ws
```

The private key is read from `private_key` in the config file or the
`FICHAIN_PRIVATE_KEY` environment variable. Without one an ephemeral wallet
is generated.

## Dev

To run from source:

```bash
cargo run -- --endpoint ws://localhost:9001/ws
```
*/

use fichain_client::runtime;

#[tokio::main]
pub async fn main() -> fichain_client::Result<()> {
    tracing_subscriber::fmt::init();
    runtime::run().await
}
