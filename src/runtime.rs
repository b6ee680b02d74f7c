use crate::error::Result;
use crate::keypair::Keypair;
use crate::networking::client::SessionClient;
use crate::networking::signals::signal_for_shutdown;
use crate::settings::ClientSettings;
use clap::{App, Arg};
use std::sync::Arc;
use std::time::Duration;
use tracing::{event, Level};

pub const READY_TIMEOUT: Duration = Duration::from_secs(10);

/// Load the wallet key from `key`, or generate a throwaway one.
pub fn load_keypair(key: Option<&str>) -> Result<Keypair> {
    match key {
        Some(key) => Keypair::from_secret_hex(key),
        None => {
            let keypair = Keypair::new();
            event!(
                Level::WARN,
                "no private key configured, using ephemeral wallet {}",
                keypair.checksum_address()
            );
            Ok(keypair)
        }
    }
}

pub async fn run() -> Result<()> {
    //
    // handle command-line arguments
    //
    let matches = App::new("FiChain Client")
        .about("Opens a session with a FiChain node and reports the wallet state")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .takes_value(true)
                .help("config file name"),
        )
        .arg(
            Arg::with_name("endpoint")
                .short("e")
                .long("endpoint")
                .takes_value(true)
                .help("websocket endpoint of the node, overrides the config"),
        )
        .get_matches();

    let mut settings = ClientSettings::load(matches.value_of("config"))?;
    if let Some(endpoint) = matches.value_of("endpoint") {
        settings.endpoint = String::from(endpoint);
    }
    let keypair = Arc::new(load_keypair(settings.private_key.as_deref())?);
    event!(Level::INFO, "wallet {}", keypair.checksum_address());

    //
    // open the session
    //
    let client = SessionClient::new(settings, keypair);
    client.connect().await;
    if let Err(err) = client.wait_until_ready(READY_TIMEOUT).await {
        for entry in client.logs().await.iter().rev() {
            println!("{}", entry);
        }
        return Err(err);
    }

    match client.get_nonce().await {
        Ok(nonce) => println!("nonce   : {}", nonce),
        Err(err) => event!(Level::ERROR, "{}", err),
    }
    match client.get_balance().await {
        Ok(balance) => println!("balance : {}", balance),
        Err(err) => event!(Level::ERROR, "{}", err),
    }

    //
    // keep the session open until asked to stop
    //
    tokio::select! {
        res = signal_for_shutdown() => {
            if let Err(err) = res {
                event!(Level::ERROR, "{}", err);
            }
        },
        _ = wait_for_disconnect(&client) => {
            event!(Level::WARN, "node closed the session");
        },
    }
    client.disconnect().await;
    Ok(())
}

async fn wait_for_disconnect(client: &SessionClient) {
    let mut state_receiver = client.subscribe().await;
    while client.is_connected().await {
        if state_receiver.changed().await.is_err() {
            return;
        }
    }
}
