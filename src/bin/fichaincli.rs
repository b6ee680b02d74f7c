/*!
# FiChain Command Line Wallet Interface

A binary for signing and sending requests to a FiChain node from the shell.

## Usage

```bash
fichaincli help [subcommand]
```

## Available subcommands

**address**

prints the wallet address of a private key

**sign**

signs a 32 byte hex digest

**nonce**, **balance**

asks the node for the wallet's nonce or balance

**transfer**

builds, signs and sends a transaction, then waits for its receipt

**call**

signs and runs a read-only smart contract call

## Example

```bash
fichaincli transfer --key 0x01.. --to 0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf --amount 1000
```

## Dev

To run from source:

```bash
cargo run --bin fichaincli -- balance --key 0x01.. --endpoint ws://localhost:9001/ws
```
*/
use bigint::U256;
use clap::{App, Arg, ArgMatches, SubCommand};
use fichain_client::{
    crypto::{keccak256, parse_address, FichainHash},
    networking::client::SessionClient,
    runtime::{load_keypair, READY_TIMEOUT},
    settings::ClientSettings,
    Error, Result,
};
use std::sync::Arc;

fn key_arg() -> Arg<'static, 'static> {
    Arg::with_name("key")
        .short("k")
        .long("key")
        .takes_value(true)
        .help("hex private key, defaults to private_key from the config")
}

fn endpoint_arg() -> Arg<'static, 'static> {
    Arg::with_name("endpoint")
        .short("e")
        .long("endpoint")
        .takes_value(true)
        .help("websocket endpoint of the node")
}

fn parse_u256(value: &str) -> Result<U256> {
    U256::from_dec_str(value)
        .map_err(|_| Error::InvalidArgument(format!("not a number: {}", value)))
}

fn parse_hex(value: &str) -> Result<Vec<u8>> {
    let trimmed = value.trim_start_matches("0x");
    hex::decode(trimmed)
        .map_err(|err| Error::InvalidArgument(format!("invalid hex {}: {}", value, err)))
}

async fn open_session(
    matches: &ArgMatches<'_>,
    settings: &ClientSettings,
) -> Result<SessionClient> {
    let mut settings = settings.clone();
    if let Some(endpoint) = matches.value_of("endpoint") {
        settings.endpoint = String::from(endpoint);
    }
    let key = matches
        .value_of("key")
        .map(String::from)
        .or_else(|| settings.private_key.clone());
    let keypair = Arc::new(load_keypair(key.as_deref())?);

    let client = SessionClient::new(settings, keypair);
    client.connect().await;
    client.wait_until_ready(READY_TIMEOUT).await?;
    Ok(client)
}

#[tokio::main]
pub async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let command_matches = App::new("FiChain Command Line Interface")
        .about("Interact with your wallet and a FiChain node through the command line")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .takes_value(true)
                .global(true)
                .help("config file name"),
        )
        .subcommand(
            SubCommand::with_name("address")
                .about("prints the wallet address")
                .arg(key_arg().required(true)),
        )
        .subcommand(
            SubCommand::with_name("sign")
                .about("signs a keccak256 digest, or the hash of --message")
                .arg(key_arg().required(true))
                .arg(
                    Arg::with_name("digest")
                        .short("d")
                        .long("digest")
                        .takes_value(true)
                        .required_unless("message")
                        .help("32 byte hex digest"),
                )
                .arg(
                    Arg::with_name("message")
                        .short("m")
                        .long("message")
                        .takes_value(true)
                        .help("text to hash and sign"),
                ),
        )
        .subcommand(
            SubCommand::with_name("nonce")
                .about("prints the wallet nonce")
                .arg(key_arg())
                .arg(endpoint_arg()),
        )
        .subcommand(
            SubCommand::with_name("balance")
                .about("prints the wallet balance")
                .arg(key_arg())
                .arg(endpoint_arg()),
        )
        .subcommand(
            SubCommand::with_name("transfer")
                .about("sends a transaction and waits for the receipt")
                .arg(key_arg())
                .arg(endpoint_arg())
                .arg(
                    Arg::with_name("to")
                        .short("t")
                        .long("to")
                        .takes_value(true)
                        .required(true)
                        .help("recipient address"),
                )
                .arg(
                    Arg::with_name("amount")
                        .short("a")
                        .long("amount")
                        .takes_value(true)
                        .required(true)
                        .help("amount to send, decimal"),
                )
                .arg(
                    Arg::with_name("data")
                        .long("data")
                        .takes_value(true)
                        .help("hex call data"),
                )
                .arg(
                    Arg::with_name("gas")
                        .long("gas")
                        .takes_value(true)
                        .default_value("1000000")
                        .help("gas limit"),
                )
                .arg(
                    Arg::with_name("gas_price")
                        .long("gas-price")
                        .takes_value(true)
                        .default_value("1")
                        .help("gas price, decimal"),
                )
                .arg(
                    Arg::with_name("message")
                        .short("m")
                        .long("message")
                        .takes_value(true)
                        .default_value("")
                        .help("free text attached to the transaction"),
                ),
        )
        .subcommand(
            SubCommand::with_name("call")
                .about("runs a read-only smart contract call")
                .arg(key_arg())
                .arg(endpoint_arg())
                .arg(
                    Arg::with_name("to")
                        .short("t")
                        .long("to")
                        .takes_value(true)
                        .required(true)
                        .help("contract address"),
                )
                .arg(
                    Arg::with_name("data")
                        .long("data")
                        .takes_value(true)
                        .required(true)
                        .help("hex call data"),
                ),
        )
        .get_matches();

    let settings = ClientSettings::load(command_matches.value_of("config"))?;

    if let Some(matches) = command_matches.subcommand_matches("address") {
        let keypair = load_keypair(matches.value_of("key"))?;
        println!("address : {}", keypair.checksum_address());
    }
    if let Some(matches) = command_matches.subcommand_matches("sign") {
        let keypair = load_keypair(matches.value_of("key"))?;
        let digest: FichainHash = match matches.value_of("message") {
            Some(message) => keccak256(message.as_bytes()),
            None => {
                let bytes = parse_hex(matches.value_of("digest").unwrap_or_default())?;
                if bytes.len() != 32 {
                    return Err(Error::InvalidArgument(String::from(
                        "digest must be 32 bytes",
                    )));
                }
                let mut digest = [0u8; 32];
                digest.copy_from_slice(&bytes);
                digest
            }
        };
        println!("signature : 0x{}", hex::encode(keypair.sign_digest(&digest)?));
    }
    if let Some(matches) = command_matches.subcommand_matches("nonce") {
        let client = open_session(matches, &settings).await?;
        println!("nonce : {}", client.get_nonce().await?);
        client.disconnect().await;
    }
    if let Some(matches) = command_matches.subcommand_matches("balance") {
        let client = open_session(matches, &settings).await?;
        println!("balance : {}", client.get_balance().await?);
        client.disconnect().await;
    }
    if let Some(matches) = command_matches.subcommand_matches("transfer") {
        let to_address = parse_address(matches.value_of("to").unwrap_or_default())?;
        let amount = parse_u256(matches.value_of("amount").unwrap_or_default())?;
        let data = match matches.value_of("data") {
            Some(data) => parse_hex(data)?,
            None => vec![],
        };
        let gas: u64 = matches
            .value_of("gas")
            .unwrap_or_default()
            .parse()
            .map_err(|_| Error::InvalidArgument(String::from("gas must be an integer")))?;
        let gas_price = parse_u256(matches.value_of("gas_price").unwrap_or_default())?;
        let message = String::from(matches.value_of("message").unwrap_or_default());

        let client = open_session(matches, &settings).await?;
        let receipt = client
            .transfer(to_address, amount, data, gas, gas_price, message)
            .await?;
        println!("tx hash  : 0x{}", hex::encode(&receipt.tx_hash));
        println!("block    : {}", receipt.block_number);
        println!("gas used : {}", receipt.gas_used);
        let status = if receipt.is_success() {
            "success"
        } else {
            "failed"
        };
        println!("status   : {}", status);
        client.disconnect().await;
    }
    if let Some(matches) = command_matches.subcommand_matches("call") {
        let to_address = parse_address(matches.value_of("to").unwrap_or_default())?;
        let data = parse_hex(matches.value_of("data").unwrap_or_default())?;

        let client = open_session(matches, &settings).await?;
        let response = client.call(to_address, data).await?;
        println!("result : 0x{}", hex::encode(&response.data));
        client.disconnect().await;
    }
    Ok(())
}
