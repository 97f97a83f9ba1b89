use anyhow::Context;
use clap::{Parser, Subcommand};
use dispatch::{DecodeLayer, DispatchService, ElevatorSystem, load_config, parse_trace, verify};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tower::{Service, ServiceBuilder, ServiceExt};

const UDP_MAX_SIZE: usize = 65535;

#[derive(Debug, Parser)]
#[command(name = "dispatch", about = "Call dispatcher for a bank of elevators")]
struct Cli {
    /// Building configuration (elevators, floors, grace period).
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay a recorded request trace and print the state after every request.
    Replay {
        trace: PathBuf,
        /// Expected output; the replay fails if it differs.
        #[arg(long)]
        expect: Option<PathBuf>,
    },
    /// Take JSON requests over UDP and answer each with the resulting state.
    Serve {
        /// Overrides `service.listen` from the configuration.
        #[arg(long)]
        listen: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let system = ElevatorSystem::from_config(&config.system);
    log::info!(
        "{} elevators, floors 1..={}, wait {}s",
        config.system.elevators,
        config.system.floors,
        config.system.wait_secs
    );

    match cli.command {
        Command::Replay { trace, expect } => replay(system, trace, expect).await,
        Command::Serve { listen } => {
            let address = listen.unwrap_or(config.service.listen);
            serve(system, &address).await
        }
    }
}

async fn replay(
    mut system: ElevatorSystem,
    trace: PathBuf,
    expect: Option<PathBuf>,
) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(&trace)
        .await
        .with_context(|| format!("failed to read {}", trace.display()))?;
    let requests = parse_trace(&raw).with_context(|| format!("bad trace {}", trace.display()))?;

    let rendered = dispatch::replay(&mut system, requests);
    print!("{rendered}");

    if let Some(expect) = expect {
        let expected = tokio::fs::read_to_string(&expect)
            .await
            .with_context(|| format!("failed to read {}", expect.display()))?;
        verify(&rendered, &expected)
            .with_context(|| format!("replay output differs from {}", expect.display()))?;
        log::info!("replay matches {}", expect.display());
    }
    Ok(())
}

async fn serve(system: ElevatorSystem, address: &str) -> anyhow::Result<()> {
    let socket = Arc::new(
        UdpSocket::bind(address)
            .await
            .with_context(|| format!("failed to bind {address}"))?,
    );
    log::info!("Listening on {address}");

    let mut svc = ServiceBuilder::new()
        .layer(DecodeLayer)
        .service(DispatchService::new(system));
    let mut buf = vec![0u8; UDP_MAX_SIZE];

    loop {
        let (len, addr) = socket.recv_from(&mut buf).await?;
        log::debug!("Got udp packet from {addr}");

        let raw = &buf[..len];
        svc.ready().await?;
        let reply = match svc.call(raw).await {
            Ok(snapshot) => serde_json::to_vec(&snapshot)?,
            Err(e) => serde_json::to_vec(&serde_json::json!({ "error": format!("{e:#}") }))?,
        };
        socket.send_to(&reply, addr).await?;
    }
}
