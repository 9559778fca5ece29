use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use log::info;
use xs_core::{SignConfig, DEFAULT_APP_ID};
use xs_encode::open_x3;
use xs_host::target::request_target;
use xs_host::{HostSigner, SessionMode};

#[derive(Parser)]
#[command(about = "Builds request-signing payloads and x3 strings")]
struct Cli {
    /// Request URI or full URL (query string allowed).
    #[arg(long, required_unless_present = "open")] uri: Option<String>,
    /// JSON body appended to the URI before hashing.
    #[arg(long)] body: Option<String>,
    /// The a1 cookie value.
    #[arg(long, required_unless_present = "open")] a1: Option<String>,
    #[arg(long, default_value = DEFAULT_APP_ID)] app_id: String,
    /// Sequential requests signed within one session.
    #[arg(long, default_value_t = 1)] requests: u32,
    /// Draw fresh values per request instead of simulating a page session.
    #[arg(long)] no_session: bool,
    /// Deterministic ChaCha20 seed.
    #[arg(long)] seed: Option<u64>,
    /// Decode an existing x3 string back to payload hex instead of signing.
    #[arg(long, conflicts_with_all = ["uri", "a1"])] open: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if let Some(x3) = cli.open.as_deref() {
        let payload = open_x3(x3).map_err(|e| anyhow::anyhow!("bad x3: {}", e))?;
        println!("{} {}", "payload".dimmed(), hex::encode(payload));
        return Ok(());
    }

    let raw_uri = cli.uri.as_deref().context("--uri is required")?;
    let a1 = cli.a1.as_deref().context("--a1 is required")?;

    // Full URLs are reduced to path + query; bare URIs are signed verbatim
    let uri = if raw_uri.contains("://") {
        request_target(raw_uri).map_err(|e| anyhow::anyhow!("bad --uri {}: {}", raw_uri, e))?
    } else {
        raw_uri.to_string()
    };

    let mode = if cli.no_session { SessionMode::Stateless } else { SessionMode::Simulated };
    let mut signer = HostSigner::new(SignConfig::default(), mode, cli.seed)?;
    signer.set_app_id(&cli.app_id);

    info!("Signing {} x{} (mode={:?})", uri, cli.requests, mode);

    for i in 0..cli.requests {
        let signed = signer.sign(&uri, cli.body.as_deref(), a1)?;
        println!("{} {}", format!("[{}]", i + 1).bold(), uri.cyan());
        println!("  {} {}", "payload".dimmed(), hex::encode(signed.payload.as_bytes()));
        println!("  {} {}", "x3".green(), signed.x3);
    }
    Ok(())
}
