use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use tracing::debug;

use cpl_client::{submit_with_status, HttpTransport, LedgerTransport, STATUS_SENDING};
use cpl_crypto::{KeyFile, Keypair};
use cpl_ledger::ComplianceCall;
use cpl_node::{Node, NodeConfig};
use cpl_types::FileDigest;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        command,
        format,
        node,
        key,
        ..
    } = cli;
    match command {
        Command::Key(args) => cmd_key(args, key, &format),
        Command::Hash(args) => cmd_hash(args, &format),
        Command::Inspect(args) => cmd_inspect(args, &node, &format).await,
        Command::Create(args) => cmd_create(args, &node, key, &format).await,
        Command::Revoke(args) => cmd_revoke(args, &node, key, &format).await,
        Command::Watch(args) => cmd_watch(args, &node, &format).await,
        Command::Serve(args) => cmd_serve(args).await,
    }
}

fn key_path(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let home = std::env::var_os("HOME").context("HOME is not set; pass --key")?;
    Ok(PathBuf::from(home).join(".cpl").join("key.toml"))
}

fn load_key(explicit: Option<PathBuf>) -> anyhow::Result<Keypair> {
    let path = key_path(explicit)?;
    let keypair = cpl_crypto::load_keypair(&path)
        .with_context(|| format!("failed to load key from {}", path.display()))?;
    debug!(account = %keypair.account_id().short_id(), "loaded signing key");
    Ok(keypair)
}

fn digest_file(path: &Path) -> anyhow::Result<FileDigest> {
    let content =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(FileDigest::of_content(&content))
}

fn is_json(format: &OutputFormat) -> bool {
    matches!(format, OutputFormat::Json)
}

fn cmd_key(args: KeyArgs, key: Option<PathBuf>, format: &OutputFormat) -> anyhow::Result<()> {
    let path = key_path(key)?;
    match args.action {
        KeyAction::New { force } => {
            if path.exists() && !force {
                bail!(
                    "key already exists at {}; pass --force to replace it",
                    path.display()
                );
            }
            let keypair = Keypair::generate();
            KeyFile::from_keypair(&keypair).save(&path)?;
            let account = keypair.account_id();
            if is_json(format) {
                println!(
                    "{}",
                    serde_json::json!({
                        "path": path.display().to_string(),
                        "account": account.to_hex(),
                    })
                );
            } else {
                println!(
                    "{} New key saved to {}",
                    "✓".green().bold(),
                    path.display().to_string().bold()
                );
                println!("  Account: {}", account.short_id().yellow());
            }
        }
        KeyAction::Show => {
            let keypair = cpl_crypto::load_keypair(&path)
                .with_context(|| format!("failed to load key from {}", path.display()))?;
            let account = keypair.account_id();
            if is_json(format) {
                println!(
                    "{}",
                    serde_json::json!({
                        "path": path.display().to_string(),
                        "account": account.to_hex(),
                        "public_key": keypair.verifying_key().to_hex(),
                    })
                );
            } else {
                println!("Account: {}", account.short_id().yellow().bold());
                println!("  Id: {}", account.to_hex());
                println!("  Public key: {}", keypair.verifying_key().to_hex().dimmed());
            }
        }
    }
    Ok(())
}

fn cmd_hash(args: HashArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let digest = digest_file(&args.file)?;
    if is_json(format) {
        println!(
            "{}",
            serde_json::json!({
                "file": args.file.display().to_string(),
                "digest": digest.to_hex(),
            })
        );
    } else {
        println!("{digest}");
    }
    Ok(())
}

async fn cmd_inspect(args: InspectArgs, node: &str, format: &OutputFormat) -> anyhow::Result<()> {
    let digest = digest_file(&args.file)?;
    let transport = HttpTransport::new(node)?;
    let record = transport.query_proof(&digest).await?;
    if is_json(format) {
        println!(
            "{}",
            serde_json::json!({
                "digest": digest.to_hex(),
                "active": record.is_active(),
                "owner": record.owner.to_hex(),
                "block": record.block,
            })
        );
    } else {
        println!("Digest: {}", digest.to_string().bold());
        if record.is_active() {
            println!(
                "{} complianced by {} at block {}",
                "✓".green().bold(),
                record.owner.short_id().yellow(),
                record.block.to_string().bold()
            );
        } else {
            println!("Not complianced.");
        }
    }
    Ok(())
}

async fn cmd_create(
    args: CreateArgs,
    node: &str,
    key: Option<PathBuf>,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let keypair = load_key(key)?;
    let digest = digest_file(&args.file)?;
    let transport = HttpTransport::new(node)?;

    let record = transport.query_proof(&digest).await?;
    if record.is_active() {
        bail!(
            "digest is already complianced by {}",
            record.owner.short_id()
        );
    }

    let receipt = submit_with_status(
        &transport,
        &keypair,
        ComplianceCall::CreateCompliance(digest),
        |line| {
            if line == STATUS_SENDING && !is_json(format) {
                println!("  {}", line.dimmed());
            }
        },
    )
    .await?;

    if is_json(format) {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
    } else {
        println!("{} Compliance created", "✓".green().bold());
        println!("  Digest: {}", digest.to_string().bold());
        println!("  Block: {}", receipt.block.to_string().yellow());
        println!("  Tx: {}", receipt.tx_hash.dimmed());
    }
    Ok(())
}

async fn cmd_revoke(
    args: RevokeArgs,
    node: &str,
    key: Option<PathBuf>,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let keypair = load_key(key)?;
    let digest = digest_file(&args.file)?;
    let transport = HttpTransport::new(node)?;

    let record = transport.query_proof(&digest).await?;
    if !record.is_active() {
        bail!("no active compliance record for this digest");
    }
    if record.owner != keypair.account_id() {
        bail!(
            "record is owned by another account ({})",
            record.owner.short_id()
        );
    }

    let receipt = submit_with_status(
        &transport,
        &keypair,
        ComplianceCall::RevokeCompliance(digest),
        |line| {
            if line == STATUS_SENDING && !is_json(format) {
                println!("  {}", line.dimmed());
            }
        },
    )
    .await?;

    if is_json(format) {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
    } else {
        println!("{} Compliance revoked", "✓".green().bold());
        println!("  Digest: {}", digest.to_string().bold());
        println!("  Block: {}", receipt.block.to_string().yellow());
        println!("  Tx: {}", receipt.tx_hash.dimmed());
    }
    Ok(())
}

async fn cmd_watch(args: WatchArgs, node: &str, format: &OutputFormat) -> anyhow::Result<()> {
    let digest = digest_file(&args.file)?;
    let transport = HttpTransport::new(node)?;
    let mut events = transport.subscribe(&digest).await?;
    if !is_json(format) {
        println!("Watching {}", digest.to_string().bold());
    }

    let mut seen = 0usize;
    while let Some(update) = events.recv().await {
        if is_json(format) {
            println!("{}", serde_json::to_string(&update)?);
        } else if update.record.is_active() {
            println!(
                "{} complianced by {} at block {}",
                "✓".green(),
                update.record.owner.short_id().yellow(),
                update.record.block
            );
        } else {
            println!("  vacant");
        }
        seen += 1;
        if args.count.is_some_and(|count| seen >= count) {
            break;
        }
    }
    Ok(())
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match args.config {
        Some(path) => NodeConfig::load(&path)?,
        None => NodeConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind.parse().context("invalid bind address")?;
    }
    println!("cpl node on {}", config.bind_addr.to_string().bold());
    Node::new(config).serve().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_file_matches_in_memory_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"cli bytes").unwrap();
        assert_eq!(
            digest_file(&path).unwrap(),
            FileDigest::of_content(b"cli bytes")
        );
    }

    #[test]
    fn digest_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = digest_file(&dir.path().join("absent")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn key_path_prefers_explicit() {
        let path = key_path(Some(PathBuf::from("/tmp/k.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/k.toml"));
    }

    #[test]
    fn key_path_defaults_under_home() {
        if std::env::var_os("HOME").is_some() {
            let path = key_path(None).unwrap();
            assert!(path.ends_with(".cpl/key.toml"));
        }
    }
}
