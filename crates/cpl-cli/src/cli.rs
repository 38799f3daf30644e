use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cpl",
    about = "Compliance Proof Ledger: proof of existence for file digests",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Node to talk to
    #[arg(long, global = true, default_value = "http://127.0.0.1:9933")]
    pub node: String,

    /// Key file (defaults to ~/.cpl/key.toml)
    #[arg(long, global = true)]
    pub key: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage the signing key
    Key(KeyArgs),
    /// Digest a file without touching the network
    Hash(HashArgs),
    /// Look up the compliance record for a file
    Inspect(InspectArgs),
    /// Claim a file's digest for your account
    Create(CreateArgs),
    /// Revoke your claim on a file's digest
    Revoke(RevokeArgs),
    /// Stream record changes for a file
    Watch(WatchArgs),
    /// Run a ledger node
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct KeyArgs {
    #[command(subcommand)]
    pub action: KeyAction,
}

#[derive(Subcommand)]
pub enum KeyAction {
    /// Generate a new keypair
    New {
        #[arg(long)]
        force: bool,
    },
    /// Show the account behind the current key
    Show,
}

#[derive(Args)]
pub struct HashArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct InspectArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct CreateArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct RevokeArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct WatchArgs {
    pub file: PathBuf,
    /// Stop after this many updates
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<String>,
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hash() {
        let cli = Cli::try_parse_from(["cpl", "hash", "report.pdf"]).unwrap();
        if let Command::Hash(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("report.pdf"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_key_new_force() {
        let cli = Cli::try_parse_from(["cpl", "key", "new", "--force"]).unwrap();
        if let Command::Key(args) = cli.command {
            assert!(matches!(args.action, KeyAction::New { force: true }));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_key_show() {
        let cli = Cli::try_parse_from(["cpl", "key", "show"]).unwrap();
        if let Command::Key(args) = cli.command {
            assert!(matches!(args.action, KeyAction::Show));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_create_with_node() {
        let cli =
            Cli::try_parse_from(["cpl", "create", "a.bin", "--node", "http://10.0.0.1:9933"])
                .unwrap();
        assert_eq!(cli.node, "http://10.0.0.1:9933");
        assert!(matches!(cli.command, Command::Create(_)));
    }

    #[test]
    fn node_defaults_to_localhost() {
        let cli = Cli::try_parse_from(["cpl", "inspect", "a.bin"]).unwrap();
        assert_eq!(cli.node, "http://127.0.0.1:9933");
    }

    #[test]
    fn parse_revoke_with_key() {
        let cli =
            Cli::try_parse_from(["cpl", "revoke", "a.bin", "--key", "/tmp/key.toml"]).unwrap();
        assert_eq!(cli.key, Some(PathBuf::from("/tmp/key.toml")));
    }

    #[test]
    fn parse_watch_count() {
        let cli = Cli::try_parse_from(["cpl", "watch", "a.bin", "-n", "3"]).unwrap();
        if let Command::Watch(args) = cli.command {
            assert_eq!(args.count, Some(3));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_watch_unbounded() {
        let cli = Cli::try_parse_from(["cpl", "watch", "a.bin"]).unwrap();
        if let Command::Watch(args) = cli.command {
            assert_eq!(args.count, None);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_serve_bind() {
        let cli = Cli::try_parse_from(["cpl", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind, Some("0.0.0.0:8080".into()));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["cpl", "--format", "json", "hash", "a.bin"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["cpl", "--verbose", "hash", "a.bin"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn missing_file_argument_is_an_error() {
        assert!(Cli::try_parse_from(["cpl", "create"]).is_err());
    }
}
