use crate::config::toml_config::ClientConfig;
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "elevator-client")]
#[command(about = "Command-line client for the elevator maintenance backend")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "elevator-client.toml", global = true)]
    pub config: String,

    /// Override api.base_url
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Override auth.token_dir
    #[arg(long, global = true)]
    pub token_dir: Option<String>,

    /// Output format: table, csv or json
    #[arg(long, global = true)]
    pub format: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// 載入設定檔並套用命令列覆蓋
    pub fn resolve(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::load_or_default(&self.config)?;
        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(dir) = &self.token_dir {
            config.auth.token_dir = dir.clone();
        }
        if let Some(format) = &self.format {
            config.output.format = format.clone();
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Log in and store the access token
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored tokens
    Logout,
    /// Show the logged-in user and token lifetime
    Whoami,
    /// Asansörler
    Elevators {
        #[command(subcommand)]
        action: ElevatorCommand,
    },
    /// Bakımlar
    Maintenances {
        #[command(subcommand)]
        action: MaintenanceCommand,
    },
    /// Denetimler
    Inspections {
        #[command(subcommand)]
        action: RecordCommand,
    },
    /// Arızalar
    Faults {
        #[command(subcommand)]
        action: FaultCommand,
    },
    /// Parçalar
    Parts {
        #[command(subcommand)]
        action: RecordCommand,
    },
    /// Ödemeler
    Payments {
        #[command(subcommand)]
        action: RecordCommand,
    },
    /// Teklifler
    Offers {
        #[command(subcommand)]
        action: OfferCommand,
    },
    /// QR session utilities
    Qr {
        #[command(subcommand)]
        action: QrCommand,
    },
    /// On-site maintenance executions
    Executions {
        #[command(subcommand)]
        action: ExecutionCommand,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub elevator: Option<i64>,
    /// Start date (YYYY-MM-DD or DD.MM.YYYY)
    #[arg(long)]
    pub from: Option<String>,
    /// End date (YYYY-MM-DD or DD.MM.YYYY)
    #[arg(long)]
    pub to: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum RecordCommand {
    List(ListArgs),
    Get { id: i64 },
    Delete { id: i64 },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ElevatorCommand {
    #[command(flatten)]
    Record(RecordCommand),
    Create(ElevatorCreateArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ElevatorCreateArgs {
    /// Elevator code, block + number (e.g. A2)
    #[arg(long)]
    pub code: String,
    #[arg(long)]
    pub identity: String,
    #[arg(long)]
    pub building: String,
    #[arg(long, default_value = "")]
    pub address: String,
    #[arg(long)]
    pub floors: Option<u32>,
    #[arg(long)]
    pub capacity: Option<u32>,
    #[arg(long)]
    pub manager: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
}

/// Where the QR session comes from; exactly one must be given.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct QrSourceArgs {
    /// QR code text typed by hand
    #[arg(long)]
    pub qr_code: Option<String>,
    /// Image file(s) to scan for the QR code
    #[arg(long, num_args = 1..)]
    pub qr_image: Vec<PathBuf>,
    /// Start without scanning (PATRON only)
    #[arg(long)]
    pub remote_start: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum MaintenanceCommand {
    #[command(flatten)]
    Record(RecordCommand),
    Create(MaintenanceCreateArgs),
}

#[derive(Debug, Clone, Args)]
pub struct MaintenanceCreateArgs {
    #[arg(long)]
    pub elevator: i64,
    /// Maintenance date (YYYY-MM-DD or DD.MM.YYYY)
    #[arg(long)]
    pub date: String,
    #[arg(long)]
    pub description: String,
    #[arg(long, default_value = "")]
    pub amount: String,
    #[arg(long)]
    pub technician: Option<String>,
    /// Label colour: green, blue, yellow, red
    #[arg(long)]
    pub label: Option<String>,
    #[arg(long)]
    pub paid: bool,
    #[command(flatten)]
    pub qr: QrSourceArgs,
}

#[derive(Debug, Clone, Subcommand)]
pub enum FaultCommand {
    #[command(flatten)]
    Record(RecordCommand),
    /// Set status: open, in_progress, completed
    Status { id: i64, status: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum OfferCommand {
    #[command(flatten)]
    Record(RecordCommand),
    /// Set status: pending, accepted, rejected
    Status { id: i64, status: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum QrCommand {
    /// Validate a typed QR code
    Validate {
        #[arg(long)]
        elevator: i64,
        #[arg(long)]
        code: String,
    },
    /// Scan image file(s) and validate the code found
    Scan {
        #[arg(long)]
        elevator: i64,
        #[arg(long, required = true, num_args = 1..)]
        image: Vec<PathBuf>,
    },
    /// Issue a session without scanning (PATRON only)
    RemoteStart {
        #[arg(long)]
        elevator: i64,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ExecutionCommand {
    List {
        #[arg(long)]
        elevator: Option<i64>,
    },
    Start {
        #[arg(long)]
        elevator: i64,
        #[command(flatten)]
        qr: QrSourceArgs,
    },
    Complete {
        id: i64,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_maintenance_create_with_manual_code() {
        let cli = CliConfig::try_parse_from([
            "elevator-client",
            "maintenances",
            "create",
            "--elevator",
            "7",
            "--date",
            "01.02.2024",
            "--description",
            "Aylık bakım",
            "--qr-code",
            "ASN-0007",
        ])
        .unwrap();

        match cli.command {
            Command::Maintenances {
                action: MaintenanceCommand::Create(args),
            } => {
                assert_eq!(args.elevator, 7);
                assert_eq!(args.qr.qr_code.as_deref(), Some("ASN-0007"));
                assert!(!args.qr.remote_start);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_qr_source_is_required_and_exclusive() {
        let base = [
            "elevator-client",
            "executions",
            "start",
            "--elevator",
            "7",
        ];
        assert!(CliConfig::try_parse_from(base).is_err());

        let mut both = base.to_vec();
        both.extend(["--qr-code", "X", "--remote-start"]);
        assert!(CliConfig::try_parse_from(both).is_err());

        let mut remote = base.to_vec();
        remote.push("--remote-start");
        assert!(CliConfig::try_parse_from(remote).is_ok());
    }

    #[test]
    fn test_flattened_record_commands() {
        let cli = CliConfig::try_parse_from([
            "elevator-client",
            "--format",
            "json",
            "faults",
            "list",
            "--elevator",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.format.as_deref(), Some("json"));
        assert!(matches!(
            cli.command,
            Command::Faults {
                action: FaultCommand::Record(RecordCommand::List(ListArgs {
                    elevator: Some(3),
                    ..
                }))
            }
        ));
    }

    #[test]
    fn test_resolve_applies_overrides() {
        let cli = CliConfig::try_parse_from([
            "elevator-client",
            "--config",
            "/nonexistent/elevator-client.toml",
            "--api-url",
            "https://asansor.example.com/api",
            "whoami",
        ])
        .unwrap();
        let config = cli.resolve().unwrap();
        assert_eq!(config.api.base_url, "https://asansor.example.com/api");
        assert_eq!(config.output.format, "table");
    }
}
