//! CLI entry point for `backupmail`.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};

use backupmail::config::{self, Config};
use backupmail::destination::email::validate_config;
use backupmail::destination::{config_schema, EmailDestination, EncryptionStatus, Operation};
use backupmail::model::artifact::FileArtifact;
use backupmail::store::temp::FsTempStorage;
use backupmail::transport::outbox::OutboxTransport;
use backupmail::transport::smtp::SmtpMailTransport;
use backupmail::transport::MailTransport;

#[derive(Parser)]
#[command(
    name = "backupmail",
    version,
    about = "Send backup files as email attachments"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (overrides $BACKUPMAIL_CONFIG)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Email a backup file to the configured recipients
    Send {
        /// Backup file to send
        file: PathBuf,
        /// Recipients, comma separated (overrides destination.email)
        #[arg(long)]
        to: Option<String>,
        /// Sender address
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        body: Option<String>,
        /// Maximum attachment size, e.g. 25MB
        #[arg(long)]
        max_size: Option<String>,
        /// Wrap the backup in a password-protected ZIP
        #[arg(long)]
        encrypt: bool,
        /// ZIP password
        #[arg(long, env = "BACKUPMAIL_ENCRYPT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Write messages as .eml files into DIR instead of using SMTP
        #[arg(long, value_name = "DIR")]
        outbox: Option<PathBuf>,
    },
    /// Check the configured destination without sending anything
    Validate,
    /// Print the destination's configuration fields
    Schema {
        #[arg(long, value_enum, default_value = "initialize")]
        operation: Operation,
        #[arg(long)]
        json: bool,
    },
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config(),
    };

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Send {
            file,
            to,
            from,
            subject,
            body,
            max_size,
            encrypt,
            password,
            outbox,
        } => {
            let mut config = config;
            let dest = &mut config.destination;
            if let Some(to) = to {
                dest.email = to;
            }
            dest.from = from.or(dest.from.take());
            dest.subject = subject.or(dest.subject.take());
            dest.body = body.or(dest.body.take());
            dest.max_size = max_size.or(dest.max_size.take());
            dest.encrypt |= encrypt;
            dest.encrypt_password = password.or(dest.encrypt_password.take());
            cmd_send(&file, &config, outbox.as_deref())
        }
        Commands::Validate => cmd_validate(&config),
        Commands::Schema { operation, json } => cmd_schema(operation, json),
        Commands::Init { force } => cmd_init(cli.config.as_deref(), force),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_dir = config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, config::LOG_FILE_NAME);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Send one backup file.
fn cmd_send(file: &Path, config: &Config, outbox: Option<&Path>) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("Backup file not found: {}", file.display());
    }

    let transport: Box<dyn MailTransport> = match outbox {
        Some(dir) => Box::new(OutboxTransport::new(dir)?),
        None => Box::new(SmtpMailTransport::from_config(&config.smtp)?),
    };
    let storage = FsTempStorage::new(config.storage.temp_dir());
    let destination = EmailDestination::with_storage(transport, storage, &config.site.mail)
        .read_chunk_size(config.storage.read_chunk_size);

    let artifact = FileArtifact::new(file)?;
    let report = destination.save(&artifact, &config.destination)?;

    println!();
    println!("  {:<20} {}", "Attachment", report.filename);
    println!("  {:<20} {}", "Delivered", report.delivered);
    if !report.failed.is_empty() {
        println!("  {:<20} {}", "Failed", report.failed.join(", "));
    }
    let encryption = match &report.encryption {
        EncryptionStatus::NotRequested => "no".to_string(),
        EncryptionStatus::Encrypted => "AES-256 ZIP".to_string(),
        EncryptionStatus::Fallback(reason) => format!("skipped ({reason})"),
    };
    println!("  {:<20} {}", "Encrypted", encryption);
    if let Some(dir) = outbox {
        println!("  {:<20} {}", "Outbox", dir.display());
    }
    println!();

    Ok(())
}

/// Validate the configured destination.
fn cmd_validate(config: &Config) -> anyhow::Result<()> {
    validate_config(&config.destination)?;
    let recipients = config.destination.recipients();
    println!(
        "  Destination OK: {} recipient(s), sender {}",
        recipients.len(),
        config.destination.sender(&config.site.mail)
    );
    Ok(())
}

/// Print the config schema for an operation.
fn cmd_schema(operation: Operation, json: bool) -> anyhow::Result<()> {
    let schema = config_schema(operation);
    if json {
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    println!();
    for field in &schema.fields {
        let required = if field.required { " (required)" } else { "" };
        println!("  {:<18} {}{}", field.key, field.title, required);
        println!("  {:<18} {}", "", field.description);
    }
    println!();
    Ok(())
}

/// Write the default configuration to the config path.
fn cmd_init(explicit: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config::config_file_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?,
    };
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }
    config::save_config(&Config::default(), &path)?;
    println!("  Wrote {}", path.display());
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "backupmail", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}
