use anyhow::{bail, Context, Result};
use bulkmail::{
    App, BulkDispatcher, Config, DispatchReport, Mailer, MessageTemplate, Recipient,
    RecipientSource, SyntheticRecipients,
};
use clap::{Parser, Subcommand};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "bulkmail", version, about = "Batched bulk mail over an HTTP relay")]
struct Cli {
    /// Subscriber database (overrides BULKMAIL_DATABASE)
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send one message to the given recipients
    Send {
        /// Recipient, either addr@host or "Name <addr@host>"; repeatable
        #[arg(long = "to", required = true)]
        to: Vec<String>,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        text: String,
        /// Sender (overrides BULKMAIL_FROM)
        #[arg(long)]
        from: Option<String>,
    },

    /// Send one message per batch to a whole list
    Bulk {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        text: String,
        #[arg(long)]
        from: Option<String>,
        /// Recipients per message (overrides BULKMAIL_RECIPIENT_LIMIT)
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
        /// Mail everyone waiting on this vacation package instead of the newsletter list
        #[arg(long, conflicts_with = "synthetic")]
        sku: Option<String>,
        /// Mail N generated customer addresses instead of the newsletter list
        #[arg(long)]
        synthetic: Option<usize>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign an address up for the newsletter
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        name: String,
    },

    /// Ask to be mailed when a vacation package is in season
    Listen {
        #[arg(long)]
        email: String,
        #[arg(long)]
        sku: String,
    },

    /// List newsletter signups
    Subscribers,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Default to INFO, RUST_LOG overrides
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // A --limit flag wins over BULKMAIL_RECIPIENT_LIMIT, even an unparsable one
    let limit_override = match &cli.command {
        Command::Bulk { limit, .. } => *limit,
        _ => None,
    };
    let mut config =
        Config::from_env_with_limit(limit_override).context("Failed to load configuration")?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    match cli.command {
        Command::Send {
            to,
            subject,
            text,
            from,
        } => {
            let recipients = to
                .iter()
                .map(|raw| Recipient::parse(raw))
                .collect::<Result<Vec<_>, _>>()?;
            let template = template_for(&config, from, subject, text);
            let app = App::initialize_in_memory(config)?;
            let dispatcher = app.dispatcher()?;

            // Up to the recipient limit this is a single message
            let report = app.send_to(&dispatcher, recipients, &template).await?;
            for acceptance in report.submitted() {
                println!(
                    "✓ Accepted for relay: {} recipient(s), message id {}",
                    acceptance.recipient_count,
                    acceptance.message_id.as_deref().unwrap_or("(none)")
                );
            }
            for batch in report.failed() {
                eprintln!(
                    "✗ could not send mail to {} recipient(s): {}",
                    batch.recipients.len(),
                    batch.reason
                );
            }
            if !report.is_complete_success() {
                bail!(
                    "{} of {} message(s) failed to submit",
                    report.failed().len(),
                    report.batch_count()
                );
            }
        }

        Command::Bulk {
            subject,
            text,
            from,
            limit: _,
            sku,
            synthetic,
            json,
        } => {
            let template = template_for(&config, from, subject, text);
            let app = App::initialize(config)?;
            let dispatcher = app.dispatcher()?;

            let start = Instant::now();
            let report = match (sku, synthetic) {
                (Some(sku), _) => app.send_in_season(&dispatcher, &sku, &template).await?,
                (None, Some(count)) => {
                    send_from(&dispatcher, &SyntheticRecipients::new(count), &app, &template).await?
                }
                (None, None) => app.send_newsletter(&dispatcher, &template).await?,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report, start);
            }

            if !report.is_complete_success() {
                bail!(
                    "{} of {} batch(es) failed to submit",
                    report.failed().len(),
                    report.batch_count()
                );
            }
        }

        Command::Signup { email, name } => {
            let app = App::initialize(config)?;
            let signup = app.store().add_signup(&name, &email)?;
            println!("✓ {} is now signed up for the newsletter", signup.email);
        }

        Command::Listen { email, sku } => {
            let app = App::initialize(config)?;
            app.store().add_in_season_listener(&email, &sku)?;
            println!("✓ {} will be notified when {} is in season", email.trim(), sku);
        }

        Command::Subscribers => {
            let app = App::initialize(config)?;
            let signups = app.store().list_signups()?;
            for signup in &signups {
                println!("{}", signup.recipient()?);
            }
            let stats = app.store().get_stats()?;
            println!(
                "\n{} signup(s), {} in-season listener(s)",
                stats.signup_count, stats.listener_count
            );
        }
    }

    Ok(())
}

fn template_for(
    config: &Config,
    from: Option<String>,
    subject: String,
    text: String,
) -> MessageTemplate {
    MessageTemplate::new(from.unwrap_or_else(|| config.from.clone()), subject, text)
}

async fn send_from<M: Mailer + ?Sized, S: RecipientSource>(
    dispatcher: &BulkDispatcher<M>,
    source: &S,
    app: &App,
    template: &MessageTemplate,
) -> Result<DispatchReport> {
    dispatcher
        .send_to_source(source, &app.batcher()?, template)
        .await
}

fn print_report(report: &DispatchReport, start: Instant) {
    println!("=== Bulk send {} ===", report.run_id());
    println!("Batches:              {}", report.batch_count());
    println!("Messages accepted:    {}", report.submitted_count());
    println!("Recipients accepted:  {}", report.submitted_recipient_count());
    println!("Elapsed:              {:.2}s", start.elapsed().as_secs_f64());
    println!("(accepted for relay only; check the provider's activity log for delivery)");

    let failed = report.failed();
    if failed.is_empty() {
        return;
    }

    println!("\n✗ {} batch(es) failed:", failed.len());
    for batch in &failed {
        println!(
            "  Batch {} ({} recipients): {}",
            batch.index,
            batch.recipients.len(),
            batch.reason
        );
        for recipient in &batch.recipients {
            println!("    {}", recipient);
        }
    }
}
