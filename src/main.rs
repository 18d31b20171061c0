use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use assignflow::auth::{EnvTokenProvider, StaticTokenProvider, TokenProvider};
use assignflow::config::config;
use assignflow::materials::{Attachment, HttpMaterialsClient};
use assignflow::roster::{GradeLevel, HttpRosterClient};
use assignflow::telemetry::{create_workflow_span, generate_correlation_id};
use assignflow::workflow::{WorkflowController, WorkflowStep};

#[derive(Parser)]
#[command(name = "assignflow")]
#[command(about = "Material assignment workflow for class rosters")]
#[command(long_about = "Assignflow drives the material-assignment workflow from the command \
                       line: pick a subject, pick a class and its recipients, attach a file, \
                       review, and submit the upload in one pass. Start with 'assignflow roster' \
                       to preview a class.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the class labels the backend accepts
    Classes,
    /// Preview the recipient roster for a class
    Roster {
        /// Class label, e.g. "6th std"
        #[arg(long, help = "One of the fixed class labels (\"4th std\" through \"10th std\")")]
        class: GradeLevel,
    },
    /// Run the assignment workflow end to end and upload a material
    Submit {
        /// Subject the material belongs to
        #[arg(long)]
        subject: String,
        /// Class label, e.g. "6th std"
        #[arg(long)]
        class: GradeLevel,
        /// File to upload
        #[arg(long)]
        file: PathBuf,
        /// Optional free-text comment
        #[arg(long)]
        comment: Option<String>,
        /// Recipient ids to target; defaults to the whole roster
        #[arg(long = "recipient", help = "Repeatable; omit to target every student in the class")]
        recipients: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Structured logs are opt-in for the CLI host so normal output stays
    // readable.
    if std::env::var("RUST_LOG").is_ok() {
        assignflow::telemetry::init_telemetry()?;
    }

    match cli.command {
        None => {
            show_how_to_submit();
            Ok(())
        }
        Some(Commands::Classes) => {
            classes_command();
            Ok(())
        }
        Some(Commands::Roster { class }) => {
            tokio::runtime::Runtime::new()?.block_on(async { roster_command(class).await })
        }
        Some(Commands::Submit {
            subject,
            class,
            file,
            comment,
            recipients,
        }) => tokio::runtime::Runtime::new()?.block_on(async {
            submit_command(subject, class, file, comment, recipients).await
        }),
    }
}

fn show_how_to_submit() {
    println!("Assignflow uploads a material to the students of one class.");
    println!();
    println!("  assignflow classes                      List accepted class labels");
    println!("  assignflow roster --class \"6th std\"     Preview who would receive it");
    println!("  assignflow submit --subject Mathematics --class \"6th std\" \\");
    println!("      --file worksheet.pdf                Upload to the whole class");
    println!();
    println!("Set ASSIGNFLOW_API_TOKEN (or api.token in assignflow.toml) before submitting.");
}

fn classes_command() {
    for grade in GradeLevel::ALL {
        println!("{grade}");
    }
}

fn token_provider() -> Result<Arc<dyn TokenProvider>> {
    let config = config()?;
    Ok(match &config.api.token {
        Some(token) => Arc::new(StaticTokenProvider::new(token.clone())),
        None => Arc::new(EnvTokenProvider::default()),
    })
}

async fn roster_command(class: GradeLevel) -> Result<()> {
    use assignflow::roster::RosterApi;

    let config = config()?;
    let http = config.http_client()?;
    let client = HttpRosterClient::new(http, config.api.base_url.clone());

    print!("🔍 Fetching roster for {class}... ");
    std::io::Write::flush(&mut std::io::stdout())?;
    let roster = client
        .fetch_roster(class)
        .await
        .context("could not load recipients")?;
    println!("✅");
    println!();

    if roster.is_empty() {
        println!("No students found in {class}.");
        return Ok(());
    }
    println!("{} student(s) in {class}:", roster.len());
    for record in &roster {
        println!("  {}  {}", record.id, record.name);
    }
    Ok(())
}

async fn submit_command(
    subject: String,
    class: GradeLevel,
    file: PathBuf,
    comment: Option<String>,
    recipients: Vec<String>,
) -> Result<()> {
    let correlation_id = generate_correlation_id();
    let span = create_workflow_span("submit", Some(&correlation_id));
    let _guard = span.enter();

    let config = config()?;
    let http = config.http_client()?;
    let roster_client = HttpRosterClient::new(http.clone(), config.api.base_url.clone());
    let materials_client =
        HttpMaterialsClient::new(http, config.api.base_url.clone(), token_provider()?);
    let mut controller = WorkflowController::new(roster_client, materials_client);

    // Subject step
    controller.select_subject(subject)?;
    controller.advance().await?;

    // Audience step
    print!("🔍 Loading roster for {class}... ");
    std::io::Write::flush(&mut std::io::stdout())?;
    controller.set_target_class(class).await?;
    println!("✅ {} student(s)", controller.state().roster().len());

    if !recipients.is_empty() {
        controller.clear_all_recipients()?;
        for id in &recipients {
            controller.toggle_recipient(id)?;
        }
    }
    controller.advance().await?;

    // File step
    let bytes = tokio::fs::read(&file)
        .await
        .with_context(|| format!("could not read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "material".to_string());
    controller.attach_file(Attachment::new(file_name, bytes))?;
    if let Some(comment) = comment {
        controller.set_comment(comment)?;
    }
    controller.advance().await?;

    // Review step
    if let Some(summary) = controller.summary() {
        println!();
        println!("Review:");
        println!("  Subject:    {}", summary.subject);
        println!("  Class:      {}", summary.target_class);
        println!("  Recipients: {}", summary.recipient_count);
        println!("  File:       {}", summary.file_name);
        if !summary.comment.is_empty() {
            println!("  Comment:    {}", summary.comment);
        }
        println!();
    }

    print!("📤 Uploading... ");
    std::io::Write::flush(&mut std::io::stdout())?;
    match controller.submit().await {
        Ok(receipt) => {
            println!("✅");
            println!(
                "Assignment submitted (HTTP {}, idempotency key {}).",
                receipt.status, receipt.idempotency_key
            );
            debug_assert_eq!(controller.step(), WorkflowStep::Complete);
            Ok(())
        }
        Err(err) => {
            println!("❌");
            println!("Upload failed, please try again: {err}");
            println!("Your selections were kept; rerun the same command to retry.");
            Err(err.into())
        }
    }
}
