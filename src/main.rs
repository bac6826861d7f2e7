// main.rs — certledger CLI entry point
//
// Wires the JSON-directory store, the configured authorizer and the SHA-256
// digest verifier into the library services, then prints results. Progress
// goes to stderr, machine-readable output to stdout.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use certledger::auth::{AccountService, Authorizer, InstitutionRegistration, StudentRegistration, User};
use certledger::cert::digest::DigestVerifier;
use certledger::cert::issue::Issuer;
use certledger::cert::listing;
use certledger::cert::model::{CertificateRecord, HashableFields, IssueRequest};
use certledger::cert::verify::{CertificateVerifier, Verdict};
use certledger::config::{self, Config};
use certledger::fraud::{FraudAnalyzer, OfflineAnalyzer, ReportFileAnalyzer};
use certledger::hash::Sha256Hasher;
use certledger::store::JsonDirStore;

use cli::{AccountAction, Cli, Commands};

const LOG_ENV: &str = "CERTLEDGER_LOG";

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Digest { record } => cmd_digest(&record),
        Commands::Issue {
            actor,
            request,
            fraud_report,
        } => {
            let ctx = App::open(cli.config.as_deref())?;
            cmd_issue(&ctx, &actor, &request, fraud_report.as_deref())
        }
        Commands::Verify { id, json } => {
            let ctx = App::open(cli.config.as_deref())?;
            let verdict = cmd_verify(&ctx, &id, json)?;
            std::process::exit(if verdict.is_authentic() { 0 } else { 1 })
        }
        Commands::List { actor, student } => {
            let ctx = App::open(cli.config.as_deref())?;
            cmd_list(&ctx, &actor, &student)
        }
        Commands::Account { action } => {
            let ctx = App::open(cli.config.as_deref())?;
            cmd_account(&ctx, action)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Everything a command needs, built once from the config file.
struct App {
    config: Config,
    store: JsonDirStore,
    authorizer: Authorizer,
    digests: DigestVerifier<Sha256Hasher>,
}

impl App {
    fn open(explicit: Option<&Path>) -> Result<Self> {
        let path = config::resolve_path(explicit);
        let config = config::load_or_create(&path)
            .with_context(|| format!("loading config {}", path.display()))?;
        Ok(App {
            store: JsonDirStore::new(&config.data_dir),
            authorizer: config.authorizer(),
            digests: DigestVerifier::default(),
            config,
        })
    }

    fn accounts(&self) -> AccountService<'_> {
        AccountService::new(&self.store, &self.authorizer)
    }

    fn actor(&self, id: &str) -> Result<User> {
        self.accounts()
            .load(id)
            .with_context(|| format!("resolving account {}", id))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_digest(path: &Path) -> Result<()> {
    let value: serde_json::Value = read_json(path)?;
    let digests = DigestVerifier::<Sha256Hasher>::default();

    // A full record carries its stored hash; a bare field set does not.
    if value.get("hash").is_some() {
        let record: CertificateRecord =
            serde_json::from_value(value).context("parsing certificate record")?;
        let digest = digests.compute_digest(&record.hashable_fields())?;
        println!("{}", digest);
        if digest == record.hash {
            eprintln!("[certledger] Stored hash: OK");
        } else {
            eprintln!("[certledger] Stored hash MISMATCH: stored={}", record.hash);
        }
    } else {
        let fields: HashableFields =
            serde_json::from_value(value).context("parsing hashable fields")?;
        println!("{}", digests.compute_digest(&fields)?);
    }
    Ok(())
}

fn cmd_issue(ctx: &App, actor: &str, request: &Path, fraud_report: Option<&Path>) -> Result<()> {
    let actor = ctx.actor(actor)?;
    let request: IssueRequest = read_json(request)?;

    let analyzer: Box<dyn FraudAnalyzer> = match fraud_report {
        Some(path) => Box::new(ReportFileAnalyzer::new(path)),
        None => Box::new(OfflineAnalyzer),
    };

    let issuer = Issuer::new(&ctx.store, analyzer.as_ref(), &ctx.authorizer, &ctx.digests)
        .with_fraud_threshold(ctx.config.fraud_block_threshold);
    let record = issuer.issue(&actor, request).context("issuing certificate")?;

    eprintln!("[certledger] Certificate issued:");
    eprintln!("  ID: {}", record.id);
    eprintln!("  Student: {} ({})", record.student_name, record.student_id);
    eprintln!("  Hash: {}", record.hash);
    if let Some(ref fa) = record.fraud_analysis {
        eprintln!("  Fraud score: {} ({})", fa.score, fa.reasons.join("; "));
    }
    print_json(&record)
}

fn cmd_verify(ctx: &App, id: &str, json: bool) -> Result<Verdict> {
    eprintln!("[certledger] Checking record {}", id.trim());
    let verifier = CertificateVerifier::new(&ctx.store, &ctx.digests);
    let verdict = match verifier.verify_certificate(id) {
        Ok(v) => v,
        Err(e) if e.is_retryable() => {
            eprintln!("[certledger] Verification unavailable, try again: {}", e);
            std::process::exit(2);
        }
        Err(e) => return Err(e).context("verifying certificate"),
    };

    if let Some(record) = verdict.record() {
        eprintln!("[certledger] Student: {}", record.student_name);
        eprintln!("[certledger] Institution: {}", record.university);
        eprintln!("[certledger] Degree: {} in {}", record.degree, record.program);
        eprintln!("[certledger] Status: {:?}", record.status);
    }

    eprintln!();
    match &verdict {
        Verdict::Authentic(_) => eprintln!("✅ AUTHENTIC"),
        Verdict::Tampered(r) => {
            eprintln!("❌ INTEGRITY MISMATCH — stored fields do not match hash {}", r.hash)
        }
        Verdict::Inactive(r) => eprintln!("⚠️  NOT VALID — certificate is {:?}", r.status),
        Verdict::NotFound => eprintln!("❌ VERIFICATION FAILED — no such certificate"),
    }

    if json {
        print_json(&verdict)?;
    }
    Ok(verdict)
}

fn cmd_list(ctx: &App, actor: &str, student_id: &str) -> Result<()> {
    let actor = ctx.actor(actor)?;
    let records = listing::certificates_for_student(&ctx.store, &ctx.authorizer, &actor, student_id)
        .context("listing certificates")?;
    eprintln!("[certledger] {} certificate(s) for {}", records.len(), student_id);
    print_json(&records)
}

fn cmd_account(ctx: &App, action: AccountAction) -> Result<()> {
    let accounts = ctx.accounts();
    match action {
        AccountAction::RegisterInstitution {
            name,
            email,
            website,
            founded_year,
        } => {
            let user = accounts.register_institution(InstitutionRegistration {
                institution_name: name,
                email,
                website,
                founded_year,
            })?;
            eprintln!(
                "[certledger] Registered {} as {:?} ({:?})",
                user.email, user.role, user.status
            );
            print_json(&user)
        }
        AccountAction::RegisterStudent {
            name,
            email,
            mobile,
        } => {
            let user = accounts.register_student(StudentRegistration {
                name,
                email,
                mobile_number: mobile,
            })?;
            eprintln!(
                "[certledger] Registered student {} with id {}",
                user.email,
                user.student_id.as_deref().unwrap_or("-")
            );
            print_json(&user)
        }
        AccountAction::SignIn { id } => {
            let user = accounts.sign_in(&id)?;
            print_json(&user)
        }
        AccountAction::Pending { actor } => {
            let actor = ctx.actor(&actor)?;
            let pending = accounts.pending_institutions(&actor)?;
            eprintln!("[certledger] {} institution(s) awaiting approval", pending.len());
            print_json(&pending)
        }
        AccountAction::Approve { actor, email } => {
            let actor = ctx.actor(&actor)?;
            let n = accounts.approve_institution(&actor, &email)?;
            eprintln!("[certledger] Approved {} account(s) for {}", n, email);
            Ok(())
        }
        AccountAction::Reject { actor, email } => {
            let actor = ctx.actor(&actor)?;
            let n = accounts.reject_institution(&actor, &email)?;
            eprintln!("[certledger] Rejected {} account(s) for {}", n, email);
            Ok(())
        }
    }
}
