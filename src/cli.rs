// cli.rs — Command-line interface definitions (clap derive)
//
// Defines the top-level `certledger` command:
//   certledger digest   — print the digest of a record's hashable fields
//   certledger issue    — issue a certificate from a request file
//   certledger verify   — verify a stored certificate by id
//   certledger list     — list a student's certificates
//   certledger account  — registration, sign-in and institution approval

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "certledger")]
#[command(about = "certledger — academic certificate issuance and verification")]
#[command(version)]
pub struct Cli {
    /// Path to certledger.json (default: $CERTLEDGER_CONFIG or ./certledger.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the digest of a certificate record or hashable field set
    Digest {
        /// JSON file holding the record
        record: PathBuf,
    },

    /// Issue a certificate
    Issue {
        /// Id of the issuing account
        #[arg(long = "as")]
        actor: String,

        /// JSON file holding the issuance request
        request: PathBuf,

        /// Fraud report to apply instead of calling a scoring service
        #[arg(long)]
        fraud_report: Option<PathBuf>,
    },

    /// Verify a certificate by id
    Verify {
        /// Certificate id, e.g. CERT-2024-00042
        id: String,

        /// Print the verdict and record as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// List the certificates held by a student
    List {
        /// Id of the requesting account
        #[arg(long = "as")]
        actor: String,

        /// Student id, e.g. STU-123
        #[arg(long)]
        student: String,
    },

    /// Account management
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Subcommand)]
pub enum AccountAction {
    /// Register an institution (pending until approved by an admin)
    RegisterInstitution {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        website: String,
        #[arg(long, default_value = "")]
        founded_year: String,
    },

    /// Register a student
    RegisterStudent {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        mobile: Option<String>,
    },

    /// Admit an authenticated account and print its effective profile
    SignIn {
        /// Account id
        id: String,
    },

    /// List institutions awaiting approval
    Pending {
        #[arg(long = "as")]
        actor: String,
    },

    /// Approve an institution by email
    Approve {
        #[arg(long = "as")]
        actor: String,
        email: String,
    },

    /// Reject an institution by email
    Reject {
        #[arg(long = "as")]
        actor: String,
        email: String,
    },
}
