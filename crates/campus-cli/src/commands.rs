//! Command definitions and dispatch

use campus_ledger::{
    sample_notifications, Kind, MembershipLedger, MembershipRecord, NotificationEntry,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

/// Campus membership ledger
#[derive(Debug, Parser)]
#[command(name = "campus", version, about = "Manage joined classes, quizzes and local notifications")]
pub(crate) struct Cli {
    /// Directory holding the store document
    #[arg(long, env = "CAMPUS_DATA_DIR", default_value = ".campus")]
    pub(crate) data_dir: PathBuf,

    /// Ledger configuration file (TOML)
    #[arg(long, env = "CAMPUS_CONFIG")]
    pub(crate) config: Option<PathBuf>,

    /// Print results and logs as JSON
    #[arg(long)]
    pub(crate) json: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Joined classes
    #[command(subcommand)]
    Class(ClassCommand),
    /// Joined quizzes
    #[command(subcommand)]
    Quiz(QuizCommand),
    /// Local notification log
    #[command(subcommand)]
    Notifications(NotificationCommand),
}

#[derive(Debug, Args)]
pub(crate) struct JoinArgs {
    /// Membership code
    code: String,
    /// Display name
    name: String,
}

#[derive(Debug, Subcommand)]
pub(crate) enum ClassCommand {
    /// Join a class
    Join {
        #[command(flatten)]
        args: JoinArgs,
        /// Lecturer of the class
        #[arg(long)]
        lecturer: Option<String>,
    },
    /// Leave a class
    Leave { code: String },
    /// List joined classes
    List,
}

#[derive(Debug, Subcommand)]
pub(crate) enum QuizCommand {
    /// Join a quiz
    Join {
        #[command(flatten)]
        args: JoinArgs,
    },
    /// Exit a quiz
    Exit { code: String },
    /// List joined quizzes
    List,
}

#[derive(Debug, Subcommand)]
pub(crate) enum NotificationCommand {
    /// List notifications, newest first
    List {
        /// Store the starter notifications if the log was never written
        #[arg(long)]
        seed: bool,
    },
    /// Flip read state of one notification
    Toggle { id: String },
    /// Mark every notification read
    MarkAllRead,
    /// Schedule a test reminder
    Test,
}

/// Result of one command
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum Report {
    /// Outcome of a mutation
    Mutation { ok: bool, action: String },
    /// A membership collection
    Memberships(Vec<MembershipRecord>),
    /// The notification log
    Notifications(Vec<NotificationEntry>),
}

impl Report {
    fn mutation(ok: bool, action: impl Into<String>) -> Self {
        Self::Mutation {
            ok,
            action: action.into(),
        }
    }

    /// Whether the process should exit successfully
    pub(crate) fn success(&self) -> bool {
        match self {
            Self::Mutation { ok, .. } => *ok,
            Self::Memberships(_) | Self::Notifications(_) => true,
        }
    }

    /// Short human-readable rendering
    pub(crate) fn render_text(&self) -> String {
        match self {
            Self::Mutation { ok, action } => {
                format!("{action}: {}", if *ok { "done" } else { "failed" })
            }
            Self::Memberships(records) if records.is_empty() => "nothing joined".to_string(),
            Self::Memberships(records) => records
                .iter()
                .map(|r| format!("{}\t{}", r.code, r.name))
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Notifications(entries) if entries.is_empty() => "no notifications".to_string(),
            Self::Notifications(entries) => entries
                .iter()
                .map(|e| {
                    let badge = if e.unread { "NEW " } else { "READ" };
                    format!("[{badge}] {}\t{}: {}\t{}", e.id, e.title, e.body, e.time)
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Run `command` against `ledger`
pub(crate) async fn execute(command: Command, ledger: &MembershipLedger) -> Report {
    match command {
        Command::Class(ClassCommand::Join { args, lecturer }) => {
            let mut record = MembershipRecord::new(args.code, args.name);
            if let Some(lecturer) = lecturer {
                record = record.with_field("lecturer", lecturer);
            }
            let action = format!("join class {}", record.code);
            Report::mutation(ledger.join(Kind::Class, record).await, action)
        }
        Command::Class(ClassCommand::Leave { code }) => {
            let ok = ledger.leave(Kind::Class, &code).await;
            Report::mutation(ok, format!("leave class {code}"))
        }
        Command::Class(ClassCommand::List) => Report::Memberships(ledger.list(Kind::Class).await),
        Command::Quiz(QuizCommand::Join { args }) => {
            let action = format!("join quiz {}", args.code);
            let record = MembershipRecord::new(args.code, args.name);
            Report::mutation(ledger.join(Kind::Quiz, record).await, action)
        }
        Command::Quiz(QuizCommand::Exit { code }) => {
            let ok = ledger.leave(Kind::Quiz, &code).await;
            Report::mutation(ok, format!("exit quiz {code}"))
        }
        Command::Quiz(QuizCommand::List) => Report::Memberships(ledger.list(Kind::Quiz).await),
        Command::Notifications(NotificationCommand::List { seed }) => {
            let log = ledger.notifications();
            if seed && log.seed_if_empty(sample_notifications()).await {
                tracing::info!("seeded starter notifications");
            }
            Report::Notifications(log.entries().await)
        }
        Command::Notifications(NotificationCommand::Toggle { id }) => {
            let ok = ledger.notifications().toggle_read(&id).await.is_some();
            Report::mutation(ok, format!("toggle {id}"))
        }
        Command::Notifications(NotificationCommand::MarkAllRead) => {
            Report::mutation(ledger.notifications().mark_all_read().await, "mark all read")
        }
        Command::Notifications(NotificationCommand::Test) => {
            Report::mutation(ledger.send_test_notification().await, "send test notification")
        }
    }
}
