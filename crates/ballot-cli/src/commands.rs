use anyhow::bail;
use ballot_store::{BallotEvent, BallotReader, BallotWriter, JournalEntry, ReplayEngine};
use ballot_types::{AccountId, Candidate};
use colored::Colorize;
use serde_json::json;

use crate::cli::*;
use crate::config::CliConfig;
use crate::session::{parse_candidate, parse_identity, Session};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::resolve(cli.config.as_deref())?;
    let session = Session::new(config.state_path(cli.state.as_deref()), config.gate);
    let format = cli.format;
    tracing::debug!(state = %session.path().display(), "ballot session");

    match cli.command {
        Command::Init(args) => cmd_init(&session, args, format),
        Command::Add(args) => cmd_add(&session, args, format),
        Command::Remove(args) => cmd_remove(&session, args, format),
        Command::Vote(args) => cmd_vote(&session, args, format),
        Command::Tally(args) => cmd_tally(&session, args, format),
        Command::Count => cmd_count(&session, format),
        Command::Owner => cmd_owner(&session, format),
        Command::List => cmd_list(&session, format),
        Command::Log(args) => cmd_log(&session, args, format),
        Command::Verify => cmd_verify(&session, format),
    }
}

fn print_json(value: serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn cmd_init(session: &Session, args: InitArgs, format: OutputFormat) -> anyhow::Result<()> {
    let generated = args.admin.is_none();
    let admin = match &args.admin {
        Some(raw) => parse_identity(raw),
        None => AccountId::ephemeral(),
    };
    session.init(admin.clone(), args.force)?;
    match format {
        OutputFormat::Json => print_json(json!({
            "state": session.path().display().to_string(),
            "owner": admin.to_hex(),
        })),
        OutputFormat::Text => {
            println!(
                "{} Initialized ballot in {}",
                "✓".green().bold(),
                session.path().display().to_string().bold()
            );
            println!("  Owner: {}", admin.short_id().cyan());
            if generated {
                println!("  Generated administrator id: {}", admin.to_hex().yellow());
            }
            Ok(())
        }
    }
}

fn cmd_add(session: &Session, args: AddArgs, format: OutputFormat) -> anyhow::Result<()> {
    let caller = parse_identity(&args.caller);
    let id = session.mutate(|store| store.add_candidate(&caller, &args.name))?;
    match format {
        OutputFormat::Json => print_json(json!({ "id": id.get(), "name": args.name })),
        OutputFormat::Text => {
            println!("{} Added candidate {} {}", "✓".green().bold(), id.to_string().yellow(), args.name.bold());
            Ok(())
        }
    }
}

fn cmd_remove(session: &Session, args: RemoveArgs, format: OutputFormat) -> anyhow::Result<()> {
    let caller = parse_identity(&args.caller);
    let id = parse_candidate(&args.candidate)?;
    session.mutate(|store| store.remove_candidate(&caller, id))?;
    match format {
        OutputFormat::Json => print_json(json!({ "removed": id.get() })),
        OutputFormat::Text => {
            println!("{} Removed candidate {}", "✓".green().bold(), id.to_string().yellow());
            Ok(())
        }
    }
}

fn cmd_vote(session: &Session, args: VoteArgs, format: OutputFormat) -> anyhow::Result<()> {
    let voter = parse_identity(&args.voter);
    let id = parse_candidate(&args.candidate)?;
    session.mutate(|store| store.vote(&voter, id))?;
    match format {
        OutputFormat::Json => print_json(json!({ "voter": voter.to_hex(), "candidate": id.get() })),
        OutputFormat::Text => {
            println!(
                "{} {} voted for {}",
                "✓".green().bold(),
                voter.short_id().cyan(),
                id.to_string().yellow()
            );
            Ok(())
        }
    }
}

fn cmd_tally(session: &Session, args: TallyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let id = parse_candidate(&args.candidate)?;
    let votes = session.open()?.total_votes(id)?;
    match format {
        OutputFormat::Json => print_json(json!({ "candidate": id.get(), "votes": votes })),
        OutputFormat::Text => {
            println!("{}", votes);
            Ok(())
        }
    }
}

fn cmd_count(session: &Session, format: OutputFormat) -> anyhow::Result<()> {
    let count = session.open()?.candidates_count()?;
    match format {
        OutputFormat::Json => print_json(json!({ "candidates": count })),
        OutputFormat::Text => {
            println!("{}", count);
            Ok(())
        }
    }
}

fn cmd_owner(session: &Session, format: OutputFormat) -> anyhow::Result<()> {
    let owner = session.open()?.owner();
    match format {
        OutputFormat::Json => print_json(json!({ "owner": owner.to_hex() })),
        OutputFormat::Text => {
            println!("{}", owner.to_hex());
            Ok(())
        }
    }
}

fn candidate_json(c: &Candidate) -> serde_json::Value {
    json!({ "id": c.id.get(), "name": c.name, "votes": c.vote_count })
}

fn cmd_list(session: &Session, format: OutputFormat) -> anyhow::Result<()> {
    let store = session.open()?;
    let candidates = store.candidates()?;
    match format {
        OutputFormat::Json => print_json(json!({
            "candidates": candidates.iter().map(candidate_json).collect::<Vec<_>>(),
            "voters": store.voter_count()?,
        })),
        OutputFormat::Text => {
            if candidates.is_empty() {
                println!("No candidates.");
            }
            for c in &candidates {
                println!("{:>5}  {:<32} {}", c.id.to_string().yellow(), c.name, c.vote_count.to_string().bold());
            }
            println!("\n{} candidates, {} voters", candidates.len(), store.voter_count()?);
            Ok(())
        }
    }
}

fn describe(entry: &JournalEntry) -> String {
    fn who(id: &AccountId) -> String {
        id.short_id()
    }
    match &entry.event {
        BallotEvent::CandidateAdded { id, name, by } => {
            format!("{} added {} {}", who(by), id, name)
        }
        BallotEvent::CandidateRemoved { id, by, discarded_votes } => {
            format!("{} removed {} ({} votes discarded)", who(by), id, discarded_votes)
        }
        BallotEvent::VoteCast { voter, candidate } => {
            format!("{} voted for {}", who(voter), candidate)
        }
    }
}

fn cmd_log(session: &Session, args: LogArgs, format: OutputFormat) -> anyhow::Result<()> {
    let journal = session.open()?.journal()?;
    let start = journal.len().saturating_sub(args.limit);
    let recent = &journal[start..];
    match format {
        OutputFormat::Json => print_json(json!({
            "total": journal.len(),
            "entries": recent.iter().map(|e| json!({
                "seq": e.seq,
                "kind": e.event.kind(),
                "summary": describe(e),
            })).collect::<Vec<_>>(),
        })),
        OutputFormat::Text => {
            if recent.is_empty() {
                println!("Journal is empty.");
            }
            for entry in recent.iter().rev() {
                println!("{}  {}", format!("#{}", entry.seq).yellow(), describe(entry));
            }
            Ok(())
        }
    }
}

fn cmd_verify(session: &Session, format: OutputFormat) -> anyhow::Result<()> {
    let store = session.open()?;
    let converged = ReplayEngine::verify_convergence(&store)?;
    let entries = store.journal_len()?;
    if format == OutputFormat::Json {
        print_json(json!({ "converged": converged, "journal": entries }))?;
    } else if converged {
        println!("{} Journal of {} entries reproduces the ballot.", "✓".green().bold(), entries);
    } else {
        println!("{} Journal does not reproduce the stored ballot.", "✗".red().bold());
    }
    if !converged {
        bail!("ballot state diverges from its journal");
    }
    Ok(())
}
