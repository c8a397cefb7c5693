//! `wln`: the command-line driver over `wln-ir`/`wln-hier`/`wln-blast`/
//! `wln-fraig` (spec §6 "External interfaces").
//!
//! A single process runs exactly one command against a freshly created
//! [`Session`] and exits with the code spec §6.1 specifies: `0` on
//! success, `1` on any error (usage error, parse error, or a blasting/
//! proof failure bubbled up through [`anyhow`]).

mod cli;
mod commands;
mod cone;
mod io;
mod session;
mod write;

use clap::Parser;

use cli::{Cli, Commands};
use session::Session;

fn main() {
    let cli = Cli::parse();
    let verbose = matches!(
        &cli.command,
        Commands::Blast(a) if a.verbose
    ) || matches!(&cli.command, Commands::Print(a) if a.verbose);
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .parse_default_env()
        .init();

    let mut sess = Session::new();
    if let Err(err) = dispatch(&mut sess, cli.command) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn dispatch(sess: &mut Session, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Read(args) => commands::read(sess, args),
        Commands::Write(args) => commands::write(sess, args),
        Commands::Ps(args) => commands::ps(sess, args),
        Commands::Cone(args) => commands::cone(sess, args),
        Commands::Blast(args) => commands::blast(sess, args),
        Commands::Abs(_) => commands::unsupported("abs"),
        Commands::Pdra(_) => commands::unsupported("pdra"),
        Commands::Abs2(_) => commands::unsupported("abs2"),
        Commands::Memabs(_) => commands::unsupported("memabs"),
        Commands::Memabs2(_) => commands::unsupported("memabs2"),
        Commands::Yosys(args) => commands::yosys(args),
        Commands::Hierarchy(args) => commands::hierarchy(sess, args),
        Commands::Collapse(args) => commands::collapse(sess, args),
        Commands::Graft(args) => commands::graft(sess, args),
        Commands::Print(args) => commands::print(sess, args),
        Commands::Prove(args) => commands::prove(sess, args),
        Commands::InvPs => commands::inv_ps(sess),
        Commands::InvPrint => commands::inv_print(sess),
        Commands::InvCheck(args) => commands::inv_check(sess, args),
        Commands::InvGet(args) => commands::inv_get(sess, args),
        Commands::InvPut(args) => commands::inv_put(sess, args),
        Commands::InvMin => commands::inv_min(sess),
    }
}
