//! The `clap`-derive command surface (spec §6.1's command table, §6.2's
//! canonical `blast` flags).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "wln", about = "Word-level network IR, bit-blaster, and FRAIG equivalence checker")]
pub struct Cli {
    /// Run a single command non-interactively and exit (the core loop a
    /// real front-end would otherwise drive one line at a time; spec §1
    /// leaves the interactive shell itself out of scope).
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace the current word-level network with a file's contents.
    Read(ReadArgs),
    /// Emit the current network to a file.
    Write(WriteArgs),
    /// Print statistics: cones, multipliers, adders, memories, object listing.
    Ps(PsArgs),
    /// Extract a logic cone around a range of primary outputs.
    Cone(ConeArgs),
    /// Bit-blast the current design into the shared AIG.
    Blast(BlastArgs),
    /// CEGAR abstraction flow (non-goal; reports unsupported).
    Abs(AbsArgs),
    /// CEGAR abstraction flow variant (non-goal; reports unsupported).
    Pdra(AbsArgs),
    /// CEGAR abstraction flow variant (non-goal; reports unsupported).
    Abs2(AbsArgs),
    /// Memory-aware CEGAR abstraction flow (non-goal; reports unsupported).
    Memabs(AbsArgs),
    /// Memory-aware CEGAR abstraction flow variant (non-goal; reports unsupported).
    Memabs2(AbsArgs),
    /// Invoke an external synthesis front-end (non-goal; reports unsupported).
    Yosys(YosysArgs),
    /// Mark a module as a blast-time hierarchy boundary.
    Hierarchy(HierarchyArgs),
    /// Flatten the hierarchy under `top` into the global AIG.
    Collapse(CollapseArgs),
    /// Mark two modules as direct or inverse equivalents.
    Graft(GraftArgs),
    /// Print the design hierarchy.
    Print(PrintArgs),
    /// Run a guidance file's `equal`/`inverse`/`property` tasks.
    Prove(ProveArgs),
    /// Print the count of saved invariants.
    InvPs,
    /// Print every saved invariant.
    InvPrint,
    /// Check whether a named invariant exists.
    InvCheck(InvNameArgs),
    /// Print a named invariant's payload.
    InvGet(InvNameArgs),
    /// Save (or replace) a named invariant.
    InvPut(InvPutArgs),
    /// Drop duplicate invariants.
    InvMin,
}

#[derive(clap::Args, Debug)]
pub struct ReadArgs {
    pub file: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct WriteArgs {
    pub file: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct PsArgs {
    #[arg(short = 'c')]
    pub cones: bool,
    #[arg(short = 'b')]
    pub boundaries: bool,
    #[arg(short = 'a')]
    pub adders: bool,
    #[arg(short = 'm')]
    pub multipliers: bool,
    #[arg(short = 'd')]
    pub dffs: bool,
    #[arg(short = 't')]
    pub tables: bool,
    #[arg(short = 'o')]
    pub objects: bool,
}

#[derive(clap::Args, Debug)]
pub struct ConeArgs {
    #[arg(short = 'O')]
    pub output: u32,
    #[arg(short = 'R')]
    pub count: u32,
    #[arg(short = 'i')]
    pub inputs_only: bool,
    #[arg(short = 's')]
    pub shared: bool,
}

#[derive(clap::Args, Debug)]
pub struct BlastArgs {
    #[arg(short = 'O')]
    pub first_po: Option<u32>,
    #[arg(short = 'R')]
    pub po_count: Option<u32>,
    #[arg(short = 'A')]
    pub adder_threshold: Option<u32>,
    #[arg(short = 'M')]
    pub multiplier_threshold: Option<u32>,
    #[arg(short = 'c')]
    pub skip_strash: bool,
    #[arg(short = 'o')]
    pub add_boundary_pos: bool,
    #[arg(short = 'm')]
    pub multi_mode: bool,
    #[arg(short = 'b')]
    pub booth: bool,
    #[arg(short = 'q')]
    pub non_restoring: bool,
    #[arg(short = 'a')]
    pub cla_adder: bool,
    #[arg(short = 'y')]
    pub alt_div_by_zero: bool,
    #[arg(short = 'd')]
    pub dual_output_miter: bool,
    #[arg(short = 'e')]
    pub word_miter: bool,
    #[arg(short = 's')]
    pub decoded_muxes: bool,
    #[arg(short = 't')]
    pub multi_output_miter: bool,
    #[arg(short = 'r')]
    pub interleaved_order: bool,
    #[arg(short = 'n')]
    pub dump_names: bool,
    #[arg(short = 'i')]
    pub print_input_info: bool,
    #[arg(short = 'z')]
    pub preserve_flop_names: bool,
    #[arg(short = 'v')]
    pub verbose: bool,
}

#[derive(clap::Args, Debug)]
pub struct AbsArgs {
    #[arg(short = 'A')]
    pub a: Option<u32>,
    #[arg(short = 'M')]
    pub m: Option<u32>,
    #[arg(short = 'X')]
    pub x: Option<u32>,
    #[arg(short = 'F')]
    pub f: Option<u32>,
    #[arg(short = 'I')]
    pub i: Option<u32>,
    #[arg(short = 'L')]
    pub l: Option<u32>,
}

#[derive(clap::Args, Debug)]
pub struct YosysArgs {
    pub file: PathBuf,
    #[arg(short = 'T')]
    pub top: Option<String>,
    #[arg(short = 'D')]
    pub defs: Option<String>,
    #[arg(short = 'b')]
    pub bit_blast: bool,
    #[arg(short = 'i')]
    pub interactive: bool,
    #[arg(short = 's')]
    pub s: bool,
    #[arg(short = 'm')]
    pub m: bool,
    #[arg(short = 'l')]
    pub l: bool,
    #[arg(short = 'c')]
    pub c: bool,
}

#[derive(clap::Args, Debug)]
pub struct HierarchyArgs {
    pub module: String,
}

#[derive(clap::Args, Debug)]
pub struct CollapseArgs {
    #[arg(short = 'T')]
    pub top: String,
    #[arg(short = 'c')]
    pub clear_boundaries: bool,
    #[arg(short = 'r')]
    pub reverse: bool,
}

#[derive(clap::Args, Debug)]
pub struct GraftArgs {
    pub mod1: String,
    pub mod2: String,
    #[arg(short = 'i')]
    pub inverse: bool,
}

#[derive(clap::Args, Debug)]
pub struct PrintArgs {
    #[arg(short = 'p')]
    pub ports: bool,
    #[arg(short = 'd')]
    pub dump: bool,
    #[arg(short = 'v')]
    pub verbose: bool,
}

#[derive(clap::Args, Debug)]
pub struct ProveArgs {
    pub file: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct InvNameArgs {
    pub module: String,
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct InvPutArgs {
    pub module: String,
    pub name: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_read_with_a_bare_path() {
        let cli = Cli::try_parse_from(["wln", "read", "design.il"]).unwrap();
        match cli.command {
            Commands::Read(args) => assert_eq!(args.file, PathBuf::from("design.il")),
            other => panic!("expected Read, got {other:?}"),
        }
    }

    #[test]
    fn blast_short_flags_combine() {
        let cli = Cli::try_parse_from(["wln", "blast", "-b", "-v", "-O", "2"]).unwrap();
        match cli.command {
            Commands::Blast(args) => {
                assert!(args.booth);
                assert!(args.verbose);
                assert_eq!(args.first_po, Some(2));
            }
            other => panic!("expected Blast, got {other:?}"),
        }
    }

    #[test]
    fn ps_rejects_an_unknown_flag() {
        assert!(Cli::try_parse_from(["wln", "ps", "-q"]).is_err());
    }
}
