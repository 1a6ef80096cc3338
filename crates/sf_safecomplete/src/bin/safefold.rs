use std::path::PathBuf;

use clap::ArgAction;
use clap::Parser;
use colored::Colorize;
use log::info;
use log::warn;

use sf_safecomplete::report::FoldingReport;
use sf_safecomplete::FoldError;
use sf_safecomplete::FoldingRules;
use sf_safecomplete::Predictor;
use sf_structure::read_path;
use sf_structure::Sequence;

/// Safe and complete maximum-pairing RNA folding.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Sequence to fold (ignored if --in is given).
    sequence: Option<String>,

    /// FASTA file, or directory of FASTA files, with one or more sequences
    /// and optional reference structures.
    #[arg(long = "in")]
    input: Option<PathBuf>,

    /// Minimum number of free bases in a hairpin loop.
    #[arg(long, default_value_t = FoldingRules::default().min_hairpin)]
    min_hairpin: usize,

    /// Print all optimal foldings, unless there are more than this many.
    #[arg(long, default_value_t = 0)]
    max_foldings: usize,

    /// Confirm each result with the baseline predictors and the trivial
    /// safety of the explicit foldings, for up to this many foldings.
    #[arg(long, value_name = "MAX_FOLDINGS")]
    check: Option<usize>,

    /// Print the simplified fold tree.
    #[arg(long)]
    tree: bool,

    /// One JSON report per sequence instead of text output.
    #[arg(long)]
    json: bool,

    /// More log output (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn colored_safety(seq: &Sequence, safe: &[bool]) -> String {
    seq.safety_string(safe)
        .chars()
        .zip(safe)
        .map(|(c, &s)| {
            let c = c.to_string();
            if s { c.green().bold().to_string() } else { c.red().to_string() }
        })
        .collect()
}

fn fold_one(seq: &Sequence, rules: FoldingRules, args: &Args) -> Result<(), FoldError> {
    let pred = Predictor::new(seq, rules)?;
    let (tree, stats) = pred.fold_tree_with_stats()?;
    let safety = pred.safety(&tree)?;
    let checked = match args.check {
        Some(max) => match pred.cross_check(&tree, &safety, max) {
            Ok(()) => true,
            Err(FoldError::EnumerationLimit(max)) => {
                warn!("{}: more than {max} optimal foldings, not cross-checked.", seq.name());
                false
            }
            Err(e) => return Err(e),
        },
        None => false,
    };

    if args.json {
        let mut report = FoldingReport::new(&pred, &tree, stats, &safety)?;
        report.cross_checked = checked;
        match serde_json::to_string(&report) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!("Failed to write report for {}: {e}", seq.name()),
        }
        return Ok(());
    }

    if !seq.comment().is_empty() {
        println!(">{}", seq.comment());
    }
    println!("{}", colored_safety(seq, safety.safe()));
    if let Some(example) = pred.foldings(&tree).next() {
        println!(
            "{} {} pairs, {} optimal foldings, {}/{} bases safe",
            example.to_dot_bracket(),
            pred.optimal_pairs(),
            pred.num_solutions(),
            safety.num_safe(),
            seq.len()
        );
    }
    if let (Some(reference), Some(optimal)) = (seq.reference(), pred.reference_is_optimal()?) {
        let label = if optimal { "optimal".green() } else { "suboptimal".yellow() };
        println!("{} reference, {label}", reference.to_dot_bracket());
    }
    info!(
        "{}: fold tree of {} nodes, {} after simplification.",
        seq.name(),
        stats.raw_nodes,
        stats.simplified_nodes
    );
    if checked {
        println!("{}", "cross-checked".green());
    }
    if args.tree {
        print!("{tree}");
    }
    if args.max_foldings > 0 {
        match pred.collect_foldings(&tree, args.max_foldings) {
            Ok(all) => {
                for f in all {
                    println!("{}", f.to_dot_bracket());
                }
            }
            Err(FoldError::EnumerationLimit(max)) => {
                warn!("{}: more than {max} optimal foldings, not listing them.", seq.name());
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let seqs = match (&args.input, &args.sequence) {
        (Some(path), _) => {
            let seqs = read_path(path)?;
            info!("Read {} sequences from {}.", seqs.len(), path.display());
            seqs
        }
        (None, Some(s)) => vec![s.parse::<Sequence>()?],
        (None, None) => return Err("provide a sequence or a FASTA file with --in".into()),
    };

    let rules = FoldingRules::with_min_hairpin(args.min_hairpin);
    for seq in &seqs {
        if let Err(e) = fold_one(seq, rules, &args) {
            warn!("Skipping {}: {e}", seq.name());
        }
    }
    Ok(())
}
