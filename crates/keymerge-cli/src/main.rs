//! keymerge CLI: merge-join and group JSON-lines files that are already sorted by key.

mod error;
mod input;

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use keymerge_core::config::ScanConfig;
use keymerge_core::PairSource;
use keymerge_operators::{GroupExt, JoinError, JoinKind, JoinStats, MergeJoin};
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;
use crate::input::{compare_keys, same_key, ErrorSlot, JsonlPairs};

#[derive(Parser)]
#[command(name = "keymerge")]
#[command(about = "Sort-merge join and adjacent-key grouping over key-sorted JSON lines", long_about = None)]
struct Cli {
    /// Log to stderr (honours RUST_LOG, defaults to info)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Initial capacity of value groups (overrides KEYMERGE_GROUP_CAPACITY_HINT)
    #[arg(long, global = true)]
    group_capacity_hint: Option<usize>,

    /// Emit one trace event per join row (overrides KEYMERGE_TRACE_ROWS)
    #[arg(long, global = true)]
    trace_rows: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join two key-sorted files; keys must be strictly increasing in each
    Join {
        /// Left input (JSON lines of {"key", "value"})
        #[arg(long)]
        left: PathBuf,

        /// Right input (JSON lines of {"key", "value"})
        #[arg(long)]
        right: PathBuf,

        #[arg(long, value_enum, default_value_t = KindArg::Full)]
        kind: KindArg,

        /// Collect runs of equal keys on these sides into arrays before joining
        #[arg(long, value_enum, default_value_t = GroupArg::None)]
        group: GroupArg,
    },

    /// Group runs of equal adjacent keys
    Group {
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Inner,
    Left,
    Right,
    Full,
}

impl From<KindArg> for JoinKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Inner => JoinKind::Inner,
            KindArg::Left => JoinKind::Left,
            KindArg::Right => JoinKind::Right,
            KindArg::Full => JoinKind::Full,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GroupArg {
    None,
    Left,
    Right,
    Both,
}

#[derive(Serialize)]
struct JoinRow<'a, L, R> {
    key: &'a Value,
    left: Option<L>,
    right: Option<R>,
}

#[derive(Serialize)]
struct GroupRow<'a> {
    key: &'a Value,
    values: &'a [Value],
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("off")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = scan_config(&cli).and_then(|config| {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        match &cli.command {
            Commands::Join {
                left,
                right,
                kind,
                group,
            } => run_join(&config, left, right, (*kind).into(), *group, &mut out),
            Commands::Group { input } => run_group(&config, input, &mut out),
        }?;
        out.flush()?;
        Ok(())
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Environment first, then command-line overrides.
fn scan_config(cli: &Cli) -> Result<ScanConfig, CliError> {
    let mut config = ScanConfig::from_env()?;
    apply_overrides(&mut config, cli.group_capacity_hint, cli.trace_rows);
    Ok(config)
}

fn apply_overrides(config: &mut ScanConfig, group_capacity_hint: Option<usize>, trace_rows: bool) {
    if let Some(hint) = group_capacity_hint {
        config.group_capacity_hint = hint;
    }
    if trace_rows {
        config.trace_rows = true;
    }
}

fn run_join<W: Write>(
    config: &ScanConfig,
    left: &Path,
    right: &Path,
    kind: JoinKind,
    group: GroupArg,
    out: &mut W,
) -> Result<(), CliError> {
    let (left, left_errors) = JsonlPairs::open(left)?;
    let (right, right_errors) = JsonlPairs::open(right)?;
    let errors = [left_errors, right_errors];
    let stats = join_sources(config, left, right, kind, group, &errors, out)?;
    tracing::info!(
        rows = stats.rows,
        matched = stats.matched,
        left_only = stats.left_only,
        right_only = stats.right_only,
        "join finished"
    );
    Ok(())
}

fn join_sources<L, R, W>(
    config: &ScanConfig,
    left: L,
    right: R,
    kind: JoinKind,
    group: GroupArg,
    errors: &[ErrorSlot; 2],
    out: &mut W,
) -> Result<JoinStats, CliError>
where
    L: PairSource<Key = Value, Value = Value>,
    R: PairSource<Key = Value, Value = Value>,
    W: Write,
{
    let engine = MergeJoin::new(compare_keys).with_config(config.clone());
    let hint = config.group_capacity_hint;
    let new_group = move || Vec::<Value>::with_capacity(hint);
    let (left_grouped, right_grouped) = match group {
        GroupArg::None => (false, false),
        GroupArg::Left => (true, false),
        GroupArg::Right => (false, true),
        GroupArg::Both => (true, true),
    };
    let [left_errors, right_errors] = errors;
    let inputs = [
        InputErrors {
            slot: left_errors,
            grouped: left_grouped,
        },
        InputErrors {
            slot: right_errors,
            grouped: right_grouped,
        },
    ];
    match group {
        GroupArg::None => write_join(&engine, kind, left, right, &inputs, out),
        GroupArg::Left => write_join(
            &engine,
            kind,
            left.group_by_equivalence(new_group, same_key),
            right,
            &inputs,
            out,
        ),
        GroupArg::Right => write_join(
            &engine,
            kind,
            left,
            right.group_by_equivalence(new_group, same_key),
            &inputs,
            out,
        ),
        GroupArg::Both => write_join(
            &engine,
            kind,
            left.group_by_equivalence(new_group, same_key),
            right.group_by_equivalence(new_group, same_key),
            &inputs,
            out,
        ),
    }
}

/// Error slot of one join input, and whether that input is grouped.
struct InputErrors<'a> {
    slot: &'a ErrorSlot,
    grouped: bool,
}

impl InputErrors<'_> {
    /// The input's error, if a row with this side `present` may depend on
    /// records past the bad line. A single value that is present was read
    /// before it; an absent side or a group may be missing later records.
    fn before_row(&self, present: bool) -> Option<CliError> {
        if present && !self.grouped {
            return None;
        }
        self.slot.take()
    }
}

fn write_join<L, R, W>(
    engine: &MergeJoin<Value>,
    kind: JoinKind,
    left: L,
    right: R,
    errors: &[InputErrors<'_>; 2],
    out: &mut W,
) -> Result<JoinStats, CliError>
where
    L: PairSource<Key = Value>,
    L::Value: Serialize,
    R: PairSource<Key = Value>,
    R::Value: Serialize,
    W: Write,
{
    let [left_errors, right_errors] = errors;
    let result = engine.try_join(left, right, |l, r, key| {
        // An input that hit a bad line looks exhausted from then on.
        let failed = left_errors
            .before_row(l.is_some())
            .or_else(|| right_errors.before_row(r.is_some()));
        if let Some(e) = failed {
            return Err(e);
        }
        if !kind.keeps(l.is_some(), r.is_some()) {
            return Ok(());
        }
        let row = JoinRow {
            key: &key,
            left: l,
            right: r,
        };
        serde_json::to_writer(&mut *out, &row).map_err(io::Error::from)?;
        out.write_all(b"\n")?;
        Ok(())
    });
    if let Some(e) = left_errors.slot.take().or_else(|| right_errors.slot.take()) {
        return Err(e);
    }
    result.map_err(|e| match e {
        JoinError::Consumer(e) => e,
        other => CliError::Join(other.to_string()),
    })
}

fn run_group<W: Write>(config: &ScanConfig, input: &Path, out: &mut W) -> Result<(), CliError> {
    let (pairs, errors) = JsonlPairs::open(input)?;
    let groups = group_source(config, pairs, &errors, out)?;
    tracing::info!(groups, "grouping finished");
    Ok(())
}

fn group_source<S, W>(
    config: &ScanConfig,
    source: S,
    errors: &ErrorSlot,
    out: &mut W,
) -> Result<u64, CliError>
where
    S: PairSource<Key = Value, Value = Value>,
    W: Write,
{
    let hint = config.group_capacity_hint;
    let mut groups = source.group_by_equivalence(move || Vec::<Value>::with_capacity(hint), same_key);
    let mut count = 0u64;
    while let Some((key, values)) = groups.next_pair() {
        if let Some(e) = errors.take() {
            return Err(e);
        }
        let row = GroupRow {
            key: &key,
            values: &values,
        };
        serde_json::to_writer(&mut *out, &row).map_err(io::Error::from)?;
        out.write_all(b"\n")?;
        count += 1;
    }
    match errors.take() {
        Some(e) => Err(e),
        None => Ok(count),
    }
}
