use clap::{Parser, ValueEnum};

/// Offsets reach about a century either side of today.
pub const MAX_OFFSET_DAYS: i64 = 36_600;

/// Collect the earnings announcement calendar for a window of days and append it to a
/// SQLite or PostgreSQL store.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Destination store: a SQLite file path / `sqlite:` URL, or a `postgres://` URL.
    #[arg(short, long)]
    pub db: String,

    /// First day offset from today (inclusive); may be negative.
    #[arg(
        short,
        long,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i64).range(-MAX_OFFSET_DAYS..=MAX_OFFSET_DAYS)
    )]
    pub from: i64,

    /// Last day offset from today (exclusive); may be negative.
    #[arg(
        short,
        long,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i64).range(-MAX_OFFSET_DAYS..=MAX_OFFSET_DAYS)
    )]
    pub to: i64,

    /// Abort the whole run when any date fails to fetch or parse.
    ///
    /// By default a failed date contributes no rows and the run continues.
    #[arg(long)]
    pub strict: bool,

    /// Drop repeated (ticker, date) pairs before storing.
    #[arg(long)]
    pub dedup: bool,

    /// Sets the level of tracing.
    #[arg(long)]
    pub trace: Option<TraceLevel>,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
#[clap(rename_all = "UPPERCASE")]
pub enum TraceLevel {
    DEBUG,
    ERROR,
    INFO,
    TRACE,
    WARN,
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////

#[test]
fn parses_negative_offsets() {
    let cli = Cli::try_parse_from(["earncal", "--db", "earnings.db", "-f", "-3", "-t", "2"]).unwrap();
    assert_eq!(cli.db, "earnings.db");
    assert_eq!(cli.from, -3);
    assert_eq!(cli.to, 2);
    assert!(!cli.strict);
    assert!(!cli.dedup);
    assert_eq!(cli.trace, None);
}

#[test]
fn all_three_flags_are_required() {
    assert!(Cli::try_parse_from(["earncal", "--db", "earnings.db", "-f", "0"]).is_err());
    assert!(Cli::try_parse_from(["earncal", "-f", "0", "-t", "1"]).is_err());
    assert!(Cli::try_parse_from(["earncal", "--db", "x.db", "-f", "zero", "-t", "1"]).is_err());
}

#[test]
fn parses_optional_flags() {
    let cli = Cli::try_parse_from([
        "earncal", "-d", "sqlite::memory:", "-f", "0", "-t", "7", "--strict", "--dedup",
        "--trace", "DEBUG",
    ])
    .unwrap();
    assert!(cli.strict);
    assert!(cli.dedup);
    assert_eq!(cli.trace, Some(TraceLevel::DEBUG));
}

#[test]
fn offsets_beyond_a_century_are_usage_errors() {
    let err = Cli::try_parse_from(["earncal", "-d", "x.db", "-f", "0", "-t", "9223372036854775807"])
        .unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

    assert!(Cli::try_parse_from(["earncal", "-d", "x.db", "-f", "-36601", "-t", "0"]).is_err());
    let cli = Cli::try_parse_from(["earncal", "-d", "x.db", "-f", "-36600", "-t", "36600"]).unwrap();
    assert_eq!((cli.from, cli.to), (-MAX_OFFSET_DAYS, MAX_OFFSET_DAYS));
}
