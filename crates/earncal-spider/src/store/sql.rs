//////////////////////////////////////////////////////////////////
// earning dates
//////////////////////////////////////////////////////////////////

/// `EarningDates` holds one row per (ticker, announcement day); the day is stored as epoch
/// milliseconds. Rows are appended, never upserted.
pub(crate) const CREATE_EARNING_DATES_SQLITE: &'static str = "
    CREATE TABLE IF NOT EXISTS EarningDates (
        ticker TEXT NOT NULL,
        date INTEGER NOT NULL
    )
";

pub(crate) const CREATE_EARNING_DATES_PG: &'static str = "
    CREATE TABLE IF NOT EXISTS EarningDates (
        ticker TEXT NOT NULL,
        date BIGINT NOT NULL
    )
";

const INSERT_EARNING_DATES: &'static str = "INSERT INTO EarningDates (ticker, date) VALUES ";

/// Rows per INSERT statement; 2 binds per row keeps both SQLite (32,766) and PostgreSQL
/// (65,535) under their bind parameter limits.
pub(crate) const ROWS_PER_INSERT: usize = 10_000;

/// Bind parameter style of the target database.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Placeholder {
    /// `?1, ?2, ...`
    Sqlite,
    /// `$1, $2, ...`
    Postgres,
}

/// Multi-row `INSERT INTO EarningDates` with `rows` bound `(ticker, date)` pairs.
pub(crate) fn insert_earning_dates(rows: usize, style: Placeholder) -> String {
    let prefix = match style {
        Placeholder::Sqlite => '?',
        Placeholder::Postgres => '$',
    };
    let values: Vec<String> = (0..rows)
        .map(|i| format!("({p}{}, {p}{})", 2 * i + 1, 2 * i + 2, p = prefix))
        .collect();
    format!("{INSERT_EARNING_DATES}{}", values.join(", "))
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////

#[test]
fn insert_binds_two_params_per_row() {
    assert_eq!(
        insert_earning_dates(2, Placeholder::Postgres),
        "INSERT INTO EarningDates (ticker, date) VALUES ($1, $2), ($3, $4)"
    );
    assert_eq!(
        insert_earning_dates(1, Placeholder::Sqlite),
        "INSERT INTO EarningDates (ticker, date) VALUES (?1, ?2)"
    );
}
