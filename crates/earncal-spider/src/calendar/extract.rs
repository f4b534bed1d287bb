use super::{EarningRow, RawPage};
use crate::Result;
use scraper::{ElementRef, Html, Selector};
use std::borrow::Cow;
use tracing::{debug, trace};

lazy_static::lazy_static! {
    static ref TR: Selector = Selector::parse("tr").expect("static `tr` selector");
    static ref TD: Selector = Selector::parse("td").expect("static `td` selector");
    static ref A: Selector = Selector::parse("a").expect("static `a` selector");
}

/// Pulls earnings rows out of a calendar page.
///
/// The calendar is a loosely nested table: section headers, adverts and separators share the
/// `<tr>` markup of real entries, and entries can sit inside other rows. A row counts as an
/// entry only when its second cell links to a quote page (`quote_prefix`).
#[derive(Clone, Debug)]
pub struct RowExtractor {
    quote_prefix: String,
}

impl RowExtractor {
    pub fn new(quote_prefix: impl Into<String>) -> Self {
        Self {
            quote_prefix: quote_prefix.into(),
        }
    }

    /// Extract every valid row of `page`, stamping each with `epoch_millis`.
    pub fn extract(&self, page: &RawPage, epoch_millis: i64) -> Result<Vec<EarningRow>> {
        let time = std::time::Instant::now();

        let markup = decode(&page.body);
        if let Cow::Owned(_) = markup {
            debug!("calendar page for {} is not UTF-8; read as Latin-1", page.date_key);
        }
        let document = Html::parse_document(&markup);

        let rows: Vec<EarningRow> = candidates(&document)
            .into_iter()
            .filter_map(|tr| self.accept(tr, epoch_millis))
            .collect();

        debug!(
            "{} rows extracted for {}. {}",
            rows.len(),
            page.date_key,
            crate::time_elapsed(time)
        );
        Ok(rows)
    }

    fn accept(&self, tr: ElementRef<'_>, epoch_millis: i64) -> Option<EarningRow> {
        let mut cells = tr.select(&TD);
        let name = cells.next()?;
        let symbol = cells.next()?;

        // only the first link of the ticker cell is considered
        let href = symbol.select(&A).next()?.value().attr("href")?;
        if !href.starts_with(&self.quote_prefix) {
            trace!("rejected row linking to {href}");
            return None;
        }

        Some(EarningRow {
            company_name: name.text().collect(),
            ticker_symbol: symbol.text().collect(),
            epoch_millis,
        })
    }
}

/// Page text: UTF-8 when the bytes are valid UTF-8, otherwise ISO-8859-1, where every byte
/// maps to the code point of the same value. Any byte sequence decodes.
fn decode(body: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(body) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(body.iter().map(|&byte| char::from(byte)).collect()),
    }
}

/// Every `<tr>` in document order, each preceded by all of the rows nested inside it.
///
/// A nested row is therefore visited once per enclosing row and once more on its own.
fn candidates(document: &Html) -> Vec<ElementRef<'_>> {
    let mut trs = Vec::new();
    for tr in document.select(&TR) {
        trs.extend(tr.select(&TR).filter(|inner| inner.id() != tr.id()));
        trs.push(tr);
    }
    trs
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////

#[cfg(test)]
const QUOTE: &str = "http://finance.yahoo.com/q?s=";

#[cfg(test)]
fn run(html: &str) -> Vec<EarningRow> {
    RowExtractor::new(QUOTE)
        .extract(&RawPage::new("20240102", html), 1_704_153_600_000)
        .unwrap()
}

#[test]
fn accepts_row_linking_to_quote_page() {
    let rows = run(
        "<table><tr><td>Acme Corp</td>\
         <td><a href=\"http://finance.yahoo.com/q?s=ACME\">ACME</a></td></tr></table>",
    );
    assert_eq!(
        rows,
        vec![EarningRow {
            company_name: "Acme Corp".to_string(),
            ticker_symbol: "ACME".to_string(),
            epoch_millis: 1_704_153_600_000,
        }]
    );
}

#[test]
fn rejects_single_cell_rows() {
    let rows = run("<table><tr><td><a href=\"http://finance.yahoo.com/q?s=ACME\">ACME</a></td></tr></table>");
    assert!(rows.is_empty());
}

#[test]
fn rejects_foreign_link_prefix() {
    let rows = run(
        "<table><tr><td>Acme Corp</td>\
         <td><a href=\"http://example.com/q?s=ACME\">ACME</a></td></tr></table>",
    );
    assert!(rows.is_empty());
}

#[test]
fn rejects_rows_without_link_or_href() {
    let rows = run(
        "<table>\
         <tr><td>Company</td><td>Symbol</td></tr>\
         <tr><td>Acme Corp</td><td><a name=\"acme\">ACME</a></td></tr>\
         </table>",
    );
    assert!(rows.is_empty());
}

#[test]
fn only_first_link_of_ticker_cell_counts() {
    let rows = run(
        "<table><tr><td>Acme Corp</td>\
         <td><a href=\"/ads\">ad</a><a href=\"http://finance.yahoo.com/q?s=ACME\">ACME</a></td>\
         </tr></table>",
    );
    assert!(rows.is_empty());
}

#[test]
fn ticker_is_cell_text_not_link_text() {
    let rows = run(
        "<table><tr><td>Acme <b>Corp</b></td>\
         <td><a href=\"http://finance.yahoo.com/q?s=ACME\">ACME</a> (N)</td></tr></table>",
    );
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].company_name, "Acme Corp");
    assert_eq!(rows[0].ticker_symbol, "ACME (N)");
}

#[test]
fn nested_rows_precede_their_parent() {
    let rows = run(
        "<table><tr>\
         <td>Outer Inc</td>\
         <td><a href=\"http://finance.yahoo.com/q?s=OUT\">OUT</a></td>\
         <td><table><tr>\
           <td>Inner Co</td>\
           <td><a href=\"http://finance.yahoo.com/q?s=INN\">INN</a></td>\
         </tr></table></td>\
         </tr></table>",
    );
    let tickers: Vec<&str> = rows.iter().map(|r| r.ticker_symbol.as_str()).collect();
    assert_eq!(tickers, ["INN", "OUT", "INN"]);
}

#[test]
fn latin1_page_keeps_every_row() {
    let mut body = b"<html><head><meta charset=\"iso-8859-1\"></head><body><table>\
        <tr><td>Soci\xe9t\xe9 G\xe9n\xe9rale</td>\
        <td><a href=\"http://finance.yahoo.com/q?s=GLE.PA\">GLE.PA</a></td></tr>"
        .to_vec();
    body.extend_from_slice(
        b"<tr><td>Acme Corp</td>\
        <td><a href=\"http://finance.yahoo.com/q?s=ACME\">ACME</a></td></tr>\
        </table></body></html>",
    );
    let page = RawPage::new("20240102", body);

    let rows = RowExtractor::new(QUOTE).extract(&page, 7).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].company_name, "Soci\u{e9}t\u{e9} G\u{e9}n\u{e9}rale");
    assert_eq!(rows[0].ticker_symbol, "GLE.PA");
    assert_eq!(rows[1].ticker_symbol, "ACME");
    assert_eq!(rows[1].epoch_millis, 7);
}

#[test]
fn utf8_page_is_read_as_utf8() {
    let rows = run(
        "<table><tr><td>Soci\u{e9}t\u{e9} G\u{e9}n\u{e9}rale</td>\
         <td><a href=\"http://finance.yahoo.com/q?s=GLE.PA\">GLE.PA</a></td></tr></table>",
    );
    assert_eq!(rows[0].company_name, "Soci\u{e9}t\u{e9} G\u{e9}n\u{e9}rale");
}

#[test]
fn page_without_tables_yields_nothing() {
    assert!(run("<html><body><p>No earnings today.</p></body></html>").is_empty());
}
