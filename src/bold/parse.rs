//! Result Parser: turns a scraped report page into ordered taxon rows.
//!
//! The page layout is treated as a semi-stable wire format. Everything that
//! knows about HTML structure lives here and in the selector table in
//! `db.rs`, so a service-side redesign is a mapping update, not a rewrite of
//! the retry or batch logic.

use crate::bold::classify::ResponseClassifier;
use crate::bold::db::Database;
use crate::bold::Outcome;
use crate::{BoldError, Result};
use indexmap::IndexMap;
use scraper::{Html, Selector};

/// One ranked row of identification results: rank name to rank value, in the
/// service's display order, with the query's `seqid` injected first.
pub type TaxonRecord = IndexMap<String, String>;

/// Parse a report page into an `Outcome` for `seqid`.
///
/// The no-match phrase is checked before the table lookup and re-checked when
/// the table is absent; a page can carry the phrase in a late-rendered
/// section that a first scan raced past. A missing table with no no-match
/// phrase means the layout changed or the request never reached a report
/// page, and is a `Parse` error for the retry loop to count.
pub fn parse_results(
    page: &str,
    db: Database,
    seqid: &str,
    classifier: &dyn ResponseClassifier,
) -> Result<Outcome> {
    if classifier.is_no_match(page) {
        return Ok(Outcome::NoMatch);
    }

    let document = Html::parse_document(page);
    let table_sel = Selector::parse(db.pane_type().table_selector())
        .map_err(|e| BoldError::Parse(format!("bad table selector: {}", e)))?;

    let table = match document.select(&table_sel).next() {
        Some(table) => table,
        None => {
            if classifier.is_no_match(page) {
                return Ok(Outcome::NoMatch);
            }
            return Err(BoldError::Parse(format!(
                "results table not found for {} (pane {:?})",
                seqid,
                db.pane_type()
            )));
        }
    };

    let tr_sel = Selector::parse("tr").expect("static selector");
    let td_sel = Selector::parse("td").expect("static selector");

    let mut rows = table.select(&tr_sel);

    // First row carries the rank names in display order.
    let ranks: Vec<String> = match rows.next() {
        Some(head) => head
            .select(&td_sel)
            .map(|cell| cell_text(&cell))
            .collect(),
        None => {
            return Err(BoldError::Parse(format!(
                "results table for {} has no rows",
                seqid
            )))
        }
    };

    let mut taxa = Vec::new();
    for row in rows {
        let mut record = TaxonRecord::new();
        record.insert("seqid".to_string(), seqid.to_string());
        for (rank, cell) in ranks.iter().zip(row.select(&td_sel)) {
            record.insert(rank.clone(), cell_text(&cell));
        }
        taxa.push(record);
    }

    Ok(Outcome::Matched(taxa))
}

fn cell_text(cell: &scraper::ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bold::classify::{MarkerClassifier, NO_MATCH_MARKER};

    fn animal_page(rows: &[&[&str]]) -> String {
        let mut body = String::from(
            r#"<html><body><div class="animalTabPane">
            <table class="resultsTable noborder">
            <tr><td>Phylum</td><td>Class</td><td>Order</td><td>Family</td>
            <td>Genus</td><td>Species</td><td>Similarity (%)</td><td>Status</td></tr>"#,
        );
        for row in rows {
            body.push_str("<tr>");
            for cell in *row {
                body.push_str(&format!("<td> {} </td>", cell));
            }
            body.push_str("</tr>");
        }
        body.push_str("</table></div></body></html>");
        body
    }

    #[test]
    fn test_parses_ordered_rows_with_injected_seqid() {
        let page = animal_page(&[
            &["Arthropoda", "Insecta", "Diptera", "Culicidae", "Aedes", "Aedes albopictus", "99.8", "Published"],
            &["Arthropoda", "Insecta", "Diptera", "Culicidae", "Aedes", "Aedes aegypti", "97.1", "Published"],
        ]);

        let outcome =
            parse_results(&page, Database::Cox1, "seq1", &MarkerClassifier).unwrap();
        let taxa = match outcome {
            Outcome::Matched(taxa) => taxa,
            other => panic!("expected Matched, got {:?}", other),
        };

        assert_eq!(taxa.len(), 2);
        let first = &taxa[0];
        let keys: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            ["seqid", "Phylum", "Class", "Order", "Family", "Genus", "Species", "Similarity (%)", "Status"]
        );
        assert_eq!(first["seqid"], "seq1");
        assert_eq!(first["Species"], "Aedes albopictus");
        // Cell text is trimmed of surrounding whitespace.
        assert_eq!(first["Similarity (%)"], "99.8");
        assert_eq!(taxa[1]["Species"], "Aedes aegypti");
    }

    #[test]
    fn test_no_match_marker_wins_over_table_lookup() {
        let page = format!("<html><body><p>{}</p></body></html>", NO_MATCH_MARKER);
        let outcome =
            parse_results(&page, Database::Cox1, "seq2", &MarkerClassifier).unwrap();
        assert_eq!(outcome, Outcome::NoMatch);
    }

    #[test]
    fn test_missing_table_is_parse_error() {
        let page = "<html><body><p>Request queued</p></body></html>";
        let err = parse_results(page, Database::Cox1, "seq1", &MarkerClassifier).unwrap_err();
        assert!(matches!(err, BoldError::Parse(_)));
    }

    #[test]
    fn test_fungi_pane_uses_blast_table_class() {
        let page = r#"<html><body>
            <table class="table resultTable noborder">
            <tr><td>Phylum</td><td>Genus</td><td>Species</td></tr>
            <tr><td>Ascomycota</td><td>Fusarium</td><td>Fusarium oxysporum</td></tr>
            </table></body></html>"#;

        let outcome =
            parse_results(page, Database::Its, "its1", &MarkerClassifier).unwrap();
        let taxa = match outcome {
            Outcome::Matched(taxa) => taxa,
            other => panic!("expected Matched, got {:?}", other),
        };
        assert_eq!(taxa.len(), 1);
        assert_eq!(taxa[0]["Genus"], "Fusarium");

        // The animal selector must not find this table.
        let err = parse_results(page, Database::Cox1, "its1", &MarkerClassifier).unwrap_err();
        assert!(matches!(err, BoldError::Parse(_)));
    }

    #[test]
    fn test_header_only_table_yields_zero_rows() {
        let page = animal_page(&[]);
        let outcome =
            parse_results(&page, Database::Cox1, "seq1", &MarkerClassifier).unwrap();
        assert_eq!(outcome, Outcome::Matched(vec![]));
    }
}
