//! Bank table extraction.
//!
//! The table is found positionally: start at the captioned image block
//! that precedes it and step forward a fixed number of elements in
//! document order. The page gives the table no id or class of its own,
//! so any markup change between the anchor and the table moves the
//! target. Fixture tests pin the current behaviour.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::error::{EtlError, Result};
use crate::models::BankRecord;

/// Segment of the split row text holding the bank name
const NAME_SEGMENT: usize = 2;

/// Structural path from a stable anchor to the bank table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRule {
    /// CSS selector of the anchor element (first match wins)
    pub anchor: String,
    /// Elements to step over, in document order, from the anchor to the table
    pub hops: usize,
}

impl Default for ExtractionRule {
    fn default() -> Self {
        Self {
            anchor: "div.thumb.tmulti.tright".to_string(),
            hops: 10,
        }
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| EtlError::Parse(format!("invalid selector '{}': {:?}", css, e)))
}

/// Walk the rule's path and return the data rows of the table it lands on,
/// header row excluded.
fn locate_rows<'a>(document: &'a Html, rule: &ExtractionRule) -> Result<Vec<ElementRef<'a>>> {
    let anchor_selector = selector(&rule.anchor)?;
    let anchor = document
        .select(&anchor_selector)
        .next()
        .ok_or_else(|| EtlError::Parse(format!("anchor '{}' not found", rule.anchor)))?;

    // every element in document order, like successive next-element steps
    let elements: Vec<ElementRef<'a>> = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .collect();

    let start = elements
        .iter()
        .position(|e| e.id() == anchor.id())
        .ok_or_else(|| EtlError::Parse(format!("anchor '{}' not in document tree", rule.anchor)))?;

    let target = elements.get(start + rule.hops).ok_or_else(|| {
        EtlError::Parse(format!(
            "no element {} hops after anchor '{}'",
            rule.hops, rule.anchor
        ))
    })?;
    debug!("Extraction target is <{}>", target.value().name());

    let tbody = target
        .select(&selector("tbody")?)
        .next()
        .ok_or_else(|| {
            EtlError::Parse(format!(
                "element <{}> at the end of the path has no tbody",
                target.value().name()
            ))
        })?;

    Ok(tbody.select(&selector("tr")?).skip(1).collect())
}

/// Turn one table row into a bank record.
///
/// The row's text is trimmed and split on newlines: the name is the third
/// segment, the market cap the last one.
fn parse_row(row: &ElementRef<'_>, index: usize) -> Result<BankRecord> {
    let text: String = row.text().collect();
    let segments: Vec<&str> = text.trim().split('\n').collect();

    let name = segments
        .get(NAME_SEGMENT)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            EtlError::Parse(format!(
                "row {} has no bank name (segments: {:?})",
                index, segments
            ))
        })?;

    let raw_cap = segments.last().map(|s| s.trim()).unwrap_or_default();
    let market_cap: f64 = raw_cap.parse().map_err(|_| {
        EtlError::Parse(format!("row {}: market cap '{}' is not a number", index, raw_cap))
    })?;
    if !market_cap.is_finite() || market_cap < 0.0 {
        return Err(EtlError::Parse(format!(
            "row {}: market cap {} is not a non-negative amount",
            index, market_cap
        )));
    }

    Ok(BankRecord {
        name: name.to_string(),
        market_cap_usd_billion: market_cap,
    })
}

/// Extract the bank table from page markup, in page order
pub fn extract_banks(html: &str, rule: &ExtractionRule) -> Result<Vec<BankRecord>> {
    let document = Html::parse_document(html);
    let rows = locate_rows(&document, rule)?;

    let banks = rows
        .iter()
        .enumerate()
        .map(|(i, row)| parse_row(row, i + 1))
        .collect::<Result<Vec<_>>>()?;

    info!("Extracted {} banks", banks.len());
    Ok(banks)
}
