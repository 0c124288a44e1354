//! Mapping flagged candidate symbols back to page regions.

use crate::policy::DifferenceSpan;
use crate::types::{NormalizedSymbol, Region, Token};

/// Regions of the tokens behind every flagged symbol, in span order.
///
/// Goes through each symbol's `token_index` rather than the symbol position,
/// since whitespace filtering makes the two lists differ in length. Regions
/// are returned as extracted; adjacent ones are not merged.
pub fn regions_for_span(span: &DifferenceSpan, symbols: &[NormalizedSymbol], tokens: &[Token]) -> Vec<Region> {
    span.indices
        .iter()
        .filter_map(|&index| {
            let Some(symbol) = symbols.get(index) else {
                log::warn!("flagged symbol {} is past the end of {} symbols", index, symbols.len());
                return None;
            };
            match tokens.get(symbol.token_index) {
                Some(token) => Some(token.region),
                None => {
                    log::warn!(
                        "symbol {} refers to token {} but the page has {} tokens",
                        index,
                        symbol.token_index,
                        tokens.len()
                    );
                    None
                }
            }
        })
        .collect()
}
