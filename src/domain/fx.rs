//! Latest quote per FX channel with spread and midpoint.

use crate::domain::observation::FxQuote;
use chrono::NaiveDate;

/// Display order of the well-known channels. Others follow alphabetically.
pub const CHANNEL_ORDER: [&str; 5] = ["Oficial", "Blue", "MEP", "CCL", "Cripto"];

#[derive(Debug, Clone, PartialEq)]
pub struct BoardEntry {
    pub fx_type: String,
    pub date: NaiveDate,
    pub buy: Option<f64>,
    pub sell: f64,
    pub spread: Option<f64>,
    pub midpoint: Option<f64>,
}

fn channel_rank(fx_type: &str) -> usize {
    CHANNEL_ORDER
        .iter()
        .position(|c| c.eq_ignore_ascii_case(fx_type))
        .unwrap_or(CHANNEL_ORDER.len())
}

/// The most recent quote of every channel. On a same-day tie the later row wins.
pub fn quote_board(quotes: &[FxQuote]) -> Vec<BoardEntry> {
    let mut latest: Vec<&FxQuote> = Vec::new();
    for quote in quotes.iter().filter(|q| q.sell.is_finite()) {
        match latest.iter_mut().find(|q| q.fx_type == quote.fx_type) {
            Some(existing) if quote.date >= existing.date => *existing = quote,
            Some(_) => {}
            None => latest.push(quote),
        }
    }

    latest.sort_by(|a, b| {
        channel_rank(&a.fx_type)
            .cmp(&channel_rank(&b.fx_type))
            .then_with(|| a.fx_type.cmp(&b.fx_type))
    });

    latest
        .into_iter()
        .map(|q| BoardEntry {
            fx_type: q.fx_type.clone(),
            date: q.date,
            buy: q.buy,
            sell: q.sell,
            spread: q.spread(),
            midpoint: q.midpoint(),
        })
        .collect()
}
