//! Converts the loosely structured upstream payload into a dense
//! date-to-rate mapping.

use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Extracts `date -> rate` pairs for the given quote currency.
///
/// The payload is untrusted: any date entry missing the expected shape or
/// the quote-currency key is omitted rather than treated as an error, and an
/// entirely malformed payload yields an empty map. Downstream stages read an
/// empty map as "no data for any day".
pub fn rates_by_date(payload: &Value, quote_currency: &str) -> BTreeMap<NaiveDate, f64> {
    let mut rates = BTreeMap::new();

    let Some(entries) = payload.get("rates").and_then(Value::as_object) else {
        debug!("Payload has no usable rates collection");
        return rates;
    };

    for (date_str, entry) in entries {
        let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") else {
            debug!("Skipping unparseable rate date: {date_str}");
            continue;
        };
        if let Some(rate) = entry.get(quote_currency).and_then(Value::as_f64) {
            rates.insert(date, rate);
        }
    }

    debug!("Normalized {} rate entries", rates.len());
    rates
}
