use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::{Market, QuoteLevel, TimestampMS};

/// Quote snapshot published to the order router buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSnapshot {
    #[serde(rename = "ts")]
    pub timestamp: TimestampMS,
    pub market: String,
    pub mid: f64,
    pub predicted_delta: f64,
    pub confidence: f64,
    pub best_bid: Option<QuoteLevel>,
    pub best_ask: Option<QuoteLevel>,
}

/// Loosely-typed body accepted by the router endpoint.
///
/// Every field may be missing. Numeric fields also accept numeric strings
/// and booleans; anything else that is not a number counts as zero.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialOrderSnapshot {
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub mid: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub predicted_delta: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub best_bid: Option<QuoteLevel>,
    #[serde(default)]
    pub best_ask: Option<QuoteLevel>,
}

impl PartialOrderSnapshot {
    /// Parse a request body. Only a JSON object is accepted; `[]`, `null`
    /// and scalars are rejected like malformed JSON.
    pub fn from_json(body: &[u8]) -> serde_json::Result<Self> {
        match serde_json::from_slice::<Value>(body)? {
            object @ Value::Object(_) => serde_json::from_value(object),
            _ => Err(serde::de::Error::custom("expected a JSON object")),
        }
    }

    /// Fill defaults and stamp the snapshot with `timestamp`
    pub fn into_snapshot(self, timestamp: TimestampMS) -> OrderSnapshot {
        OrderSnapshot {
            timestamp,
            market: self
                .market
                .unwrap_or_else(|| Market::default().symbol().to_string()),
            mid: self.mid.unwrap_or(0.0),
            predicted_delta: self.predicted_delta.unwrap_or(0.0),
            confidence: self.confidence.unwrap_or(0.0),
            best_bid: self.best_bid,
            best_ask: self.best_ask,
        }
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .unwrap_or(0.0),
        Value::Bool(b) => {
            if b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_defaults() {
        let partial: PartialOrderSnapshot = serde_json::from_str("{}").unwrap();
        let snapshot = partial.into_snapshot(42);

        assert_eq!(snapshot.timestamp, 42);
        assert_eq!(snapshot.market, "SEI/USDC");
        assert_eq!(snapshot.mid, 0.0);
        assert_eq!(snapshot.predicted_delta, 0.0);
        assert_eq!(snapshot.confidence, 0.0);
        assert!(snapshot.best_bid.is_none());
        assert!(snapshot.best_ask.is_none());
    }

    #[test]
    fn test_lenient_numbers() {
        let json = r#"{
            "market": "wETH/USDC",
            "mid": "3200.5",
            "predictedDelta": null,
            "confidence": true,
            "bestBid": {"price": 3198.4, "size": 450}
        }"#;
        let snapshot = serde_json::from_str::<PartialOrderSnapshot>(json)
            .unwrap()
            .into_snapshot(1);

        assert_eq!(snapshot.market, "wETH/USDC");
        assert_eq!(snapshot.mid, 3200.5);
        assert_eq!(snapshot.predicted_delta, 0.0);
        assert_eq!(snapshot.confidence, 1.0);
        assert_eq!(snapshot.best_bid, Some(QuoteLevel { price: 3198.4, size: 450.0 }));
    }

    #[test]
    fn test_wire_names() {
        let snapshot = PartialOrderSnapshot::default().into_snapshot(7);
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["ts"], 7);
        assert!(json.get("predictedDelta").is_some());
        assert!(json["bestBid"].is_null());
        assert!(json["bestAsk"].is_null());
    }

    #[test]
    fn test_non_object_rejected() {
        for body in ["null", "not json", "[]", "[1, 2]", "42", r#""mid""#] {
            assert!(
                PartialOrderSnapshot::from_json(body.as_bytes()).is_err(),
                "accepted {}",
                body
            );
        }
        assert!(PartialOrderSnapshot::from_json(b"{}").is_ok());
    }

    #[test]
    fn test_mistyped_fields_rejected() {
        assert!(PartialOrderSnapshot::from_json(br#"{"market": 123}"#).is_err());
        assert!(
            PartialOrderSnapshot::from_json(br#"{"bestBid": {"price": "0.04", "size": 450}}"#)
                .is_err()
        );
    }
}
