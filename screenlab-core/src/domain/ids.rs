use super::Bar;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic condition hash (canonical JSON of a compiled condition tree)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryHash(pub String);

impl QueryHash {
    pub fn from_hash(hash: &str) -> Self {
        Self(hash.to_string())
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }
}

impl fmt::Display for QueryHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic dataset hash (content hash of the bars a screen ran over)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    pub fn from_hash(hash: &str) -> Self {
        Self(hash.to_string())
    }

    /// Hash symbol, date and OHLCV of every bar in iteration order.
    pub fn of_bars<'a>(bars: impl IntoIterator<Item = &'a Bar>) -> Self {
        let mut hasher = blake3::Hasher::new();
        for bar in bars {
            hasher.update(bar.symbol.as_bytes());
            hasher.update(bar.date.to_string().as_bytes());
            for v in [bar.open, bar.high, bar.low, bar.close, bar.volume] {
                hasher.update(&v.to_le_bytes());
            }
        }
        Self(hasher.finalize().to_hex().to_string())
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic screen ID (condition + dataset)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenId {
    pub query_hash: QueryHash,
    pub dataset_hash: DatasetHash,
}

impl ScreenId {
    pub fn new(query_hash: QueryHash, dataset_hash: DatasetHash) -> Self {
        Self {
            query_hash,
            dataset_hash,
        }
    }

    /// Uses BLAKE3 for stable hashing across builds/platforms
    pub fn hash(&self) -> String {
        use serde_json::json;

        let canonical = json!({
            "dataset_hash": &self.dataset_hash.0,
            "query_hash": &self.query_hash.0,
        });
        blake3::hash(canonical.to_string().as_bytes())
            .to_hex()
            .to_string()
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.query_hash, self.dataset_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(symbol: &str, close: f64) -> Bar {
        Bar {
            symbol: symbol.into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn dataset_hash_is_deterministic() {
        let bars = vec![bar("AAA", 10.0), bar("BBB", 20.0)];
        assert_eq!(DatasetHash::of_bars(&bars), DatasetHash::of_bars(&bars));
    }

    #[test]
    fn dataset_hash_sees_price_changes() {
        let a = vec![bar("AAA", 10.0)];
        let b = vec![bar("AAA", 10.5)];
        assert_ne!(DatasetHash::of_bars(&a), DatasetHash::of_bars(&b));
    }

    #[test]
    fn screen_id_hash_depends_on_both_parts() {
        let q1 = QueryHash::from_bytes(b"rsi > 70");
        let q2 = QueryHash::from_bytes(b"rsi < 30");
        let d = DatasetHash::from_hash("abc");
        let a = ScreenId::new(q1, d.clone()).hash();
        let b = ScreenId::new(q2, d).hash();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }
}
