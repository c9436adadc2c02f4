//! `YYYYMMDD` serialization for request dates.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer, de};

const FORMAT: &str = "%Y%m%d";

pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format(FORMAT))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(&raw, FORMAT).map_err(de::Error::custom)
}
