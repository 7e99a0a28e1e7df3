//! Field type enumerations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fine-grained semantic type assigned to a field by the type classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Integer,
    Decimal,
    Boolean,
    String,
    /// Long free-form prose.
    Text,
    Url,
    Latitude,
    Longitude,
    City,
    #[serde(rename = "country_code_2")]
    CountryCode2,
    #[serde(rename = "country_code_3")]
    CountryCode3,
    CountryName,
    ContinentName,
    Datetime,
    Date,
    Time,
    Year,
    Month,
    Day,
}

impl FieldType {
    /// Every field type, in declaration order.
    pub const ALL: [FieldType; 19] = [
        FieldType::Integer,
        FieldType::Decimal,
        FieldType::Boolean,
        FieldType::String,
        FieldType::Text,
        FieldType::Url,
        FieldType::Latitude,
        FieldType::Longitude,
        FieldType::City,
        FieldType::CountryCode2,
        FieldType::CountryCode3,
        FieldType::CountryName,
        FieldType::ContinentName,
        FieldType::Datetime,
        FieldType::Date,
        FieldType::Time,
        FieldType::Year,
        FieldType::Month,
        FieldType::Day,
    ];

    /// The general type this field type belongs to.
    ///
    /// This mapping is the only way a record's general type is ever derived.
    pub fn general_type(self) -> GeneralType {
        match self {
            FieldType::Integer | FieldType::Decimal => GeneralType::Quantitative,
            FieldType::Datetime
            | FieldType::Date
            | FieldType::Time
            | FieldType::Year
            | FieldType::Month
            | FieldType::Day => GeneralType::Temporal,
            FieldType::Boolean
            | FieldType::String
            | FieldType::Text
            | FieldType::Url
            | FieldType::Latitude
            | FieldType::Longitude
            | FieldType::City
            | FieldType::CountryCode2
            | FieldType::CountryCode3
            | FieldType::CountryName
            | FieldType::ContinentName => GeneralType::Categorical,
        }
    }

    /// Evidence weight added per matching sampled value.
    pub fn weight(self) -> u32 {
        match self {
            FieldType::Integer => 6,
            FieldType::Decimal => 4,
            FieldType::Boolean => 7,
            FieldType::String => 1,
            FieldType::Text | FieldType::Url => 8,
            FieldType::Latitude
            | FieldType::Longitude
            | FieldType::City
            | FieldType::CountryCode2
            | FieldType::CountryCode3
            | FieldType::CountryName
            | FieldType::ContinentName => 10,
            FieldType::Datetime | FieldType::Date | FieldType::Time => 3,
            FieldType::Year | FieldType::Month | FieldType::Day => 10,
        }
    }

    /// Types whose distinct values are not worth enumerating.
    pub fn suppresses_unique_values(self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Decimal | FieldType::Datetime)
    }

    /// Stable snake_case name, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Decimal => "decimal",
            FieldType::Boolean => "boolean",
            FieldType::String => "string",
            FieldType::Text => "text",
            FieldType::Url => "url",
            FieldType::Latitude => "latitude",
            FieldType::Longitude => "longitude",
            FieldType::City => "city",
            FieldType::CountryCode2 => "country_code_2",
            FieldType::CountryCode3 => "country_code_3",
            FieldType::CountryName => "country_name",
            FieldType::ContinentName => "continent_name",
            FieldType::Datetime => "datetime",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Year => "year",
            FieldType::Month => "month",
            FieldType::Day => "day",
        }
    }

    /// Look a type up by its snake_case name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse category used to select visualization rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneralType {
    #[serde(rename = "q")]
    Quantitative,
    #[serde(rename = "c")]
    Categorical,
    #[serde(rename = "t")]
    Temporal,
}

impl GeneralType {
    /// Single-letter code used in type-structure tags.
    pub fn code(self) -> &'static str {
        match self {
            GeneralType::Quantitative => "q",
            GeneralType::Categorical => "c",
            GeneralType::Temporal => "t",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_type_mapping() {
        assert_eq!(FieldType::Integer.general_type(), GeneralType::Quantitative);
        assert_eq!(FieldType::Decimal.general_type(), GeneralType::Quantitative);
        assert_eq!(FieldType::Year.general_type(), GeneralType::Temporal);
        assert_eq!(FieldType::Datetime.general_type(), GeneralType::Temporal);
        assert_eq!(FieldType::CountryName.general_type(), GeneralType::Categorical);
        assert_eq!(FieldType::Boolean.general_type(), GeneralType::Categorical);
    }

    #[test]
    fn test_names_round_trip_through_serde() {
        for t in FieldType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
            assert_eq!(FieldType::from_name(t.as_str()), Some(t));
        }
        assert_eq!(FieldType::from_name("float"), None);
    }

    #[test]
    fn test_unique_value_suppression() {
        assert!(FieldType::Integer.suppresses_unique_values());
        assert!(FieldType::Datetime.suppresses_unique_values());
        assert!(!FieldType::Date.suppresses_unique_values());
        assert!(!FieldType::String.suppresses_unique_values());
    }
}
