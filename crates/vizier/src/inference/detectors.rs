//! Per-value type detectors and the registry the classifier draws from.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::FieldType;

// =============================================================================
// LAZY STATIC PATTERNS AND GAZETTEERS
// =============================================================================

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)(https?://|www\.)\S+$").unwrap());

static COORDINATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d{1,3}\.\d{4,}$").unwrap());

static CITIES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "amsterdam", "athens", "atlanta", "austin", "bangkok", "barcelona", "beijing",
        "berlin", "bogota", "boston", "brussels", "budapest", "buenos aires", "cairo",
        "cape town", "chicago", "copenhagen", "dallas", "delhi", "denver", "detroit",
        "dubai", "dublin", "edinburgh", "frankfurt", "geneva", "hamburg", "helsinki",
        "hong kong", "houston", "istanbul", "jakarta", "johannesburg", "karachi",
        "kyiv", "lagos", "lima", "lisbon", "london", "los angeles", "madrid", "manila",
        "melbourne", "mexico city", "miami", "milan", "montreal", "moscow", "mumbai",
        "munich", "nairobi", "new york", "osaka", "oslo", "paris", "philadelphia",
        "phoenix", "prague", "rio de janeiro", "rome", "san diego", "san francisco",
        "santiago", "sao paulo", "seattle", "seoul", "shanghai", "singapore",
        "stockholm", "sydney", "taipei", "tehran", "tokyo", "toronto", "vancouver",
        "vienna", "warsaw", "washington", "zurich",
    ]
    .into_iter()
    .collect()
});

/// ISO 3166-1 alpha-2 and alpha-3 codes with English short names.
static COUNTRIES: &[(&str, &str, &str)] = &[
    ("AF", "AFG", "afghanistan"), ("AL", "ALB", "albania"), ("DZ", "DZA", "algeria"),
    ("AR", "ARG", "argentina"), ("AM", "ARM", "armenia"), ("AU", "AUS", "australia"),
    ("AT", "AUT", "austria"), ("AZ", "AZE", "azerbaijan"), ("BD", "BGD", "bangladesh"),
    ("BY", "BLR", "belarus"), ("BE", "BEL", "belgium"), ("BO", "BOL", "bolivia"),
    ("BA", "BIH", "bosnia and herzegovina"), ("BR", "BRA", "brazil"),
    ("BG", "BGR", "bulgaria"), ("KH", "KHM", "cambodia"), ("CM", "CMR", "cameroon"),
    ("CA", "CAN", "canada"), ("CL", "CHL", "chile"), ("CN", "CHN", "china"),
    ("CO", "COL", "colombia"), ("CR", "CRI", "costa rica"), ("HR", "HRV", "croatia"),
    ("CU", "CUB", "cuba"), ("CY", "CYP", "cyprus"), ("CZ", "CZE", "czechia"),
    ("DK", "DNK", "denmark"), ("DO", "DOM", "dominican republic"),
    ("EC", "ECU", "ecuador"), ("EG", "EGY", "egypt"), ("SV", "SLV", "el salvador"),
    ("EE", "EST", "estonia"), ("ET", "ETH", "ethiopia"), ("FI", "FIN", "finland"),
    ("FR", "FRA", "france"), ("GE", "GEO", "georgia"), ("DE", "DEU", "germany"),
    ("GH", "GHA", "ghana"), ("GR", "GRC", "greece"), ("GT", "GTM", "guatemala"),
    ("HN", "HND", "honduras"), ("HU", "HUN", "hungary"), ("IS", "ISL", "iceland"),
    ("IN", "IND", "india"), ("ID", "IDN", "indonesia"), ("IR", "IRN", "iran"),
    ("IQ", "IRQ", "iraq"), ("IE", "IRL", "ireland"), ("IL", "ISR", "israel"),
    ("IT", "ITA", "italy"), ("JM", "JAM", "jamaica"), ("JP", "JPN", "japan"),
    ("JO", "JOR", "jordan"), ("KZ", "KAZ", "kazakhstan"), ("KE", "KEN", "kenya"),
    ("KR", "KOR", "south korea"), ("KW", "KWT", "kuwait"), ("LV", "LVA", "latvia"),
    ("LB", "LBN", "lebanon"), ("LT", "LTU", "lithuania"), ("LU", "LUX", "luxembourg"),
    ("MY", "MYS", "malaysia"), ("MX", "MEX", "mexico"), ("MA", "MAR", "morocco"),
    ("NP", "NPL", "nepal"), ("NL", "NLD", "netherlands"), ("NZ", "NZL", "new zealand"),
    ("NG", "NGA", "nigeria"), ("NO", "NOR", "norway"), ("PK", "PAK", "pakistan"),
    ("PA", "PAN", "panama"), ("PY", "PRY", "paraguay"), ("PE", "PER", "peru"),
    ("PH", "PHL", "philippines"), ("PL", "POL", "poland"), ("PT", "PRT", "portugal"),
    ("QA", "QAT", "qatar"), ("RO", "ROU", "romania"), ("RU", "RUS", "russia"),
    ("SA", "SAU", "saudi arabia"), ("SN", "SEN", "senegal"), ("RS", "SRB", "serbia"),
    ("SG", "SGP", "singapore"), ("SK", "SVK", "slovakia"), ("SI", "SVN", "slovenia"),
    ("ZA", "ZAF", "south africa"), ("ES", "ESP", "spain"), ("LK", "LKA", "sri lanka"),
    ("SE", "SWE", "sweden"), ("CH", "CHE", "switzerland"), ("SY", "SYR", "syria"),
    ("TW", "TWN", "taiwan"), ("TZ", "TZA", "tanzania"), ("TH", "THA", "thailand"),
    ("TN", "TUN", "tunisia"), ("TR", "TUR", "turkey"), ("UG", "UGA", "uganda"),
    ("UA", "UKR", "ukraine"), ("AE", "ARE", "united arab emirates"),
    ("GB", "GBR", "united kingdom"), ("US", "USA", "united states"),
    ("UY", "URY", "uruguay"), ("UZ", "UZB", "uzbekistan"), ("VE", "VEN", "venezuela"),
    ("VN", "VNM", "vietnam"), ("YE", "YEM", "yemen"), ("ZM", "ZMB", "zambia"),
    ("ZW", "ZWE", "zimbabwe"),
];

static CONTINENTS: &[&str] = &[
    "africa", "antarctica", "asia", "europe", "north america", "oceania",
    "south america", "australia",
];

static MONTHS: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august",
    "september", "october", "november", "december", "jan", "feb", "mar", "apr",
    "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

static WEEKDAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
    "mon", "tue", "tues", "wed", "thu", "thurs", "fri", "sat", "sun",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%b %d, %Y", "%B %d, %Y"];

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M:%S %p"];

// =============================================================================
// DETECTORS
// =============================================================================

/// A per-value test for one field type.
pub trait TypeDetector: Send + Sync {
    /// The type this detector provides evidence for.
    fn field_type(&self) -> FieldType;

    /// Evidence added for each matching value.
    fn weight(&self) -> u32 {
        self.field_type().weight()
    }

    /// Whether a single raw value looks like this type.
    fn test(&self, value: &str) -> bool;
}

/// Detector for one of the built-in field types.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinDetector {
    field_type: FieldType,
}

impl BuiltinDetector {
    pub fn new(field_type: FieldType) -> Self {
        Self { field_type }
    }
}

impl TypeDetector for BuiltinDetector {
    fn field_type(&self) -> FieldType {
        self.field_type
    }

    fn test(&self, value: &str) -> bool {
        let v = value.trim();
        if v.is_empty() {
            return false;
        }

        match self.field_type {
            FieldType::Integer => v.parse::<i64>().is_ok(),
            FieldType::Decimal => v.parse::<f64>().is_ok_and(f64::is_finite),
            FieldType::Boolean => matches!(
                v.to_lowercase().as_str(),
                "true" | "false" | "yes" | "no" | "t" | "f" | "y" | "n"
            ),
            FieldType::String => true,
            FieldType::Text => v.chars().count() >= 50 && v.contains(char::is_whitespace),
            FieldType::Url => URL_PATTERN.is_match(v),
            FieldType::Latitude => coordinate_within(v, 90.0),
            FieldType::Longitude => coordinate_within(v, 180.0),
            FieldType::City => CITIES.contains(v.to_lowercase().as_str()),
            FieldType::CountryCode2 => {
                v.len() == 2 && COUNTRIES.iter().any(|(code, _, _)| *code == v)
            }
            FieldType::CountryCode3 => {
                v.len() == 3 && COUNTRIES.iter().any(|(_, code, _)| *code == v)
            }
            FieldType::CountryName => {
                let lower = v.to_lowercase();
                COUNTRIES.iter().any(|(_, _, name)| *name == lower)
            }
            FieldType::ContinentName => CONTINENTS.contains(&v.to_lowercase().as_str()),
            FieldType::Datetime => DATETIME_FORMATS
                .iter()
                .any(|f| NaiveDateTime::parse_from_str(v, f).is_ok())
                || chrono::DateTime::parse_from_rfc3339(v).is_ok(),
            FieldType::Date => DATE_FORMATS
                .iter()
                .any(|f| NaiveDate::parse_from_str(v, f).is_ok()),
            FieldType::Time => TIME_FORMATS
                .iter()
                .any(|f| NaiveTime::parse_from_str(v, f).is_ok()),
            FieldType::Year => v
                .parse::<i64>()
                .is_ok_and(|y| (1800..=2100).contains(&y)),
            FieldType::Month => MONTHS.contains(&v.to_lowercase().as_str()),
            FieldType::Day => WEEKDAYS.contains(&v.to_lowercase().as_str()),
        }
    }
}

fn coordinate_within(value: &str, bound: f64) -> bool {
    COORDINATE_PATTERN.is_match(value)
        && value
            .parse::<f64>()
            .is_ok_and(|x| x.abs() <= bound)
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Ordered set of detectors consulted by the classifier.
///
/// Registry order is the classifier's tie-break order.
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn TypeDetector>>,
}

impl DetectorRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// One built-in detector per field type, in declaration order.
    pub fn standard() -> Self {
        Self::with_types(&FieldType::ALL)
    }

    /// Built-in detectors for the given types only.
    pub fn with_types(types: &[FieldType]) -> Self {
        let mut registry = Self::empty();
        for &t in types {
            registry.register(BuiltinDetector::new(t));
        }
        registry
    }

    /// Add a detector at the end of the registry.
    pub fn register(&mut self, detector: impl TypeDetector + 'static) {
        self.detectors.push(Box::new(detector));
    }

    pub fn detectors(&self) -> &[Box<dyn TypeDetector>] {
        &self.detectors
    }

    /// Distinct registered types, in first-registered order.
    pub fn field_types(&self) -> Vec<FieldType> {
        let mut seen = HashSet::new();
        self.detectors
            .iter()
            .map(|d| d.field_type())
            .filter(|t| seen.insert(*t))
            .collect()
    }

    pub fn contains(&self, field_type: FieldType) -> bool {
        self.detectors.iter().any(|d| d.field_type() == field_type)
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
