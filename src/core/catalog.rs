use crate::domain::model::FacilityRecord;
use crate::utils::error::{MediBotError, Result};
use std::collections::BTreeSet;

pub const REQUIRED_COLUMNS: [&str; 7] = [
    "center", "services", "address", "phone", "hours", "ratings", "fees",
];

/// Column positions of the required fields within a header row.
struct ColumnIndex {
    center: usize,
    services: usize,
    address: usize,
    phone: usize,
    hours: usize,
    ratings: usize,
    fees: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| MediBotError::malformed_row(1, format!("missing column '{}'", column)))
        };

        Ok(Self {
            center: find("center")?,
            services: find("services")?,
            address: find("address")?,
            phone: find("phone")?,
            hours: find("hours")?,
            ratings: find("ratings")?,
            fees: find("fees")?,
        })
    }
}

/// In-memory facility table, read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct CenterCatalog {
    records: Vec<FacilityRecord>,
}

impl CenterCatalog {
    /// Parses CSV bytes with the header `center,services,address,phone,hours,ratings,fees`.
    /// Any malformed row fails the whole load.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(data);

        let columns = ColumnIndex::from_headers(reader.headers()?)?;
        let mut records = Vec::new();

        for row in reader.records() {
            let row = row?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            records.push(Self::parse_row(&row, &columns, line)?);
        }

        tracing::info!("Loaded {} facility records", records.len());
        Ok(Self { records })
    }

    fn parse_row(row: &csv::StringRecord, columns: &ColumnIndex, line: u64) -> Result<FacilityRecord> {
        let field = |index: usize, column: &str| {
            row.get(index)
                .ok_or_else(|| MediBotError::malformed_row(line, format!("missing column '{}'", column)))
        };

        let services = normalize_services(field(columns.services, "services")?);
        if services.is_empty() {
            return Err(MediBotError::malformed_row(line, "services field is empty"));
        }

        let raw_fee = field(columns.fees, "fees")?.trim();
        let fee = raw_fee
            .parse::<f64>()
            .ok()
            .filter(|fee| fee.is_finite())
            .ok_or_else(|| {
                MediBotError::malformed_row(line, format!("fees value '{}' is not a number", raw_fee))
            })?;

        Ok(FacilityRecord {
            name: field(columns.center, "center")?.trim().to_string(),
            services,
            address: field(columns.address, "address")?.trim().to_string(),
            phone: field(columns.phone, "phone")?.trim().to_string(),
            hours: field(columns.hours, "hours")?.trim().to_string(),
            rating: field(columns.ratings, "ratings")?.trim().to_string(),
            fee,
        })
    }

    pub fn records(&self) -> &[FacilityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Union of every record's service tags.
    pub fn all_service_tags(&self) -> BTreeSet<&str> {
        self.records
            .iter()
            .flat_map(|record| record.services.iter().map(String::as_str))
            .collect()
    }

    /// Records offering a tag that contains `keyword`, in catalog order.
    /// `keyword` is expected to be normalized already.
    pub fn find_by_service(&self, keyword: &str) -> Vec<&FacilityRecord> {
        self.records
            .iter()
            .filter(|record| record.offers(keyword))
            .collect()
    }
}

/// Splits a comma-joined service list into trimmed, lower-cased, distinct tags.
pub fn normalize_services(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',').map(|s| s.trim().to_lowercase()) {
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}
