//! Batch shipment CSV input.

use std::{
    collections::HashSet,
    fs::File,
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{Shipment, ShipmentFailure};

pub const REQUIRED_COLUMNS: [&str; 10] = [
    "shipment_id",
    "ship_date",
    "length_cm",
    "width_cm",
    "height_cm",
    "pieces",
    "actual_weight_kg",
    "max_transit_days",
    "container_utilization",
    "direction",
];

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to open shipments file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("shipments file has no header row")]
    MissingHeader,
    #[error("shipments file is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Parsed batch: the usable shipments plus rows that could not be read.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShipmentBatch {
    pub shipments: Vec<Shipment>,
    pub rejected: Vec<ShipmentFailure>,
}

pub fn load_shipments(path: &Path) -> Result<ShipmentBatch, SchemaError> {
    let file = File::open(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let batch = read_shipments(file)?;
    info!(
        path = %path.display(),
        accepted = batch.shipments.len(),
        rejected = batch.rejected.len(),
        "loaded shipments"
    );
    Ok(batch)
}

/// Reads a shipment CSV. A missing column fails the whole batch; a malformed row
/// only rejects that row.
pub fn read_shipments<R: io::Read>(reader: R) -> Result<ShipmentBatch, SchemaError> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv.headers()?.clone();
    if headers.is_empty() {
        return Err(SchemaError::MissingHeader);
    }
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns(missing));
    }
    let id_idx = headers.iter().position(|h| h == "shipment_id");

    let mut batch = ShipmentBatch::default();
    let mut seen = HashSet::new();

    for (index, record) in csv.records().enumerate() {
        // Header is line 1.
        let line = index + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                batch.rejected.push(ShipmentFailure::new(format!("line {line}"), e));
                continue;
            }
        };
        let label = id_idx
            .and_then(|i| record.get(i))
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("line {line}"));

        match record.deserialize::<Shipment>(Some(&headers)) {
            Ok(shipment) if !seen.insert(shipment.shipment_id.clone()) => {
                batch
                    .rejected
                    .push(ShipmentFailure::new(label, "duplicate shipment_id"));
            }
            Ok(shipment) => batch.shipments.push(shipment),
            Err(e) => batch.rejected.push(ShipmentFailure::new(label, e)),
        }
    }

    for failure in &batch.rejected {
        warn!(shipment_id = %failure.shipment_id, reason = %failure.reason, "rejected shipment row");
    }
    Ok(batch)
}

pub fn write_shipments<W: io::Write>(writer: W, shipments: &[Shipment]) -> Result<(), csv::Error> {
    let mut csv = csv::Writer::from_writer(writer);
    for shipment in shipments {
        csv.serialize(shipment)?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LaneDirection;
    use pretty_assertions::assert_eq;
    use time::macros::date;

    const HEADER: &str = "shipment_id,ship_date,length_cm,width_cm,height_cm,pieces,actual_weight_kg,max_transit_days,container_utilization,direction\n";

    #[test]
    fn reads_well_formed_rows() {
        let input = format!(
            "{HEADER}S0001,2024-01-15,50,40,30,2,20.5,10,0.15,inbound\nS0002, 2024-02-01 ,60,40,30,1,12,30,0.2,outbound\n"
        );
        let batch = read_shipments(input.as_bytes()).unwrap();

        assert!(batch.rejected.is_empty());
        assert_eq!(batch.shipments.len(), 2);
        let first = &batch.shipments[0];
        assert_eq!(first.shipment_id, "S0001");
        assert_eq!(first.ship_date, date!(2024 - 01 - 15));
        assert_eq!(first.pieces, 2);
        assert_eq!(first.incoterm, "FOB");
        assert_eq!(batch.shipments[1].direction, LaneDirection::Outbound);
    }

    #[test]
    fn missing_columns_fail_the_batch() {
        let input = "shipment_id,ship_date,length_cm\nS1,2024-01-01,10\n";
        match read_shipments(input.as_bytes()) {
            Err(SchemaError::MissingColumns(columns)) => {
                assert_eq!(columns.len(), 7);
                assert!(columns.contains(&"direction".to_string()));
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn bad_rows_are_isolated() {
        let input = format!(
            "{HEADER}S1,2024-01-15,50,40,30,2,20,10,0.15,inbound\n\
             S2,2024-01-15,fifty,40,30,2,20,10,0.15,inbound\n\
             S3,2024-01-15,50,40,30,2,20,10,0.15,sideways\n\
             S4,15/01/2024,50,40,30,2,20,10,0.15,inbound\n\
             S1,2024-01-16,50,40,30,2,20,10,0.15,inbound\n\
             S5,2024-01-15,50,40\n\
             S6,2024-01-15,50,40,30,1,20,10,0.15,outbound\n"
        );
        let batch = read_shipments(input.as_bytes()).unwrap();

        let ids: Vec<&str> = batch.shipments.iter().map(|s| s.shipment_id.as_str()).collect();
        assert_eq!(ids, vec!["S1", "S6"]);
        let rejected: Vec<&str> = batch.rejected.iter().map(|f| f.shipment_id.as_str()).collect();
        assert_eq!(rejected, vec!["S2", "S3", "S4", "S1", "line 7"]);
        assert_eq!(batch.rejected[3].reason, "duplicate shipment_id");
    }

    #[test]
    fn typo_in_ship_date_rejects_the_row() {
        let input = format!(
            "{HEADER}S1,2024-02-101,50,40,30,2,20,10,0.15,inbound\n\
             S2,2024-02-10garbage,50,40,30,2,20,10,0.15,inbound\n\
             S3,2024-02-10 00:00:00,50,40,30,2,20,10,0.15,inbound\n"
        );
        let batch = read_shipments(input.as_bytes()).unwrap();

        let rejected: Vec<&str> = batch.rejected.iter().map(|f| f.shipment_id.as_str()).collect();
        assert_eq!(rejected, vec!["S1", "S2"]);
        assert_eq!(batch.shipments.len(), 1);
        assert_eq!(batch.shipments[0].ship_date, date!(2024 - 02 - 10));
    }

    #[test]
    fn written_batches_read_back() {
        let input = format!("{HEADER}S1,2024-01-15,50,40,30,2,20,10,0.15,inbound\n");
        let batch = read_shipments(input.as_bytes()).unwrap();

        let mut buffer = Vec::new();
        write_shipments(&mut buffer, &batch.shipments).unwrap();
        let reread = read_shipments(buffer.as_slice()).unwrap();
        assert_eq!(reread, batch);
    }

    #[test]
    fn unreadable_file_reports_path() {
        let err = load_shipments(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, SchemaError::Io { .. }));
    }
}
