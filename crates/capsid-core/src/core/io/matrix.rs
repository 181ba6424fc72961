use super::CatalogError;
use super::traits::TabularFile;
use crate::core::similarity::SimilarityMatrix;
use std::io::{Read, Write};

const ID_HEADER: &str = "entry_id";

/// Square similarity matrix: header `entry_id,<id1>,<id2>,...`, one row per
/// identifier in header order. Missing scores are empty cells.
pub struct MatrixFile;

impl TabularFile for MatrixFile {
    type Record = SimilarityMatrix;
    type Error = CatalogError;

    fn read_from(reader: impl Read) -> Result<Self::Record, Self::Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let mut columns = headers.iter();
        if columns.next() != Some(ID_HEADER) {
            return Err(CatalogError::MissingColumn(ID_HEADER));
        }
        let ids: Vec<String> = columns.map(str::to_string).collect();
        let mut matrix = SimilarityMatrix::new(ids.clone())?;

        let mut cells: Vec<Vec<Option<f64>>> = Vec::with_capacity(ids.len());
        for (i, result) in csv_reader.records().enumerate() {
            let record = result?;
            let line = i + 2;
            let row_id = record.get(0).unwrap_or_default();
            if ids.get(i).map(String::as_str) != Some(row_id) {
                return Err(CatalogError::Malformed {
                    line,
                    message: format!("row '{row_id}' does not follow header order"),
                });
            }
            let row = record
                .iter()
                .skip(1)
                .map(|cell| parse_cell(cell, line))
                .collect::<Result<Vec<_>, _>>()?;
            if row.len() != ids.len() {
                return Err(CatalogError::Malformed {
                    line,
                    message: format!("expected {} scores, found {}", ids.len(), row.len()),
                });
            }
            cells.push(row);
        }
        if cells.len() != ids.len() {
            return Err(CatalogError::Malformed {
                line: cells.len() + 2,
                message: format!("expected {} rows, found {}", ids.len(), cells.len()),
            });
        }

        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                match (cells[i][j], cells[j][i]) {
                    (Some(upper), Some(lower)) if upper == lower => {
                        matrix.set(&ids[i], &ids[j], upper)?;
                    }
                    (None, None) => {}
                    _ => {
                        return Err(CatalogError::Malformed {
                            line: i + 2,
                            message: format!("asymmetric cell for ({}, {})", ids[i], ids[j]),
                        });
                    }
                }
            }
        }
        Ok(matrix)
    }

    fn write_to(record: &Self::Record, writer: impl Write) -> Result<(), Self::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let ids = record.ids();

        let mut header = Vec::with_capacity(ids.len() + 1);
        header.push(ID_HEADER.to_string());
        header.extend(ids.iter().cloned());
        csv_writer.write_record(&header)?;

        for (i, id) in ids.iter().enumerate() {
            let mut row = Vec::with_capacity(ids.len() + 1);
            row.push(id.clone());
            row.extend((0..ids.len()).map(|j| match record.get_by_index(i, j) {
                Some(score) => score.to_string(),
                None => String::new(),
            }));
            csv_writer.write_record(&row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

fn parse_cell(cell: &str, line: usize) -> Result<Option<f64>, CatalogError> {
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|_| CatalogError::Malformed {
            line,
            message: format!("'{cell}' is not a score"),
        })
}
