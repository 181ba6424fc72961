use super::CatalogError;
use super::traits::TabularFile;
use crate::core::models::annotation::{AnnotatedEntry, Annotation};
use crate::core::models::entry::Entry;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::io::{Read, Write};
use std::str::FromStr;
use tracing::warn;

const LIST_SEPARATOR: char = ';';

/// Header of a raw catalog, in column order.
pub const ENTRY_COLUMNS: [&str; 9] = [
    "entry_id",
    "organism",
    "protein_name",
    "domains",
    "length",
    "structure_id",
    "genome_type",
    "host_category",
    "references",
];

/// Columns an annotated catalog appends after [`ENTRY_COLUMNS`].
pub const ANNOTATION_COLUMNS: [&str; 6] = [
    "inferred_family",
    "capsid_role",
    "architecture_class",
    "t_number",
    "virion_morphology",
    "evidence_level",
];

/// One CSV row as read, before any cell is interpreted. Every column except
/// `entry_id` may be absent from the file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogRow {
    entry_id: Option<String>,
    organism: Option<String>,
    protein_name: Option<String>,
    domains: Option<String>,
    length: Option<String>,
    structure_id: Option<String>,
    genome_type: Option<String>,
    host_category: Option<String>,
    references: Option<String>,
    inferred_family: Option<String>,
    capsid_role: Option<String>,
    architecture_class: Option<String>,
    t_number: Option<String>,
    virion_morphology: Option<String>,
    evidence_level: Option<String>,
}

#[derive(Debug, Serialize)]
struct EntryColumns<'a> {
    entry_id: &'a str,
    organism: &'a str,
    protein_name: &'a str,
    domains: String,
    length: Option<u32>,
    structure_id: &'a str,
    genome_type: &'static str,
    host_category: &'static str,
    references: String,
}

impl<'a> From<&'a Entry> for EntryColumns<'a> {
    fn from(entry: &'a Entry) -> Self {
        Self {
            entry_id: &entry.id,
            organism: &entry.organism,
            protein_name: &entry.protein_name,
            domains: join_list(entry.domains()),
            length: entry.length,
            structure_id: entry.structure_id.as_deref().unwrap_or(""),
            genome_type: entry.genome_type.as_str(),
            host_category: entry.host_category.as_str(),
            references: join_list(&entry.references),
        }
    }
}

/// Annotated rows repeat the entry columns; `genome_type` carries the
/// resolved value from the annotation.
#[derive(Debug, Serialize)]
struct AnnotatedColumns<'a> {
    entry_id: &'a str,
    organism: &'a str,
    protein_name: &'a str,
    domains: String,
    length: Option<u32>,
    structure_id: &'a str,
    genome_type: &'static str,
    host_category: &'static str,
    references: String,
    inferred_family: &'a str,
    capsid_role: &'static str,
    architecture_class: &'static str,
    t_number: &'static str,
    virion_morphology: &'static str,
    evidence_level: &'static str,
}

impl<'a> From<&'a AnnotatedEntry> for AnnotatedColumns<'a> {
    fn from(annotated: &'a AnnotatedEntry) -> Self {
        let EntryColumns {
            entry_id,
            organism,
            protein_name,
            domains,
            length,
            structure_id,
            host_category,
            references,
            ..
        } = EntryColumns::from(&annotated.entry);
        let a = &annotated.annotation;
        Self {
            entry_id,
            organism,
            protein_name,
            domains,
            length,
            structure_id,
            genome_type: a.genome_type.as_str(),
            host_category,
            references,
            inferred_family: a.inferred_family.as_deref().unwrap_or(""),
            capsid_role: a.capsid_role.as_str(),
            architecture_class: a.architecture_class.as_str(),
            t_number: a.t_number.as_str(),
            virion_morphology: a.virion_morphology.as_str(),
            evidence_level: a.evidence_level.as_str(),
        }
    }
}

fn join_list(items: &[String]) -> String {
    items.join(&LIST_SEPARATOR.to_string())
}

fn split_list(cell: Option<&str>) -> Vec<&str> {
    cell.map(|c| {
        c.split(LIST_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

fn non_blank(cell: &Option<String>) -> Option<&str> {
    cell.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Parses a vocabulary cell, logging and defaulting anything unrecognized.
fn lenient<T>(cell: &Option<String>, column: &'static str, entry_id: &str) -> T
where
    T: FromStr + Default,
    T::Err: Display,
{
    match non_blank(cell) {
        None => T::default(),
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            warn!(entry_id, column, error = %e, "Malformed cell; using default.");
            T::default()
        }),
    }
}

fn lenient_length(cell: &Option<String>, entry_id: &str) -> Option<u32> {
    let raw = non_blank(cell)?;
    match raw.parse::<u32>() {
        Ok(length) if length > 0 => Some(length),
        _ => {
            warn!(entry_id, column = "length", value = raw, "Malformed length; treating as absent.");
            None
        }
    }
}

impl CatalogRow {
    fn into_entry(self) -> Option<Entry> {
        let id = non_blank(&self.entry_id)?.to_string();
        let mut entry = Entry::new(&id)
            .with_organism(non_blank(&self.organism).unwrap_or(""))
            .with_protein_name(non_blank(&self.protein_name).unwrap_or(""))
            .with_domains(split_list(self.domains.as_deref()))
            .with_structure(non_blank(&self.structure_id).unwrap_or(""))
            .with_genome_type(lenient(&self.genome_type, "genome_type", &id))
            .with_host_category(lenient(&self.host_category, "host_category", &id))
            .with_references(split_list(self.references.as_deref()));
        entry.length = lenient_length(&self.length, &id);
        Some(entry)
    }

    fn annotation(&self, id: &str) -> Annotation {
        Annotation {
            capsid_role: lenient(&self.capsid_role, "capsid_role", id),
            architecture_class: lenient(&self.architecture_class, "architecture_class", id),
            genome_type: lenient(&self.genome_type, "genome_type", id),
            t_number: lenient(&self.t_number, "t_number", id),
            evidence_level: lenient(&self.evidence_level, "evidence_level", id),
            inferred_family: non_blank(&self.inferred_family).map(str::to_string),
            virion_morphology: lenient(&self.virion_morphology, "virion_morphology", id),
        }
    }
}

fn read_rows(reader: impl Read) -> Result<Vec<CatalogRow>, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let has_id_column = csv_reader.headers()?.iter().any(|h| h == "entry_id");
    if !has_id_column {
        return Err(CatalogError::MissingColumn("entry_id"));
    }

    let mut rows = Vec::new();
    for (index, result) in csv_reader.deserialize::<CatalogRow>().enumerate() {
        let row = result?;
        if non_blank(&row.entry_id).is_none() {
            warn!(row = index + 1, "Row without entry_id skipped.");
            continue;
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Raw catalog: one [`Entry`] per row.
pub struct CatalogFile;

impl TabularFile for CatalogFile {
    type Record = Vec<Entry>;
    type Error = CatalogError;

    fn read_from(reader: impl Read) -> Result<Self::Record, Self::Error> {
        Ok(read_rows(reader)?
            .into_iter()
            .filter_map(CatalogRow::into_entry)
            .collect())
    }

    fn write_to(record: &Self::Record, writer: impl Write) -> Result<(), Self::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        // serde only emits a header alongside the first row.
        if record.is_empty() {
            csv_writer.write_record(ENTRY_COLUMNS)?;
        }
        for entry in record {
            csv_writer.serialize(EntryColumns::from(entry))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Annotated catalog: entry columns followed by the annotation columns.
pub struct AnnotatedCatalogFile;

impl TabularFile for AnnotatedCatalogFile {
    type Record = Vec<AnnotatedEntry>;
    type Error = CatalogError;

    fn read_from(reader: impl Read) -> Result<Self::Record, Self::Error> {
        Ok(read_rows(reader)?
            .into_iter()
            .filter_map(|row| {
                let annotation = row.annotation(non_blank(&row.entry_id)?);
                let entry = row.into_entry()?;
                Some(AnnotatedEntry { entry, annotation })
            })
            .collect())
    }

    fn write_to(record: &Self::Record, writer: impl Write) -> Result<(), Self::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        if record.is_empty() {
            csv_writer.write_record(ENTRY_COLUMNS.iter().chain(&ANNOTATION_COLUMNS))?;
        }
        for annotated in record {
            csv_writer.serialize(AnnotatedColumns::from(annotated))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::annotation::{
        ArchitectureClass, CapsidRole, EvidenceLevel, TNumber, VirionMorphology,
    };
    use crate::core::models::entry::{GenomeType, HostCategory};

    #[test]
    fn empty_catalogs_keep_their_header_and_read_back_empty() {
        let mut raw = Vec::new();
        CatalogFile::write_to(&Vec::new(), &mut raw).unwrap();
        assert_eq!(String::from_utf8(raw.clone()).unwrap().trim_end(), ENTRY_COLUMNS.join(","));
        assert!(CatalogFile::read_from(raw.as_slice()).unwrap().is_empty());

        let mut annotated = Vec::new();
        AnnotatedCatalogFile::write_to(&Vec::new(), &mut annotated).unwrap();
        assert!(!annotated.is_empty());
        assert!(AnnotatedCatalogFile::read_from(annotated.as_slice()).unwrap().is_empty());
    }

    #[test]
    fn header_constants_match_serialized_rows() {
        let entry = Entry::new("P1");
        let mut raw = Vec::new();
        CatalogFile::write_to(&vec![entry.clone()], &mut raw).unwrap();
        let raw = String::from_utf8(raw).unwrap();
        assert_eq!(raw.lines().next(), Some(ENTRY_COLUMNS.join(",").as_str()));

        let mut annotated = Vec::new();
        let record = vec![AnnotatedEntry {
            entry,
            annotation: Annotation::default(),
        }];
        AnnotatedCatalogFile::write_to(&record, &mut annotated).unwrap();
        let expected: Vec<&str> = ENTRY_COLUMNS.iter().chain(&ANNOTATION_COLUMNS).copied().collect();
        assert_eq!(
            String::from_utf8(annotated).unwrap().lines().next(),
            Some(expected.join(",").as_str())
        );
    }

    #[test]
    fn reads_sparse_catalog_with_extra_columns() {
        let csv = "entry_id,protein_name,domains,length,notes\n\
                   P1,capsid protein VP1,PF00740.21; pf00729,735,ignored\n\
                   P2,,,,\n";
        let entries = CatalogFile::read_from(csv.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].domains(), &["PF00740".to_string(), "PF00729".to_string()]);
        assert_eq!(entries[0].length, Some(735));
        assert_eq!(entries[1].protein_name, "");
        assert_eq!(entries[1].length, None);
        assert_eq!(entries[1].genome_type, GenomeType::Unknown);
    }

    #[test]
    fn malformed_cells_fall_back_to_defaults() {
        let csv = "entry_id,length,genome_type,host_category\n\
                   P1,abc,retroid,Eukaryota_Plant\n\
                   P2,0,dsDNA,martian\n";
        let entries = CatalogFile::read_from(csv.as_bytes()).unwrap();
        assert_eq!(entries[0].length, None);
        assert_eq!(entries[0].genome_type, GenomeType::Unknown);
        assert_eq!(entries[0].host_category, HostCategory::Plant);
        assert_eq!(entries[1].length, None);
        assert_eq!(entries[1].genome_type, GenomeType::DsDna);
        assert_eq!(entries[1].host_category, HostCategory::Unknown);
    }

    #[test]
    fn missing_id_column_is_an_error_and_blank_ids_are_skipped() {
        let err = CatalogFile::read_from("organism\nfoo\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CatalogError::MissingColumn("entry_id")));

        let entries = CatalogFile::read_from("entry_id,organism\n,foo\nP1,bar\n".as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn annotated_catalog_round_trips() {
        let entry = Entry::new("P03135")
            .with_organism("Adeno-associated virus 2")
            .with_protein_name("capsid protein VP1, \"major\"")
            .with_domains(["PF00740", "PF00729"])
            .with_length(735)
            .with_structure("1LP3")
            .with_genome_type(GenomeType::SsDna)
            .with_host_category(HostCategory::Animal)
            .with_references(["PMID:1", "doi:10.1/x"]);
        let annotation = Annotation {
            capsid_role: CapsidRole::Mcp,
            architecture_class: ArchitectureClass::Sjr,
            genome_type: GenomeType::SsDna,
            t_number: TNumber::PseudoT3,
            evidence_level: EvidenceLevel::High,
            inferred_family: Some("Parvoviridae".to_string()),
            virion_morphology: VirionMorphology::Icosahedral,
        };
        let bare = AnnotatedEntry {
            entry: Entry::new("X1"),
            annotation: Annotation::default(),
        };
        let records = vec![AnnotatedEntry { entry, annotation }, bare];

        let mut buffer = Vec::new();
        AnnotatedCatalogFile::write_to(&records, &mut buffer).unwrap();
        let reread = AnnotatedCatalogFile::read_from(buffer.as_slice()).unwrap();
        assert_eq!(reread, records);
    }

    #[test]
    fn raw_catalog_round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.csv");
        let entries = vec![
            Entry::new("A").with_domains(["PF1", "PF2"]).with_length(200),
            Entry::new("B").with_structure("2BUK"),
        ];
        CatalogFile::write_to_path(&entries, &path).unwrap();
        assert_eq!(CatalogFile::read_from_path(&path).unwrap(), entries);
    }
}
