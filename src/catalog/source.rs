use super::columns::CatalogColumns;
use super::types::{Cutoff, CutoffRow, EmbeddedProgram};
use super::weights::{PercentWeightRow, WeightNormalizer};
use super::ProgramCatalog;
use crate::error::CatalogError;
use std::collections::HashMap;
use std::future::Future;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where the raw catalog tables come from.
///
/// Implementations own their transport, timeouts and retries; the joined
/// catalog is only built once both tables have fully arrived.
pub trait CatalogSource {
    fn fetch_weight_table(
        &self,
    ) -> impl Future<Output = Result<Vec<PercentWeightRow>, CatalogError>> + Send;

    fn fetch_cutoff_table(&self) -> impl Future<Output = Result<Vec<CutoffRow>, CatalogError>> + Send;
}

/// Fetch both tables concurrently and join them.
pub async fn load_catalog<S>(source: &S, normalizer: &WeightNormalizer) -> Result<ProgramCatalog, CatalogError>
where
    S: CatalogSource + Sync,
{
    let (weight_rows, cutoff_rows) =
        tokio::try_join!(source.fetch_weight_table(), source.fetch_cutoff_table())?;

    let weight_count = weight_rows.len();
    let catalog = ProgramCatalog::join(weight_rows, cutoff_rows, normalizer);
    info!(
        programs = catalog.len(),
        weight_rows = weight_count,
        scorable = catalog.scorable_count(),
        "catalog loaded"
    );
    Ok(catalog)
}

/// Load a JSON list of programs that embed fractional weights.
pub async fn load_embedded_catalog(
    path: &Path,
    normalizer: &WeightNormalizer,
) -> Result<ProgramCatalog, CatalogError> {
    let origin = path.display().to_string();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| CatalogError::Io {
            origin: origin.clone(),
            source,
        })?;
    let records: Vec<EmbeddedProgram> =
        serde_json::from_slice(&bytes).map_err(|source| CatalogError::Json { origin, source })?;

    let catalog = ProgramCatalog::from_embedded(records, normalizer);
    info!(programs = catalog.len(), "embedded catalog loaded");
    Ok(catalog)
}

/// Reads the two tables from CSV files with a header row.
#[derive(Debug, Clone)]
pub struct CsvCatalogSource {
    weights_path: PathBuf,
    cutoffs_path: PathBuf,
    columns: CatalogColumns,
}

impl CsvCatalogSource {
    pub fn new(
        weights_path: impl Into<PathBuf>,
        cutoffs_path: impl Into<PathBuf>,
        columns: CatalogColumns,
    ) -> Self {
        Self {
            weights_path: weights_path.into(),
            cutoffs_path: cutoffs_path.into(),
            columns,
        }
    }
}

impl CatalogSource for CsvCatalogSource {
    async fn fetch_weight_table(&self) -> Result<Vec<PercentWeightRow>, CatalogError> {
        let origin = self.weights_path.display().to_string();
        let bytes = read_file(&self.weights_path, &origin).await?;
        parse_weight_table(bytes.as_slice(), &self.columns, &origin)
    }

    async fn fetch_cutoff_table(&self) -> Result<Vec<CutoffRow>, CatalogError> {
        let origin = self.cutoffs_path.display().to_string();
        let bytes = read_file(&self.cutoffs_path, &origin).await?;
        parse_cutoff_table(bytes.as_slice(), &self.columns, &origin)
    }
}

/// Serves tables already held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    pub weights: Vec<PercentWeightRow>,
    pub cutoffs: Vec<CutoffRow>,
}

impl CatalogSource for StaticCatalogSource {
    async fn fetch_weight_table(&self) -> Result<Vec<PercentWeightRow>, CatalogError> {
        Ok(self.weights.clone())
    }

    async fn fetch_cutoff_table(&self) -> Result<Vec<CutoffRow>, CatalogError> {
        Ok(self.cutoffs.clone())
    }
}

async fn read_file(path: &Path, origin: &str) -> Result<Vec<u8>, CatalogError> {
    tokio::fs::read(path).await.map_err(|source| CatalogError::Io {
        origin: origin.to_string(),
        source,
    })
}

/// Parse the percentage weight table. Every column other than the code
/// column is kept as a raw cell.
pub fn parse_weight_table<R: Read>(
    reader: R,
    columns: &CatalogColumns,
    origin: &str,
) -> Result<Vec<PercentWeightRow>, CatalogError> {
    let rows = read_rows(reader, origin, "weight", &[columns.code.as_str()])?;

    Ok(rows
        .into_iter()
        .map(|mut cells| {
            let code = cells.remove(&columns.code).unwrap_or_default();
            PercentWeightRow { code, cells }
        })
        .collect())
}

/// Parse the cutoff table.
pub fn parse_cutoff_table<R: Read>(
    reader: R,
    columns: &CatalogColumns,
    origin: &str,
) -> Result<Vec<CutoffRow>, CatalogError> {
    let required = [
        columns.code.as_str(),
        columns.program.as_str(),
        columns.campus.as_str(),
        columns.schedule.as_str(),
        columns.last.as_str(),
        columns.first.as_str(),
    ];
    let rows = read_rows(reader, origin, "cutoff", &required)?;

    Ok(rows
        .into_iter()
        .map(|mut cells| {
            let mut take = |column: &str| cells.remove(column).unwrap_or_default();
            CutoffRow {
                code: take(columns.code.as_str()),
                program: take(columns.program.as_str()),
                campus: take(columns.campus.as_str()),
                schedule: take(columns.schedule.as_str()),
                last: Cutoff::new(take(columns.last.as_str())),
                first: Cutoff::new(take(columns.first.as_str())),
            }
        })
        .collect())
}

fn read_rows<R: Read>(
    reader: R,
    origin: &str,
    table: &'static str,
    required: &[&str],
) -> Result<Vec<HashMap<String, String>>, CatalogError> {
    let csv_error = |source| CatalogError::Csv {
        origin: origin.to_string(),
        source,
    };

    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(csv_error)?.clone();
    if let Some(missing) = required
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(CatalogError::MissingColumn {
            table,
            origin: origin.to_string(),
            column: missing.to_string(),
        });
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(csv_error)?;
        let cells: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        rows.push(cells);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::Subject;

    const WEIGHTS_CSV: &str = "\
CODIGO,LECTURA CRITICA,MATEMATICAS,SOCIALES Y CIDADANAS,CIENCIAS NATURALES,INGLES
101,20,40,10,20,10
202,30,30,20,10,10
";

    const CUTOFFS_CSV: &str = "\
CODIGO,PROGRAMA,SEDE,JORNADA,ULTIMO,PRIMERO
101,Ingeniería Industrial,Sogamoso,Diurna,\"65,10\",\"78,90\"
303,Medicina,Tunja,Diurna,\"80,00\",\"90,00\"
";

    #[test]
    fn test_parse_weight_table() {
        let rows =
            parse_weight_table(WEIGHTS_CSV.as_bytes(), &CatalogColumns::default(), "weights").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].code, "101");
        assert_eq!(rows[0].cells["MATEMATICAS"], "40");
        assert_eq!(rows[1].cells["SOCIALES Y CIDADANAS"], "20");
        assert!(!rows[0].cells.contains_key("CODIGO"));
    }

    #[test]
    fn test_parse_cutoff_table_keeps_comma_decimals() {
        let rows =
            parse_cutoff_table(CUTOFFS_CSV.as_bytes(), &CatalogColumns::default(), "cutoffs").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].program, "Ingeniería Industrial");
        assert_eq!(rows[0].last.raw(), "65,10");
        assert_eq!(rows[0].last.value(), Some(65.1));
    }

    #[test]
    fn test_missing_column_reported() {
        let csv = "CODIGO,PROGRAMA,SEDE,JORNADA,ULTIMO\n101,X,Tunja,Diurna,60\n";
        let err = parse_cutoff_table(csv.as_bytes(), &CatalogColumns::default(), "cutoffs")
            .unwrap_err();
        match err {
            CatalogError::MissingColumn { table, column, .. } => {
                assert_eq!(table, "cutoff");
                assert_eq!(column, "PRIMERO");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_load_catalog_joins_static_tables() {
        let columns = CatalogColumns::default();
        let source = StaticCatalogSource {
            weights: parse_weight_table(WEIGHTS_CSV.as_bytes(), &columns, "weights").unwrap(),
            cutoffs: parse_cutoff_table(CUTOFFS_CSV.as_bytes(), &columns, "cutoffs").unwrap(),
        };
        let catalog = load_catalog(&source, &WeightNormalizer::default()).await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.scorable_count(), 1);
        assert_eq!(
            catalog.lookup_weights("101").unwrap().get(Subject::Mathematics),
            Some(0.4)
        );
    }

    #[tokio::test]
    async fn test_csv_source_reports_missing_file() {
        let dir = std::env::temp_dir();
        let source = CsvCatalogSource::new(
            dir.join("admit_rank_no_such_weights.csv"),
            dir.join("admit_rank_no_such_cutoffs.csv"),
            CatalogColumns::default(),
        );
        let result = load_catalog(&source, &WeightNormalizer::default()).await;
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }
}
