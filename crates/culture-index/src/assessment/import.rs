use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use serde_json::Value;

use super::domain::RawSubmission;

const REQUIRED_COLUMNS: [&str; 5] = [
    "companyName",
    "respondentName",
    "email",
    "companySize",
    "role",
];

/// One row of a batch export, ready for validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedSubmission {
    pub line: u64,
    pub submission: RawSubmission,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionImportError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
}

/// Reads a survey export whose header names the five form fields; every
/// other column is treated as an answer, in column order.
pub fn read_submissions<R: Read>(reader: R) -> Result<Vec<ImportedSubmission>, SubmissionImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut field_indexes = [0usize; 5];
    for (slot, column) in field_indexes.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|header| header == column)
            .ok_or(SubmissionImportError::MissingColumn(column))?;
    }
    let answer_indexes: Vec<usize> = (0..headers.len())
        .filter(|index| !field_indexes.contains(index))
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        rows.push(ImportedSubmission {
            line,
            submission: row_to_submission(&record, &field_indexes, &answer_indexes),
        });
    }
    Ok(rows)
}

pub fn read_submissions_from_path(
    path: impl AsRef<Path>,
) -> Result<Vec<ImportedSubmission>, SubmissionImportError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| SubmissionImportError::Open {
        path: path.display().to_string(),
        source,
    })?;
    read_submissions(file)
}

fn row_to_submission(
    record: &StringRecord,
    fields: &[usize; 5],
    answers: &[usize],
) -> RawSubmission {
    let text = |index: usize| record.get(index).map(|value| Value::String(value.to_string()));

    RawSubmission {
        company_name: text(fields[0]),
        respondent_name: text(fields[1]),
        email: text(fields[2]),
        company_size: text(fields[3]),
        role: text(fields[4]),
        answers: Some(Value::Array(
            answers
                .iter()
                .filter_map(|index| record.get(*index))
                .map(|value| Value::String(value.to_string()))
                .collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::service::assess;
    use crate::assessment::validation::validate;

    const EXPORT: &str = "\
companyName,respondentName,email,companySize,role,q1,q2,q3,q4,q5,q6,q7,q8,q9,q10
Acme,Ana,ana@acme.com.br,51-200,CEO,5,5,5,5,5,5,5,5,5,5
Beta,Bruno,bruno@beta.com.br,1-10,Sócio,1,2,2,2,2,2,2,2,1,1
";

    #[test]
    fn reads_fields_and_answers_by_header() {
        let rows = read_submissions(EXPORT.as_bytes()).expect("export parses");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 2);

        let first = validate(rows[0].submission.clone()).expect("valid row");
        assert_eq!(first.company_name, "Acme");
        assert_eq!(assess(&first.answers).expect("in range").total_score, 50);

        let second = validate(rows[1].submission.clone()).expect("valid row");
        assert_eq!(
            assess(&second.answers).expect("in range").level_key,
            "Cultura de Emergência Crítica"
        );
    }

    #[test]
    fn missing_form_column_is_reported() {
        let export = "companyName,respondentName,email,role,q1\nAcme,Ana,a@b.c,CEO,5\n";
        let err = read_submissions(export.as_bytes()).expect_err("column missing");
        assert!(matches!(err, SubmissionImportError::MissingColumn("companySize")));
    }

    #[test]
    fn short_rows_fail_validation_not_import() {
        let export = "companyName,respondentName,email,companySize,role,q1\nAcme,Ana\n";
        let rows = read_submissions(export.as_bytes()).expect("flexible rows parse");
        assert!(validate(rows[0].submission.clone()).is_err());
    }
}
