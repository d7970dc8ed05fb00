use csv::{Terminator, WriterBuilder};

use super::ExportError;
use crate::format::format_raw;
use crate::views::AccessibleTable;

/// Header line plus one line per table row, comma separated and
/// `\n` terminated. Missing values are empty fields.
pub fn table_to_csv(table: &AccessibleTable) -> Result<String, ExportError> {
    if table.is_empty() {
        return Err(ExportError::MissingTable);
    }
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::with_capacity(table.rows.len() * 64));
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        let mut record = Vec::with_capacity(row.cells.len() + 1);
        record.push(row.year.to_string());
        record.extend(row.cells.iter().map(|c| c.value.map(format_raw).unwrap_or_default()));
        writer.write_record(&record)?;
    }
    let bytes = writer.into_inner().map_err(|e| ExportError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PAGE_24;
    use crate::i18n::Language;
    use crate::model::{Dataset, TotalPolicy, YearRecord};

    fn table(records: Vec<YearRecord>, lang: Language) -> AccessibleTable {
        AccessibleTable::build(&PAGE_24, &Dataset::from_records(records), lang, TotalPolicy::PreferProvided)
    }

    #[test]
    fn three_rows_make_four_lines() {
        let t = table(
            vec![
                YearRecord::new(2020).with("oil_gas", 1.5).with("electricity", 2.0).with("other", 3.0),
                YearRecord::new(2021).with("oil_gas", 1_234.25),
                YearRecord::new(2022).with("total", 9.0),
            ],
            Language::En,
        );
        let out = table_to_csv(&t).unwrap();
        assert!(out.ends_with('\n'));
        assert!(!out.contains('\r'));
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        let header_fields = lines[0].split(',').count();
        assert!(lines.iter().all(|l| l.split(',').count() == header_fields));
        assert_eq!(lines[0], "Year,Oil and gas,Electricity,Other,Total");
        assert_eq!(lines[1], "2020,1.5,2,3,6.5");
        assert_eq!(lines[2], "2021,1234.25,,,1234.25");
        assert_eq!(lines[3], "2022,,,,9");
    }

    #[test]
    fn headers_follow_language() {
        let t = table(vec![YearRecord::new(2020).with("oil_gas", 1.0)], Language::Fr);
        let out = table_to_csv(&t).unwrap();
        assert!(out.starts_with("Année,Pétrole et gaz,"));
    }

    #[test]
    fn empty_table_is_an_error() {
        let t = table(Vec::new(), Language::En);
        assert!(matches!(table_to_csv(&t), Err(ExportError::MissingTable)));
    }
}
