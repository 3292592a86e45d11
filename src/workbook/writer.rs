//! CSV renderer: one file per sheet. Formula cells are written verbatim, so a
//! spreadsheet application evaluates them on import.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use crate::{
    prelude::*,
    workbook::{Cell, SheetData, Workbook},
};

pub fn write_workbook(workbook: &Workbook, directory: &Path) -> Result {
    fs::create_dir_all(directory)
        .with_context(|| format!("failed to create `{}`", directory.display()))?;
    for sheet in &workbook.sheets {
        let path = directory.join(format!("{}.csv", sheet.name));
        let file = File::create(&path)
            .with_context(|| format!("failed to create `{}`", path.display()))?;
        write_sheet(sheet, BufWriter::new(file))
            .with_context(|| format!("failed to write `{}`", path.display()))?;
    }
    Ok(())
}

pub fn write_sheet(sheet: &SheetData, writer: impl Write) -> Result {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    for row in &sheet.rows {
        writer.write_record(row.iter().map(Cell::render))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_sheet() -> Result {
        let sheet = SheetData {
            name: "Test".to_owned(),
            rows: vec![
                vec![Cell::text("Plan Name"), Cell::text("Supply (c/day)")],
                vec![Cell::text("Acme Saver"), Cell::Number(99.0)],
                vec![Cell::text("Other, One"), Cell::Formula("=$B$4*F18".to_owned())],
            ],
        };
        let mut buffer = Vec::new();
        write_sheet(&sheet, &mut buffer)?;
        let rendered = String::from_utf8(buffer)?;
        assert_eq!(
            rendered,
            "Plan Name,Supply (c/day)\nAcme Saver,99.00\n\"Other, One\",=$B$4*F18\n",
        );
        Ok(())
    }
}
