use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;
use crate::errors::ImportError;
use crate::models::{QuoteData, QuoteField};

/// Reads the quote figures from the first worksheet of a workbook.
///
/// # Arguments
///
/// * `bytes` - The uploaded file (xlsx, xlsm, xlsb, xls or ods).
///
/// # Returns
///
/// A `QuoteData` with every field taken from its fixed cell. Cells with no
/// value become empty strings; any other sheet or cell is ignored.
pub fn import_workbook(bytes: Vec<u8>) -> Result<QuoteData, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::NoSheets)??;

    tracing::debug!("First worksheet spans {:?}", range.get_size());

    let mut quote = QuoteData::default();
    for field in QuoteField::ALL {
        let position = parse_cell_address(field.cell_address())?;
        quote.set(field, cell_text(&range, position));
    }
    Ok(quote)
}

fn cell_text(range: &Range<Data>, position: (u32, u32)) -> String {
    match range.get_value(position) {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(text)) => text.clone(),
        Some(Data::Float(value)) => format_float(*value),
        Some(other) => other.to_string(),
    }
}

// Integral floats drop their fraction, matching what a spreadsheet shows.
fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Converts an A1-style address into zero-based `(row, column)`.
pub fn parse_cell_address(address: &str) -> Result<(u32, u32), ImportError> {
    let invalid = || ImportError::CellAddress(address.to_string());

    let split = address
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (letters, digits) = address.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid());
    }

    let column = letters
        .to_ascii_uppercase()
        .bytes()
        .fold(0u32, |acc, b| acc * 26 + u32::from(b - b'A' + 1));
    let row: u32 = digits.parse().map_err(|_| invalid())?;
    if row == 0 {
        return Err(invalid());
    }

    Ok((row - 1, column - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes(fill: impl FnOnce(&mut rust_xlsxwriter::Worksheet)) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        fill(sheet);
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn addresses_convert_to_zero_based_positions() {
        assert_eq!(parse_cell_address("B1").unwrap(), (0, 1));
        assert_eq!(parse_cell_address("B13").unwrap(), (12, 1));
        assert_eq!(parse_cell_address("AA10").unwrap(), (9, 26));
        assert!(parse_cell_address("13").is_err());
        assert!(parse_cell_address("B0").is_err());
        assert!(parse_cell_address("B").is_err());
    }

    #[test]
    fn fully_populated_sheet_imports_exactly() {
        let bytes = workbook_bytes(|sheet| {
            sheet.write_string(0, 0, "Nombre del plan").unwrap();
            sheet.write_string(0, 1, "Plan 70/30").unwrap();
            sheet.write_string(1, 1, "Corolla SE").unwrap();
            sheet.write_string(2, 1, "Ahorro").unwrap();
            sheet.write_number(3, 1, 84).unwrap();
            sheet.write_number(4, 1, 150000).unwrap();
            sheet.write_string(5, 1, "120000").unwrap();
            sheet.write_number(6, 1, 98000.5).unwrap();
            sheet.write_number(7, 1, 87000).unwrap();
            sheet.write_string(8, 1, "Cuota 2").unwrap();
            sheet.write_string(9, 1, "Cuota 6").unwrap();
            sheet.write_string(10, 1, "30%").unwrap();
            sheet.write_number(11, 1, 12500000).unwrap();
            sheet.write_string(12, 1, "Toyota").unwrap();
        });

        let quote = import_workbook(bytes).unwrap();
        assert_eq!(quote.plan_name, "Plan 70/30");
        assert_eq!(quote.model, "Corolla SE");
        assert_eq!(quote.plan_type, "Ahorro");
        assert_eq!(quote.total_installments, "84");
        assert_eq!(quote.installment_1, "150000");
        assert_eq!(quote.installments_2_to_12, "120000");
        assert_eq!(quote.installments_13_to_84, "98000.5");
        assert_eq!(quote.pure_installment, "87000");
        assert_eq!(quote.adjudication, "Cuota 2");
        assert_eq!(quote.guaranteed_delivery, "Cuota 6");
        assert_eq!(quote.extraordinary_payment, "30%");
        assert_eq!(quote.total_plan_value, "12500000");
        assert_eq!(quote.brand, "Toyota");
    }

    #[test]
    fn blank_cells_become_empty_strings() {
        let bytes = workbook_bytes(|sheet| {
            sheet.write_string(1, 1, "Hilux").unwrap();
            sheet.write_string(12, 1, "Toyota").unwrap();
        });

        let quote = import_workbook(bytes).unwrap();
        assert_eq!(quote.model, "Hilux");
        assert_eq!(quote.brand, "Toyota");
        assert_eq!(quote.plan_name, "");
        assert_eq!(quote.total_plan_value, "");
    }

    #[test]
    fn only_the_first_sheet_is_read() {
        let mut workbook = Workbook::new();
        workbook.add_worksheet().write_string(1, 1, "Etios").unwrap();
        workbook.add_worksheet().write_string(1, 1, "Yaris").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        assert_eq!(import_workbook(bytes).unwrap().model, "Etios");
    }

    #[test]
    fn garbage_is_rejected() {
        let result = import_workbook(b"definitely not a spreadsheet".to_vec());
        assert!(result.is_err());
    }
}
