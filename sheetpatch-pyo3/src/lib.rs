//! Python bindings for sheetpatch.
//!
//! Opens an existing xlsx file, edits cells and text boxes in place, and saves
//! it back with every untouched part carried over unchanged.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use sheetpatch_core::SheetpatchError;

mod workbook;
mod worksheet;

use workbook::{PyCellFormat, PyWorkbook};
use worksheet::PyWorksheet;

pub(crate) fn to_py_err(e: SheetpatchError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Open a workbook from a file path, bytes, or file-like object.
///
/// Args:
///     source: File path (str), bytes, or file-like object with .read() method
///
/// Returns:
///     Workbook: The loaded workbook
///
/// Example:
///     wb = sheetpatch.open('report.xlsx')
///     wb = sheetpatch.open(file_bytes)
#[pyfunction(name = "open")]
#[pyo3(signature = (source))]
fn open_workbook(source: &Bound<'_, PyAny>) -> PyResult<PyWorkbook> {
    PyWorkbook::load(source)
}

/// Alias of `open`.
#[pyfunction]
#[pyo3(signature = (source))]
fn load_workbook(source: &Bound<'_, PyAny>) -> PyResult<PyWorkbook> {
    PyWorkbook::load(source)
}

/// Encode a 1-indexed (column, row) pair as an address such as "AA9".
#[pyfunction]
fn cell_address(column: u32, row: u32) -> PyResult<String> {
    sheetpatch_core::cell_address(column, row).map_err(to_py_err)
}

/// Decode an address such as "AA9" into (column, row).
#[pyfunction]
fn parse_address(address: &str) -> PyResult<(u32, u32)> {
    sheetpatch_core::parse_address(address).map_err(to_py_err)
}

/// The sheetpatch Python module.
#[pymodule]
fn sheetpatch(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyWorkbook>()?;
    m.add_class::<PyWorksheet>()?;
    m.add_class::<PyCellFormat>()?;

    m.add_function(wrap_pyfunction!(open_workbook, m)?)?;
    m.add_function(wrap_pyfunction!(load_workbook, m)?)?;
    m.add_function(wrap_pyfunction!(cell_address, m)?)?;
    m.add_function(wrap_pyfunction!(parse_address, m)?)?;

    Ok(())
}
