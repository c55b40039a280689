//! Python bindings for Worksheet.

use chrono::{NaiveDate, NaiveDateTime};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDateTime, PyString};
use sheetpatch_core::{CellValue, Worksheet};

use crate::to_py_err;
use crate::workbook::{PyCellFormat, PyWorkbook};

/// A worksheet of an open workbook.
///
/// Holds a reference to its workbook, so edits go straight into the
/// workbook's tree and are written by the next save.
#[pyclass(name = "Worksheet")]
pub struct PyWorksheet {
    workbook: Py<PyWorkbook>,
    index: usize,
    name: String,
}

impl PyWorksheet {
    pub(crate) fn connected(workbook: Py<PyWorkbook>, index: usize, name: String) -> Self {
        PyWorksheet { workbook, index, name }
    }

    fn with_sheet<T>(&self, py: Python<'_>, f: impl FnOnce(&Worksheet) -> T) -> PyResult<T> {
        let wb = self.workbook.borrow(py);
        let ws = wb.inner.worksheet_at(self.index).map_err(to_py_err)?;
        Ok(f(ws))
    }

    fn with_sheet_mut<T>(&self, py: Python<'_>, f: impl FnOnce(&mut Worksheet) -> T) -> PyResult<T> {
        let mut wb = self.workbook.borrow_mut(py);
        let ws = wb.inner.worksheet_at_mut(self.index).map_err(to_py_err)?;
        Ok(f(ws))
    }
}

#[pymethods]
impl PyWorksheet {
    #[getter]
    fn name(&self) -> String {
        self.name.clone()
    }

    /// Alias of `name`.
    #[getter]
    fn title(&self) -> String {
        self.name.clone()
    }

    /// Path of the worksheet part inside the package.
    #[getter]
    fn part_path(&self, py: Python<'_>) -> PyResult<String> {
        self.with_sheet(py, |ws| ws.part_path().to_string())
    }

    /// Write a value into a cell.
    ///
    /// Args:
    ///     column: Column number (1-indexed)
    ///     row: Row number (1-indexed)
    ///     value: str, int, float, datetime, date, or None to empty the cell;
    ///         anything else is written as str(value)
    ///     format: Optional CellFormat from Workbook.formats
    #[pyo3(signature = (column, row, value=None, format=None))]
    fn update_cell(
        &self,
        py: Python<'_>,
        column: u32,
        row: u32,
        value: Option<&Bound<'_, PyAny>>,
        format: Option<PyRef<'_, PyCellFormat>>,
    ) -> PyResult<()> {
        let value = value.map(python_to_cell_value).transpose()?.flatten();
        let format = format.map(|f| f.inner.clone());
        self.with_sheet_mut(py, |ws| ws.update_cell(column, row, value, format.as_ref()))?
            .map_err(to_py_err)
    }

    /// Remove a cell entirely. Its row stays.
    fn clear_cell(&self, py: Python<'_>, column: u32, row: u32) -> PyResult<()> {
        self.with_sheet_mut(py, |ws| ws.clear_cell(column, row))?
            .map_err(to_py_err)
    }

    /// Stored text of a cell, or None when the cell has no value.
    fn cell_value(&self, py: Python<'_>, column: u32, row: u32) -> PyResult<Option<String>> {
        let cell = self
            .with_sheet(py, |ws| ws.cell(column, row))?
            .map_err(to_py_err)?;
        Ok(cell.and_then(|c| c.value))
    }

    /// Replace the text of a named text box in this worksheet's drawing.
    ///
    /// Returns:
    ///     bool: Whether a text box with that name was found
    fn update_textbox(&self, py: Python<'_>, name: &str, text: &str) -> PyResult<bool> {
        self.with_sheet_mut(py, |ws| ws.update_textbox(name, text))
    }

    /// Number of rows present in the worksheet.
    fn row_count(&self, py: Python<'_>) -> PyResult<usize> {
        self.with_sheet(py, Worksheet::row_count)
    }

    /// The worksheet part as it would be saved.
    fn to_xml(&self, py: Python<'_>) -> PyResult<String> {
        self.with_sheet(py, Worksheet::serialize)?.map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        format!("<Worksheet \"{}\">", self.name)
    }
}

/// Convert a Python value to a cell value. `None` empties the cell; values
/// that are not numbers or dates are written as their string form.
fn python_to_cell_value(value: &Bound<'_, PyAny>) -> PyResult<Option<CellValue>> {
    if value.is_none() {
        return Ok(None);
    }
    if let Ok(b) = value.downcast::<PyBool>() {
        return Ok(Some(CellValue::from(b.is_true())));
    }
    if let Ok(s) = value.downcast::<PyString>() {
        return Ok(Some(CellValue::Text(s.to_str()?.to_string())));
    }
    if value.is_instance_of::<PyDateTime>() {
        let dt = value.extract::<NaiveDateTime>().map_err(|_| {
            PyValueError::new_err("timezone-aware datetimes are not supported, pass a naive datetime")
        })?;
        return Ok(Some(CellValue::Temporal(dt)));
    }
    if let Ok(d) = value.extract::<NaiveDate>() {
        return Ok(Some(CellValue::from(d)));
    }
    if let Ok(n) = value.extract::<f64>() {
        return Ok(Some(CellValue::Number(n)));
    }
    Ok(Some(CellValue::Text(value.str()?.to_string())))
}
