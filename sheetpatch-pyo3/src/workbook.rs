//! Python bindings for Workbook.

use pyo3::exceptions::{PyKeyError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBytes;
use sheetpatch_core::{CellFormat, CompressionLevel, OverwritePolicy, Workbook};

use crate::to_py_err;
use crate::worksheet::PyWorksheet;

/// An xlsx workbook opened for editing.
#[pyclass(name = "Workbook")]
pub struct PyWorkbook {
    pub(crate) inner: Workbook,
}

#[pymethods]
impl PyWorkbook {
    /// Load a workbook from a file path, bytes, or file-like object.
    ///
    /// Args:
    ///     source: File path (str), bytes, or file-like object with .read() method
    ///
    /// Returns:
    ///     Workbook: The loaded workbook
    #[staticmethod]
    #[pyo3(signature = (source))]
    pub fn load(source: &Bound<'_, PyAny>) -> PyResult<Self> {
        if let Ok(path) = source.extract::<&str>() {
            let inner = Workbook::open(path).map_err(to_py_err)?;
            return Ok(PyWorkbook { inner });
        }

        if let Ok(bytes) = source.extract::<&[u8]>() {
            let inner = Workbook::open_from_bytes(bytes).map_err(to_py_err)?;
            return Ok(PyWorkbook { inner });
        }

        if source.hasattr("read")? {
            let bytes_obj = source.call_method0("read")?;
            let bytes = bytes_obj.extract::<&[u8]>()?;
            let inner = Workbook::open_from_bytes(bytes).map_err(to_py_err)?;
            return Ok(PyWorkbook { inner });
        }

        Err(PyTypeError::new_err(
            "Expected file path (str), bytes, or file-like object with .read() method",
        ))
    }

    /// Names of all worksheets, in workbook order.
    #[getter]
    fn sheetnames(&self) -> Vec<String> {
        self.inner.sheet_names().into_iter().map(str::to_string).collect()
    }

    /// All worksheets, in workbook order.
    #[getter]
    fn worksheets(self_: Py<Self>, py: Python<'_>) -> Vec<PyWorksheet> {
        let names = self_.borrow(py).sheetnames();
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| PyWorksheet::connected(self_.clone_ref(py), i, name))
            .collect()
    }

    /// Get a worksheet by name using subscript notation: wb['Sheet1'].
    fn __getitem__(self_: Py<Self>, key: &str, py: Python<'_>) -> PyResult<PyWorksheet> {
        let position = self_
            .borrow(py)
            .inner
            .worksheets()
            .iter()
            .position(|ws| ws.name() == key);
        match position {
            Some(idx) => Ok(PyWorksheet::connected(self_.clone_ref(py), idx, key.to_string())),
            None => Err(PyKeyError::new_err(format!("Worksheet '{}' does not exist", key))),
        }
    }

    fn __contains__(&self, key: &str) -> bool {
        self.inner.worksheet(key).is_ok()
    }

    fn __len__(&self) -> usize {
        self.inner.worksheets().len()
    }

    fn __iter__(&self) -> PySheetNameIterator {
        PySheetNameIterator {
            names: self.sheetnames(),
            index: 0,
        }
    }

    /// Custom number formats declared in the styles part.
    #[getter]
    fn formats(&self) -> Vec<PyCellFormat> {
        self.inner
            .formats()
            .iter()
            .cloned()
            .map(|inner| PyCellFormat { inner })
            .collect()
    }

    /// Find a number format by its format code, e.g. 'yyyy\-mm\-dd;@'.
    fn find_format(&self, code: &str) -> Option<PyCellFormat> {
        self.inner
            .find_format(code)
            .cloned()
            .map(|inner| PyCellFormat { inner })
    }

    /// Whether any worksheet or drawing has unsaved edits.
    #[getter]
    fn is_dirty(&self) -> bool {
        self.inner.is_dirty()
    }

    /// Save the workbook to a file. The file it was opened from is allowed.
    ///
    /// Args:
    ///     filename: Path to save the Excel file
    fn save(&self, filename: &str) -> PyResult<()> {
        self.inner.save(filename).map_err(to_py_err)
    }

    /// Save the workbook to bytes.
    ///
    /// Returns:
    ///     bytes: The workbook as an xlsx file in memory
    fn save_to_bytes<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyBytes>> {
        let bytes = self.inner.save_to_bytes().map_err(to_py_err)?;
        Ok(PyBytes::new(py, &bytes))
    }

    /// Set compression level for rewritten parts.
    ///
    /// Args:
    ///     level: Compression level - "none", "fast", "default", or "best"
    fn set_compression(&mut self, level: &str) -> PyResult<()> {
        let level = match level.to_lowercase().as_str() {
            "none" | "stored" => CompressionLevel::None,
            "fast" | "1" => CompressionLevel::Fast,
            "default" | "6" => CompressionLevel::Default,
            "best" | "9" => CompressionLevel::Best,
            _ => {
                return Err(PyValueError::new_err(
                    "Invalid compression level. Use: 'none', 'fast', 'default', or 'best'",
                ))
            }
        };
        self.inner.set_compression(level);
        Ok(())
    }

    /// Choose whether a save may replace parts that already exist in the package.
    fn set_replace_existing(&mut self, replace: bool) {
        let policy = if replace {
            OverwritePolicy::Replace
        } else {
            OverwritePolicy::Reject
        };
        self.inner.set_overwrite_policy(policy);
    }

    /// Close the workbook (no-op for compatibility).
    fn close(&self) {}

    fn __str__(&self) -> String {
        format!("<Workbook with {} sheet(s)>", self.inner.worksheets().len())
    }

    fn __repr__(&self) -> String {
        self.__str__()
    }
}

/// A custom number format from the workbook's styles.
#[pyclass(name = "CellFormat")]
#[derive(Clone)]
pub struct PyCellFormat {
    pub(crate) inner: CellFormat,
}

#[pymethods]
impl PyCellFormat {
    /// Style index written to cells that use this format.
    #[getter]
    fn id(&self) -> u32 {
        self.inner.id
    }

    #[getter]
    fn format_code(&self) -> &str {
        &self.inner.format_code
    }

    #[getter]
    fn num_fmt_id(&self) -> u32 {
        self.inner.num_fmt_id
    }

    fn __repr__(&self) -> String {
        format!("<CellFormat {} '{}'>", self.inner.id, self.inner.format_code)
    }
}

/// Iterator over worksheet names.
#[pyclass]
pub struct PySheetNameIterator {
    names: Vec<String>,
    index: usize,
}

#[pymethods]
impl PySheetNameIterator {
    fn __iter__(slf: PyRef<'_, Self>) -> PyRef<'_, Self> {
        slf
    }

    fn __next__(&mut self) -> Option<String> {
        let name = self.names.get(self.index).cloned();
        self.index += 1;
        name
    }
}
