//! `libiqtree2` through the C ABI shim in `native/iqtree_shim.cpp`.
//!
//! Every shim function reports failure by returning null (or a non-zero
//! status) and storing a `malloc`ed message in its `err` out-parameter.
//! Returned buffers are owned by the caller and released with `piq_free`.

use std::ffi::{c_char, c_double, c_int, c_void, CStr, CString};
use std::ptr;

use piqtree_core::{PiqtreeError, Result};

use super::IqTreeEngine;

extern "C" {
    fn piq_build_tree(
        names: *const *const c_char,
        seqs: *const *const c_char,
        n: usize,
        model: *const c_char,
        rand_seed: c_int,
        bootstrap_rep: c_int,
        num_thres: c_int,
        err: *mut *mut c_char,
    ) -> *mut c_char;

    fn piq_fit_tree(
        names: *const *const c_char,
        seqs: *const *const c_char,
        n: usize,
        model: *const c_char,
        intree: *const c_char,
        rand_seed: c_int,
        num_thres: c_int,
        err: *mut *mut c_char,
    ) -> *mut c_char;

    fn piq_random_trees(
        num_taxa: c_int,
        tree_gen_mode: *const c_char,
        num_trees: c_int,
        rand_seed: c_int,
        err: *mut *mut c_char,
    ) -> *mut c_char;

    fn piq_robinson_foulds(
        tree1: *const c_char,
        tree2: *const c_char,
        out: *mut c_int,
        err: *mut *mut c_char,
    ) -> c_int;

    fn piq_jc_distances(
        names: *const *const c_char,
        seqs: *const *const c_char,
        n: usize,
        num_thres: c_int,
        out_len: *mut usize,
        err: *mut *mut c_char,
    ) -> *mut c_double;

    fn piq_nj_tree(
        names: *const *const c_char,
        n: usize,
        distances: *const c_double,
        len: usize,
        err: *mut *mut c_char,
    ) -> *mut c_char;

    fn piq_model_finder(
        names: *const *const c_char,
        seqs: *const *const c_char,
        n: usize,
        rand_seed: c_int,
        model_set: *const c_char,
        freq_set: *const c_char,
        rate_set: *const c_char,
        num_thres: c_int,
        err: *mut *mut c_char,
    ) -> *mut c_char;

    fn piq_version(err: *mut *mut c_char) -> *mut c_char;

    fn piq_free(p: *mut c_void);
}

/// The linked IQ-TREE library.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeLibrary;

impl NativeLibrary {
    pub fn new() -> Self {
        Self
    }
}

fn c_string(value: &str) -> Result<CString> {
    CString::new(value)
        .map_err(|_| PiqtreeError::InvalidInput(format!("interior NUL byte in '{}'", value.escape_debug())))
}

/// Owned C strings plus the pointer array handed to the shim.
struct CStringArray {
    _owned: Vec<CString>,
    ptrs: Vec<*const c_char>,
}

impl CStringArray {
    fn new(values: &[String]) -> Result<Self> {
        let owned = values.iter().map(|v| c_string(v)).collect::<Result<Vec<_>>>()?;
        let ptrs = owned.iter().map(|c| c.as_ptr()).collect();
        Ok(Self { _owned: owned, ptrs })
    }

    fn as_ptr(&self) -> *const *const c_char {
        self.ptrs.as_ptr()
    }

    fn len(&self) -> usize {
        self.ptrs.len()
    }
}

fn parallel_arrays(names: &[String], seqs: &[String]) -> Result<(CStringArray, CStringArray)> {
    if names.len() != seqs.len() {
        return Err(PiqtreeError::InvalidInput(format!(
            "{} names for {} sequences",
            names.len(),
            seqs.len()
        )));
    }
    Ok((CStringArray::new(names)?, CStringArray::new(seqs)?))
}

/// Take ownership of a shim error message, if any.
///
/// # Safety
///
/// `err` must be null or a NUL-terminated buffer allocated by the shim.
unsafe fn take_error(err: *mut c_char) -> Option<PiqtreeError> {
    if err.is_null() {
        return None;
    }
    let msg = CStr::from_ptr(err).to_string_lossy().into_owned();
    piq_free(err.cast());
    Some(PiqtreeError::NativeEngineFailure(msg))
}

/// Convert a shim string result into an owned `String`.
///
/// # Safety
///
/// `out` and `err` must each be null or a NUL-terminated buffer allocated by
/// the shim.
unsafe fn take_string(out: *mut c_char, err: *mut c_char) -> Result<String> {
    if let Some(e) = take_error(err) {
        if !out.is_null() {
            piq_free(out.cast());
        }
        return Err(e);
    }
    if out.is_null() {
        return Err(PiqtreeError::NativeEngineFailure(
            "IQ-TREE returned no output".into(),
        ));
    }
    let s = CStr::from_ptr(out).to_string_lossy().into_owned();
    piq_free(out.cast());
    Ok(s)
}

impl IqTreeEngine for NativeLibrary {
    fn build_tree(
        &self,
        names: &[String],
        seqs: &[String],
        model: &str,
        rand_seed: i32,
        bootstrap_replicates: i32,
        num_threads: i32,
    ) -> Result<String> {
        let (names, seqs) = parallel_arrays(names, seqs)?;
        let model = c_string(model)?;
        let mut err = ptr::null_mut();
        // SAFETY: all pointers outlive the call; the shim copies its inputs.
        unsafe {
            let out = piq_build_tree(
                names.as_ptr(),
                seqs.as_ptr(),
                names.len(),
                model.as_ptr(),
                rand_seed,
                bootstrap_replicates,
                num_threads,
                &mut err,
            );
            take_string(out, err)
        }
    }

    fn fit_tree(
        &self,
        names: &[String],
        seqs: &[String],
        model: &str,
        newick: &str,
        rand_seed: i32,
        num_threads: i32,
    ) -> Result<String> {
        let (names, seqs) = parallel_arrays(names, seqs)?;
        let model = c_string(model)?;
        let newick = c_string(newick)?;
        let mut err = ptr::null_mut();
        // SAFETY: as above.
        unsafe {
            let out = piq_fit_tree(
                names.as_ptr(),
                seqs.as_ptr(),
                names.len(),
                model.as_ptr(),
                newick.as_ptr(),
                rand_seed,
                num_threads,
                &mut err,
            );
            take_string(out, err)
        }
    }

    fn random_trees(
        &self,
        num_taxa: i32,
        tree_gen_mode: &str,
        num_trees: i32,
        rand_seed: i32,
    ) -> Result<String> {
        let mode = c_string(tree_gen_mode)?;
        let mut err = ptr::null_mut();
        // SAFETY: as above.
        unsafe {
            let out = piq_random_trees(num_taxa, mode.as_ptr(), num_trees, rand_seed, &mut err);
            take_string(out, err)
        }
    }

    fn robinson_foulds(&self, tree1: &str, tree2: &str) -> Result<i32> {
        let tree1 = c_string(tree1)?;
        let tree2 = c_string(tree2)?;
        let mut rf: c_int = 0;
        let mut err = ptr::null_mut();
        // SAFETY: as above.
        unsafe {
            let status = piq_robinson_foulds(tree1.as_ptr(), tree2.as_ptr(), &mut rf, &mut err);
            if let Some(e) = take_error(err) {
                return Err(e);
            }
            if status != 0 {
                return Err(PiqtreeError::NativeEngineFailure(format!(
                    "robinson_foulds failed with status {status}"
                )));
            }
        }
        Ok(rf)
    }

    fn jc_distances(&self, names: &[String], seqs: &[String], num_threads: i32) -> Result<Vec<f64>> {
        let (names, seqs) = parallel_arrays(names, seqs)?;
        let mut len = 0usize;
        let mut err = ptr::null_mut();
        // SAFETY: on success `out` points to `len` doubles allocated by the shim.
        unsafe {
            let out = piq_jc_distances(
                names.as_ptr(),
                seqs.as_ptr(),
                names.len(),
                num_threads,
                &mut len,
                &mut err,
            );
            if let Some(e) = take_error(err) {
                if !out.is_null() {
                    piq_free(out.cast());
                }
                return Err(e);
            }
            if out.is_null() {
                return Ok(Vec::new());
            }
            let values = std::slice::from_raw_parts(out, len).to_vec();
            piq_free(out.cast());
            Ok(values)
        }
    }

    fn nj_tree(&self, names: &[String], distances: &[f64]) -> Result<String> {
        let names = CStringArray::new(names)?;
        let mut err = ptr::null_mut();
        // SAFETY: as above.
        unsafe {
            let out = piq_nj_tree(
                names.as_ptr(),
                names.len(),
                distances.as_ptr(),
                distances.len(),
                &mut err,
            );
            take_string(out, err)
        }
    }

    fn model_finder(
        &self,
        names: &[String],
        seqs: &[String],
        rand_seed: i32,
        model_set: &str,
        freq_set: &str,
        rate_set: &str,
        num_threads: i32,
    ) -> Result<String> {
        let (names, seqs) = parallel_arrays(names, seqs)?;
        let model_set = c_string(model_set)?;
        let freq_set = c_string(freq_set)?;
        let rate_set = c_string(rate_set)?;
        let mut err = ptr::null_mut();
        // SAFETY: as above.
        unsafe {
            let out = piq_model_finder(
                names.as_ptr(),
                seqs.as_ptr(),
                names.len(),
                rand_seed,
                model_set.as_ptr(),
                freq_set.as_ptr(),
                rate_set.as_ptr(),
                num_threads,
                &mut err,
            );
            take_string(out, err)
        }
    }

    fn version(&self) -> Result<String> {
        let mut err = ptr::null_mut();
        // SAFETY: as above.
        unsafe {
            let out = piq_version(&mut err);
            take_string(out, err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_nul_rejected() {
        assert!(matches!(c_string("a\0b"), Err(PiqtreeError::InvalidInput(_))));
    }

    #[test]
    fn mismatched_arrays_rejected() {
        let names = vec!["a".to_string(), "b".to_string()];
        let seqs = vec!["ACGT".to_string()];
        assert!(parallel_arrays(&names, &seqs).is_err());
    }

    #[test]
    fn version_is_reported() {
        let v = NativeLibrary::new().version().unwrap();
        assert!(!v.is_empty());
    }
}
