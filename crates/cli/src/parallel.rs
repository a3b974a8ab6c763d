//! Parallel file processing utilities.

use std::path::Path;

use anyhow::{Context, Result, bail};
use log::error;
use rayon::prelude::*;

/// Result of a parallel batch operation.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    pub fn ok_or_bail(&self, operation: &str) -> Result<()> {
        if !self.all_succeeded() {
            bail!("{operation} failed: {} succeeded, {} failed", self.succeeded, self.failed);
        }
        Ok(())
    }
}

/// Process items in parallel with consistent error reporting.
pub fn process_parallel_iter<T, R, F>(
    label: &str,
    items: impl IntoIterator<Item = T>,
    op: F,
) -> BatchResult
where
    T: Send,
    R: Send,
    F: Fn(T) -> Result<R> + Sync,
{
    let items: Vec<T> = items.into_iter().collect();
    let results: Vec<_> = items.into_par_iter().map(&op).collect();

    let mut result = BatchResult::default();
    for r in &results {
        if let Err(e) = r {
            error!("{e:#}");
            result.failed += 1;
        } else {
            result.succeeded += 1;
        }
    }

    if result.total() > 1 {
        println!("{label}: {} succeeded, {} failed", result.succeeded, result.failed);
    }
    result
}

/// Collect results from parallel operations without printing, in input order.
pub fn collect_parallel<T, R, F>(items: &[T], op: F) -> Vec<Result<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> Result<R> + Sync + Send,
{
    items.par_iter().map(op).collect()
}

/// Run an operation on every file, then fail if any of them failed.
pub fn run_parallel<T, F>(label: &str, items: &[T], op: F) -> Result<()>
where
    T: AsRef<Path> + Sync,
    F: Fn(&Path) -> Result<()> + Sync,
{
    process_parallel_iter(label, items.iter(), |item| {
        let path = item.as_ref();
        op(path).with_context(|| format!("Failed to process {}", path.display()))
    })
    .ok_or_bail(label)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use anyhow::anyhow;

    use super::*;

    #[test]
    fn counts_failures() {
        let result = process_parallel_iter("test", 0..10, |i| {
            if i % 3 == 0 { Err(anyhow!("{i}")) } else { Ok(i) }
        });
        assert_eq!(result, BatchResult { succeeded: 6, failed: 4 });
        assert_eq!(result.total(), 10);
        assert!(!result.all_succeeded());
        assert!(result.ok_or_bail("test").is_err());
    }

    #[test]
    fn run_parallel_fails_if_any_file_fails() {
        let files = [PathBuf::from("a.ttf"), PathBuf::from("b.ttf")];
        assert!(run_parallel("ok", &files, |_| Ok(())).is_ok());
        let err = run_parallel("bad", &files, |path| {
            if path.ends_with("b.ttf") { Err(anyhow!("broken")) } else { Ok(()) }
        })
        .unwrap_err();
        assert!(err.to_string().contains("1 failed"));
    }

    #[test]
    fn collect_keeps_order() {
        let results = collect_parallel(&[3, 1, 2], |i| Ok(i * 10));
        let values: Vec<_> = results.into_iter().map(Result::unwrap).collect();
        assert_eq!(values, [30, 10, 20]);
    }
}
