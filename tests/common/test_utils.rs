use std::{env, fs, path::PathBuf, process};

/// Temporary filter file that is removed when dropped
pub struct TestFile {
    path: PathBuf,
}

impl TestFile {
    /// Create a new temp file path with a name based on the test name
    pub fn new(test_name: &str) -> Self {
        let path = env::temp_dir()
            .join(format!("test_filter_{}_{}.bf", test_name, process::id()));
        Self { path }
    }

    /// Get a clone of the file path
    #[allow(dead_code)]
    pub fn path(&self) -> PathBuf {
        self.path.clone()
    }
}

impl Drop for TestFile {
    fn drop(&mut self) {
        if self.path.exists() {
            let _ = fs::remove_file(&self.path);
        }
    }
}
