use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Incremental BLAKE3 fingerprint over files and strings.
///
/// Each input is length-prefixed so that `("ab", "c")` and `("a", "bc")`
/// produce different digests.
#[derive(Debug, Default)]
pub struct Fingerprint {
    hasher: blake3::Hasher,
}

impl Fingerprint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mix a string into the fingerprint.
    pub fn add_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(&(s.len() as u64).to_le_bytes());
        self.hasher.update(s.as_bytes());
        self
    }

    /// Stream a file's content into the fingerprint.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or read.
    pub fn add_file(&mut self, path: &Path) -> io::Result<&mut Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        self.hasher.update(&len.to_le_bytes());

        let mut reader = BufReader::new(file);
        let mut buffer = [0u8; 8192];
        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            self.hasher.update(&buffer[..bytes_read]);
        }

        Ok(self)
    }

    /// Hex-encoded digest.
    #[must_use]
    pub fn finish(&self) -> String {
        self.hasher.finalize().to_hex().to_string()
    }
}
