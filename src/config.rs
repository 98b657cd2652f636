//! Configuration for DOC import.
//!
//! The run-length thresholds of the heuristic scan are empirical: they are
//! long enough to skip names and stray byte patterns in the container, and
//! short enough to keep real paragraphs.

/// Minimum run lengths for the heuristic text scan.
///
/// # Examples
///
/// ```rust
/// use doclift::FallbackOptions;
///
/// let options = FallbackOptions::new().with_min_ascii_run(30);
/// assert_eq!(options.min_utf16_run, 40);
/// assert_eq!(options.min_ascii_run, 30);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackOptions {
    /// Shortest UTF-16 run, in code units, that is kept
    pub min_utf16_run: usize,
    /// Shortest single-byte run, in bytes, that is kept
    pub min_ascii_run: usize,
}

impl Default for FallbackOptions {
    fn default() -> Self {
        Self {
            min_utf16_run: 40,
            min_ascii_run: 50,
        }
    }
}

impl FallbackOptions {
    /// Create a new `FallbackOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shortest UTF-16 run that is kept.
    #[inline]
    pub fn with_min_utf16_run(mut self, units: usize) -> Self {
        self.min_utf16_run = units;
        self
    }

    /// Set the shortest single-byte run that is kept.
    #[inline]
    pub fn with_min_ascii_run(mut self, bytes: usize) -> Self {
        self.min_ascii_run = bytes;
        self
    }
}

/// Options for [`parse_doc_with_options`](crate::parse_doc_with_options).
///
/// The heuristic scan runs on two inputs with different noise levels: the
/// `WordDocument` stream of a container whose piece table could not be used,
/// and the whole uploaded buffer. The stream is mostly text, so it gets a
/// lower single-byte threshold.
///
/// # Examples
///
/// ```rust
/// use doclift::DocImportOptions;
///
/// let options = DocImportOptions::new()
///     .with_min_utf16_run(60)
///     .with_untitled_title("Imported document");
/// assert_eq!(options.stream_fallback().min_ascii_run, 30);
/// assert_eq!(options.buffer_fallback().min_utf16_run, 60);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocImportOptions {
    /// Shortest UTF-16 run kept by either scan
    pub min_utf16_run: usize,
    /// Shortest single-byte run kept when scanning the WordDocument stream
    pub min_ascii_run_in_stream: usize,
    /// Shortest single-byte run kept when scanning the whole buffer
    pub min_ascii_run_in_buffer: usize,
    /// Title used when the file name yields nothing
    pub untitled_title: String,
}

impl Default for DocImportOptions {
    fn default() -> Self {
        Self {
            min_utf16_run: 40,
            min_ascii_run_in_stream: 30,
            min_ascii_run_in_buffer: 50,
            untitled_title: "Untitled".to_string(),
        }
    }
}

impl DocImportOptions {
    /// Create a new `DocImportOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shortest UTF-16 run kept by the heuristic scan.
    #[inline]
    pub fn with_min_utf16_run(mut self, units: usize) -> Self {
        self.min_utf16_run = units;
        self
    }

    /// Set the single-byte thresholds for the stream and whole-buffer scans.
    #[inline]
    pub fn with_min_ascii_runs(mut self, in_stream: usize, in_buffer: usize) -> Self {
        self.min_ascii_run_in_stream = in_stream;
        self.min_ascii_run_in_buffer = in_buffer;
        self
    }

    /// Set the title used when the file name has no usable stem.
    #[inline]
    pub fn with_untitled_title(mut self, title: impl Into<String>) -> Self {
        self.untitled_title = title.into();
        self
    }

    /// Scan settings for the WordDocument stream.
    #[inline]
    pub fn stream_fallback(&self) -> FallbackOptions {
        FallbackOptions {
            min_utf16_run: self.min_utf16_run,
            min_ascii_run: self.min_ascii_run_in_stream,
        }
    }

    /// Scan settings for the whole input buffer.
    #[inline]
    pub fn buffer_fallback(&self) -> FallbackOptions {
        FallbackOptions {
            min_utf16_run: self.min_utf16_run,
            min_ascii_run: self.min_ascii_run_in_buffer,
        }
    }
}
