//! Parser and writer configuration

/// Configuration for [`crate::el::parser::ExclusionParser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Abort with a fatal error on an unrecognized line instead of warning
    pub strict_mode: bool,
    /// Warn when a checksum value contains non-digit/non-space characters
    pub validate_checksums: bool,
    /// Scan comment lines for header fields before skipping them
    pub preserve_comments: bool,
    /// Accumulate into the existing database when loading files instead of
    /// starting fresh per file
    pub merge_on_load: bool,
    /// Maximum file size accepted by `parse_file`, in bytes
    pub max_file_size: u64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            validate_checksums: true,
            preserve_comments: true,
            merge_on_load: false,
            max_file_size: 100 * 1024 * 1024,
        }
    }
}

/// Configuration for [`crate::el::writer::ExclusionWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    /// Emit the comment header block at the top of the output
    pub include_comments: bool,
    /// Emit `ANNOTATION:` lines for records carrying annotations
    pub include_annotations: bool,
    /// Sort scopes and per-category identifiers lexicographically instead of
    /// keeping insertion order
    pub sort_exclusions: bool,
    /// Generate a checksum line for scopes that have none
    pub generate_checksums: bool,
    /// Prefix prepended to every emitted line
    pub indentation: String,
    /// Line terminator, `"\n"` or `"\r\n"`
    pub line_ending: String,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            include_comments: true,
            include_annotations: true,
            sort_exclusions: false,
            generate_checksums: true,
            indentation: String::new(),
            line_ending: "\n".to_string(),
        }
    }
}
