// Suffix inserted between the file stem and its extension for the unlocked copy, named after
// the tool that wrote it
pub const OUTPUT_SUFFIX: &str = concat!("_", env!("CARGO_PKG_NAME"));

// The VBA project binary, found in the application's root folder of the archive
pub const VBA_FILENAME: &str = "vbaProject.bin";

// Marker the VBA project stream uses for its password-protected state, and the
// corrupted variant written over it. Both must be the same width
pub const MACRO_GUARD_MARKER: &[u8; 3] = b"DPB";
pub const MACRO_GUARD_PATCHED: &[u8; 3] = b"DPx";

// Content types part, written first when repackaging
pub const CONTENT_TYPES: &str = "[Content_Types].xml";

// Declaration added to XML parts that were saved without one
pub const XML_DECLARATION: &[u8] =
    b"<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n";

// Default locations, relative to the working directory
pub const DEFAULT_SAVE_DIR: &str = "unlocked";
pub const DEFAULT_TEMP_DIR: &str = "temp";

// Extension of list-mode input files
pub const LIST_EXTENSION: &str = ".txt";
