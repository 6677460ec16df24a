use crate::api::error::AppError;

/// Mesh formats the viewer can load
pub const ALLOWED_EXTENSIONS: &[&str] = &[".stl", ".obj", ".ply", ".glb", ".gltf"];

/// Longest stored filename in bytes (common filesystem limit)
pub const MAX_FILENAME_BYTES: usize = 255;

/// Characters that are rewritten to `_` in stored filenames
const RESERVED_CHARS: &[char] = &[':', '*', '?', '"', '<', '>', '|', ';'];

/// Returns the last path segment of a client supplied filename.
///
/// Both `/` and `\` count as separators so that Windows paths are
/// reduced the same way on every host.
pub fn base_name(filename: &str) -> &str {
    filename
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
}

/// Lower-cased extension of the base name, including the leading dot.
///
/// Dot-files (`.stl`) and names ending in a dot have no extension.
pub fn extension_of(filename: &str) -> String {
    let name = base_name(filename);
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx < name.len() - 1 => name[idx..].to_lowercase(),
        _ => String::new(),
    }
}

/// Checks the filename's extension against the allow-list
pub fn validate_extension(filename: &str) -> Result<String, AppError> {
    let extension = extension_of(filename);
    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Ok(extension);
    }

    Err(AppError::UnsupportedFileType {
        extension,
        allowed: ALLOWED_EXTENSIONS,
    })
}

/// Sanitizes filename to prevent path traversal and injection attacks
pub fn sanitize_filename(filename: &str) -> Result<String, AppError> {
    let name = base_name(filename);

    if name.len() != filename.len() {
        tracing::warn!("Path components stripped from upload filename: {}", filename);
    }

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control() || RESERVED_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        return Err(AppError::InvalidFilename(format!(
            "'{}' does not name a file",
            filename
        )));
    }

    // Truncating would cut off the extension, so long names are refused outright
    if sanitized.len() > MAX_FILENAME_BYTES {
        return Err(AppError::InvalidFilename(format!(
            "Filename exceeds {} bytes",
            MAX_FILENAME_BYTES
        )));
    }

    Ok(sanitized)
}

/// Full validation pipeline for uploaded filenames.
///
/// Returns the name the file is stored under.
pub fn validate_upload(filename: &str) -> Result<String, AppError> {
    validate_extension(filename)?;
    sanitize_filename(filename)
}
