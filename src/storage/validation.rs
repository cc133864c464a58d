// Upload policy checks, run before any backend call.

use super::StorageError;
use crate::config::Settings;

/// Lowercased text after the last '.', or an empty string when there is none.
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

pub fn is_allowed_extension(file_name: &str, settings: &Settings) -> bool {
    if file_name.is_empty() {
        return false;
    }
    let ext = file_extension(file_name);
    settings.allowed_extensions.iter().any(|allowed| *allowed == ext)
}

pub fn is_within_size_limit(size: u64, settings: &Settings) -> bool {
    size <= settings.max_file_size
}

pub fn extension_error(settings: &Settings) -> StorageError {
    StorageError::FileValidation(format!(
        "File type not allowed. Allowed types: {}",
        settings.allowed_extensions.join(", ")
    ))
}

pub fn size_error(settings: &Settings) -> StorageError {
    StorageError::FileValidation(format!(
        "File too large. Maximum size: {}MB",
        settings.max_file_size_mb()
    ))
}

pub fn validate_upload(file_name: &str, size: u64, settings: &Settings) -> Result<(), StorageError> {
    if file_name.is_empty() {
        return Err(StorageError::FileValidation("File name is required".to_string()));
    }
    if !is_allowed_extension(file_name, settings) {
        return Err(extension_error(settings));
    }
    if !is_within_size_limit(size, settings) {
        return Err(size_error(settings));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::from_lookup(|name| match name {
            "MAX_FILE_SIZE" => Some("1572864".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("report.PDF"), "pdf");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("README"), "");
        assert_eq!(file_extension(".env"), "env");
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let settings = settings();
        assert!(is_allowed_extension("photo.JPG", &settings));
        assert!(is_allowed_extension("notes.txt", &settings));
        assert!(!is_allowed_extension("script.sh", &settings));
        assert!(!is_allowed_extension("", &settings));
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let settings = settings();
        assert!(is_within_size_limit(1_572_864, &settings));
        assert!(!is_within_size_limit(1_572_865, &settings));
    }

    #[test]
    fn test_validate_upload_messages() {
        let settings = settings();

        let err = validate_upload("", 1, &settings).unwrap_err();
        assert_eq!(err.to_string(), "File name is required");

        let err = validate_upload("a.exe", 1, &settings).unwrap_err();
        assert_eq!(
            err.to_string(),
            "File type not allowed. Allowed types: txt, pdf, jpg, jpeg, png, gif"
        );

        let err = validate_upload("a.txt", 2_000_000, &settings).unwrap_err();
        assert_eq!(err.to_string(), "File too large. Maximum size: 1.5MB");

        assert!(validate_upload("a.txt", 5, &settings).is_ok());
    }
}
