//! Validation rules and filename derivation.
//!
//! The PIN minimum and the `.mydre` extension rules are shared by every
//! operation; filenames for created configs are derived from the workspace
//! and a sanitized uploader name.

use crate::error::AppError;

/// Minimum PIN length, enforced before anything is sent to the server.
pub const MIN_PIN_LEN: usize = 6;

/// Extension of encrypted configuration bundles.
pub const KEY_FILE_EXT: &str = ".mydre";

/// Default output name for a combined bundle.
pub const DEFAULT_COMBINED_FILENAME: &str = "combined_configs.mydre";

/// PIN that skips decryption entirely: the file is read as plaintext
/// JSON. Test/bypass path carried over from the original tool.
pub const PLAINTEXT_PIN: &str = "000000";

pub fn validate_pin(pin: &str) -> Result<(), AppError> {
    if pin.chars().count() < MIN_PIN_LEN {
        return Err(AppError::PinTooShort {
            len: pin.chars().count(),
        });
    }
    Ok(())
}

pub fn is_key_file(name: &str) -> bool {
    name.ends_with(KEY_FILE_EXT)
}

/// Append `.mydre` unless the name already carries it.
pub fn ensure_mydre_ext(name: &str) -> String {
    if is_key_file(name) {
        name.to_string()
    } else {
        format!("{}{}", name, KEY_FILE_EXT)
    }
}

/// Sanitize an uploader name for use in a filename: the part before `@`
/// for emails, then only alphanumerics, underscores and hyphens, with
/// leading/trailing separators trimmed.
pub fn sanitize_uploader(name: &str) -> String {
    let base = name.split('@').next().unwrap_or("");
    let kept: String = base
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    kept.trim_matches(|c: char| c == '-' || c == '_').to_string()
}

/// Filename for a freshly created config: `{workspace}-{uploader}.mydre`.
pub fn config_filename(workspace_name: &str, uploader_name: &str) -> String {
    format!(
        "{}-{}{}",
        workspace_name,
        sanitize_uploader(uploader_name),
        KEY_FILE_EXT
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_of_six_passes() {
        assert!(validate_pin("123456").is_ok());
        assert!(validate_pin("secret-pin").is_ok());
    }

    #[test]
    fn short_pin_is_rejected_with_length() {
        let err = validate_pin("12345").unwrap_err();
        assert!(matches!(err, AppError::PinTooShort { len: 5 }));
    }

    #[test]
    fn extension_appended_once() {
        assert_eq!(ensure_mydre_ext("out"), "out.mydre");
        assert_eq!(ensure_mydre_ext("out.mydre"), "out.mydre");
    }

    #[test]
    fn key_file_detection() {
        assert!(is_key_file("team.mydre"));
        assert!(!is_key_file("team.json"));
        assert!(!is_key_file("team.mydre.txt"));
    }

    #[test]
    fn uploader_email_keeps_local_part() {
        assert_eq!(sanitize_uploader("j.doe@example.org"), "jdoe");
    }

    #[test]
    fn uploader_specials_stripped_and_trimmed() {
        assert_eq!(sanitize_uploader("_J. van Doe-"), "JvanDoe");
        assert_eq!(sanitize_uploader("plain_name"), "plain_name");
    }

    #[test]
    fn config_filename_combines_parts() {
        assert_eq!(
            config_filename("TeamX", "j.doe@example.org"),
            "TeamX-jdoe.mydre"
        );
    }
}
