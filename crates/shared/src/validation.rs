//! Common validation utilities.

use validator::ValidationError;

/// Minimum length of an event slug.
pub const MIN_SLUG_LEN: usize = 3;

/// Maximum length of an event slug.
pub const MAX_SLUG_LEN: usize = 100;

/// Minimum length of a caller-chosen event password.
pub const MIN_EVENT_PASSWORD_LEN: usize = 6;

lazy_static::lazy_static! {
    static ref SLUG_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// Validates an event slug: lowercase alphanumerics separated by single hyphens.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.len() < MIN_SLUG_LEN || slug.len() > MAX_SLUG_LEN {
        let mut err = ValidationError::new("slug_length");
        err.message = Some(
            format!(
                "Slug must be between {} and {} characters",
                MIN_SLUG_LEN, MAX_SLUG_LEN
            )
            .into(),
        );
        return Err(err);
    }

    if !SLUG_REGEX.is_match(slug) {
        let mut err = ValidationError::new("slug_format");
        err.message =
            Some("Slug may only contain lowercase letters, digits and single hyphens".into());
        return Err(err);
    }

    Ok(())
}

/// Validates a caller-chosen event password.
pub fn validate_event_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_EVENT_PASSWORD_LEN {
        let mut err = ValidationError::new("password_length");
        err.message = Some(
            format!(
                "Password must be at least {} characters",
                MIN_EVENT_PASSWORD_LEN
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

/// Derives a slug candidate from a display name ("Boda de Ana & Luis" -> "boda-de-ana-luis").
///
/// Accented Latin letters are folded to ASCII; anything else becomes a separator.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        let folded = fold_accent(c);
        if folded.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(folded);
        } else {
            pending_hyphen = true;
        }
    }

    slug.truncate(MAX_SLUG_LEN);
    slug.trim_end_matches('-').to_string()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}
