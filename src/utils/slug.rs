/// Lowercase ASCII slug for URLs: alphanumerics kept, runs of anything else
/// collapse to a single hyphen.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_separators() {
        assert_eq!(slugify("Hello,  World!"), "hello-world");
    }

    #[test]
    fn trims_leading_and_trailing_noise() {
        assert_eq!(slugify("  ¡Fiesta 2026!  "), "fiesta-2026");
    }

    #[test]
    fn empty_input_gives_empty_slug() {
        assert_eq!(slugify("---"), "");
    }
}
