//! Conversion between the library's snake_case identifiers and the wire's
//! lowerCamelCase.
//!
//! # Design
//! Callers name attributes, filters and relationships the Rust way
//! (`bundle_id`); the API expects `bundleId`. Dotted paths such as
//! `pre_release_version.version` are converted segment by segment. Both
//! directions are total over catalog names, which are plain ASCII words.

/// `bundle_id` -> `bundleId`. Already-camel input passes through unchanged.
pub fn snake_to_camel(name: &str) -> String {
    name.split('.')
        .map(segment_to_camel)
        .collect::<Vec<_>>()
        .join(".")
}

/// `bundleId` -> `bundle_id`.
pub fn camel_to_snake(name: &str) -> String {
    name.split('.')
        .map(segment_to_snake)
        .collect::<Vec<_>>()
        .join(".")
}

fn segment_to_camel(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut upper_next = false;
    for c in segment.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn segment_to_snake(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len() + 4);
    for c in segment.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_simple_names() {
        assert_eq!(snake_to_camel("bundle_id"), "bundleId");
        assert_eq!(snake_to_camel("is_or_ever_was_made_for_kids"), "isOrEverWasMadeForKids");
        assert_eq!(camel_to_snake("bundleId"), "bundle_id");
        assert_eq!(camel_to_snake("minOsVersion"), "min_os_version");
    }

    #[test]
    fn single_words_are_unchanged() {
        assert_eq!(snake_to_camel("name"), "name");
        assert_eq!(camel_to_snake("name"), "name");
    }

    #[test]
    fn camel_input_passes_through() {
        assert_eq!(snake_to_camel("bundleId"), "bundleId");
    }

    #[test]
    fn dotted_paths_convert_per_segment() {
        assert_eq!(
            snake_to_camel("pre_release_version.version"),
            "preReleaseVersion.version"
        );
        assert_eq!(
            camel_to_snake("preReleaseVersion.version"),
            "pre_release_version.version"
        );
    }

    #[test]
    fn round_trips_over_the_catalog() {
        for schema in crate::schema::catalog() {
            let names = schema
                .attributes
                .iter()
                .copied()
                .chain(schema.relationships.iter().map(|r| r.name))
                .chain(schema.filters.iter().map(|f| f.name))
                .chain(schema.sorts.iter().copied())
                .chain(schema.exists.iter().copied());
            for wire in names {
                let snake = camel_to_snake(wire);
                assert_eq!(snake_to_camel(&snake), wire, "{}: {wire}", schema.resource_type);
                assert_eq!(camel_to_snake(&snake_to_camel(&snake)), snake);
            }
        }
    }
}
