use core::fmt;

use url::Url;

/// Incremental URI builder over a validated base URL.
///
/// Appended segments are percent-encoded, so raw record ids and file
/// names can be passed through as-is.
#[derive(Clone)]
pub struct Resource {
    url: Url,
}

impl Resource {
    #[must_use]
    pub fn new(uri: &str) -> Option<Resource> {
        let url = Url::parse(uri).ok()?;
        if url.cannot_be_a_base() {
            return None;
        }
        Some(Resource { url })
    }

    pub fn append_path(&mut self, path: &str) -> &mut Self {
        if let Ok(mut segments) = self.url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
        }
        self
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn new_correct_some() {
        // Arrange

        // Act
        let r = Resource::new("http://localhost");

        // Assert
        assert!(r.is_some());
    }

    #[test]
    fn new_incorrect_none() {
        // Arrange

        // Act
        let r = Resource::new("http/localhost");

        // Assert
        assert!(r.is_none());
    }

    #[rstest]
    #[case("http://localhost", "x", "http://localhost/x")]
    #[case("http://localhost", "/x", "http://localhost/x")]
    #[case("http://localhost", "x/y", "http://localhost/x/y")]
    #[case("http://localhost/", "x", "http://localhost/x")]
    #[case("http://localhost/x", "y", "http://localhost/x/y")]
    #[case("http://localhost/x/", "y", "http://localhost/x/y")]
    #[case("http://localhost", "x/", "http://localhost/x")]
    #[case("http://localhost:5000", "reports", "http://localhost:5000/reports")]
    #[trace]
    fn append_path_tests(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        // Arrange
        let mut r = Resource::new(base).unwrap();

        // Act
        r.append_path(path);

        // Assert
        assert_eq!(r.to_string().as_str(), expected);
    }

    #[test]
    fn append_path_twice() {
        // Arrange
        let mut r = Resource::new("http://localhost").unwrap();

        // Act
        r.append_path("reports").append_path("some-id");

        // Assert
        assert_eq!(r.to_string().as_str(), "http://localhost/reports/some-id");
    }

    #[test]
    fn append_path_encodes_segment() {
        // Arrange
        let mut r = Resource::new("http://localhost").unwrap();

        // Act
        r.append_path("a b");

        // Assert
        assert_eq!(r.to_string().as_str(), "http://localhost/a%20b");
    }
}
