// Job addressing on the remote server: folders nest as `<a>/job/<b>`

/// Segment marker the server uses between nested folder names
pub const FOLDER_MARKER: &str = "/job/";

const JOB_PREFIX: &str = "job/";
const DELETE_SUFFIX: &str = "/doDelete";

/// Insert the folder marker between path segments unless it is already there.
///
/// Trailing empty segments are dropped; a name without `/` is returned as is.
pub fn normalize_full_name(full_name: &str) -> String {
    if full_name.contains(FOLDER_MARKER) || !full_name.contains('/') {
        return full_name.to_string();
    }

    let mut segments: Vec<&str> = full_name.split('/').collect();
    while segments.len() > 1 && segments.last() == Some(&"") {
        segments.pop();
    }
    segments.join(FOLDER_MARKER)
}

/// `<root>/job/<normalized name>/doDelete`
pub fn delete_url(root_url: &str, full_name: &str) -> String {
    let mut url = String::from(root_url);
    if !url.ends_with('/') {
        url.push('/');
    }
    url.push_str(JOB_PREFIX);
    url.push_str(&normalize_full_name(full_name));
    url.push_str(DELETE_SUFFIX);
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_name_gets_marker() {
        assert_eq!(normalize_full_name("teamA/backend"), "teamA/job/backend");
        assert_eq!(normalize_full_name("org/teamA/backend"), "org/job/teamA/job/backend");
    }

    #[test]
    fn test_marked_or_flat_name_unchanged() {
        assert_eq!(normalize_full_name("teamA/job/backend"), "teamA/job/backend");
        assert_eq!(normalize_full_name("backend"), "backend");
    }

    #[test]
    fn test_trailing_separator_dropped() {
        assert_eq!(normalize_full_name("teamA/backend/"), "teamA/job/backend");
    }

    #[test]
    fn test_delete_url() {
        assert_eq!(
            delete_url("http://ci.example.com/", "teamA/backend"),
            "http://ci.example.com/job/teamA/job/backend/doDelete"
        );
        assert_eq!(
            delete_url("http://ci.example.com/jenkins", "backend"),
            "http://ci.example.com/jenkins/job/backend/doDelete"
        );
    }
}
