//! Prefix/path joining.

/// Join a scope prefix and a relative path into an absolute path.
///
/// - empty `base`: `path` with a leading `/` added if missing (`""` becomes `/`)
/// - empty `path`: `base` unchanged, trailing slash included
/// - otherwise exactly one `/` between the two
///
/// No other normalization happens: internal `//`, `.` and `..` are kept.
pub fn join(base: &str, path: &str) -> String {
    if base.is_empty() {
        if path.starts_with('/') {
            return path.to_string();
        }
        return format!("/{path}");
    }
    if path.is_empty() {
        return base.to_string();
    }

    let mut joined = String::with_capacity(base.len() + path.len() + 1);
    joined.push_str(base);
    if !base.ends_with('/') {
        joined.push('/');
    }
    joined.push_str(path.strip_prefix('/').unwrap_or(path));
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_table() {
        let cases = [
            ("", "", "/"),
            ("", "users", "/users"),
            ("", "/users", "/users"),
            ("/api", "", "/api"),
            ("/api/", "", "/api/"),
            ("/api/", "/users", "/api/users"),
            ("/api", "/users", "/api/users"),
            ("/api/", "users", "/api/users"),
            ("/api/v1", "users/profile", "/api/v1/users/profile"),
        ];

        for (base, path, expected) in cases {
            assert_eq!(join(base, path), expected, "join({base:?}, {path:?})");
        }
    }

    #[test]
    fn test_join_strips_only_one_slash() {
        assert_eq!(join("/api/", "//users"), "/api//users");
        assert_eq!(join("/api//", "users"), "/api//users");
    }

    #[test]
    fn test_join_keeps_dot_segments() {
        assert_eq!(join("/api", "../users"), "/api/../users");
        assert_eq!(join("", "./x"), "/./x");
    }
}
