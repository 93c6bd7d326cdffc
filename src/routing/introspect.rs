//! Route listing for diagnostics.

use std::fmt::Write;

use crate::routing::table::RouteInfo;

const METHOD_WIDTH: usize = 7;
const PATH_WIDTH: usize = 43;

/// Render routes as a boxed table with a total footer.
///
/// Paths longer than the column are printed in full and widen their row.
pub fn format_routes(routes: &[RouteInfo]) -> String {
    if routes.is_empty() {
        return "No routes registered".to_string();
    }

    let method_rule = "─".repeat(METHOD_WIDTH + 2);
    let path_rule = "─".repeat(PATH_WIDTH + 2);

    let mut out = String::new();
    let _ = writeln!(out, "\nRegistered Routes:");
    let _ = writeln!(out, "┌{method_rule}┬{path_rule}┐");
    let _ = writeln!(
        out,
        "│ {:<mw$} │ {:<pw$} │",
        "Method",
        "Path",
        mw = METHOD_WIDTH,
        pw = PATH_WIDTH
    );
    let _ = writeln!(out, "├{method_rule}┼{path_rule}┤");
    for route in routes {
        let _ = writeln!(
            out,
            "│ {:<mw$} │ {:<pw$} │",
            route.method.as_str(),
            route.path,
            mw = METHOD_WIDTH,
            pw = PATH_WIDTH
        );
    }
    let _ = writeln!(out, "└{method_rule}┴{path_rule}┘");
    let _ = writeln!(out, "Total routes: {}", routes.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    #[test]
    fn test_empty_listing() {
        assert_eq!(format_routes(&[]), "No routes registered");
    }

    #[test]
    fn test_listing_rows_and_total() {
        let routes = vec![
            RouteInfo {
                method: Method::GET,
                path: "/a".into(),
                prefix: String::new(),
            },
            RouteInfo {
                method: Method::POST,
                path: "/api/b".into(),
                prefix: "/api".into(),
            },
        ];

        let out = format_routes(&routes);
        assert!(out.contains(&format!("│ {:<7} │ {:<43} │", "GET", "/a")));
        assert!(out.contains(&format!("│ {:<7} │ {:<43} │", "POST", "/api/b")));
        assert!(out.ends_with("Total routes: 2\n"));
    }
}
