//! Test matrix expansion
//!
//! Pure data generation: the (browser x screen format x route) matrix
//! is produced as an ordered `Vec<TestCase>` with no test-framework
//! coupling, so the enumeration logic is testable on its own.

use serde::{Deserialize, Serialize};

use crate::config::ScreenFormat;

/// One (route, screen format, browser) combination to smoke test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub browser: String,
    pub format: ScreenFormat,
    pub route: String,
}

impl TestCase {
    /// Derived file name (without extension) used for both the current
    /// and the baseline screenshot of this case. Path separators in
    /// the route become underscores; the empty route renders as
    /// `index`.
    pub fn file_name(&self) -> String {
        let route = if self.route.is_empty() {
            "index".to_string()
        } else {
            self.route.replace(['/', '\\'], "_")
        };
        format!("{}_{}_{}", self.browser, self.format.name, route)
    }
}

/// Expand the configured dimensions into the ordered case sequence:
/// browsers outermost, screen formats middle, routes innermost. Every
/// combination is yielded exactly once, in deterministic order.
pub fn expand(
    browsers: &[String],
    screen_formats: &[ScreenFormat],
    routes: &[String],
) -> Vec<TestCase> {
    let mut cases = Vec::with_capacity(browsers.len() * screen_formats.len() * routes.len());
    for browser in browsers {
        for format in screen_formats {
            for route in routes {
                cases.push(TestCase {
                    browser: browser.clone(),
                    format: format.clone(),
                    route: route.clone(),
                });
            }
        }
    }
    cases
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn formats(names: &[&str]) -> Vec<ScreenFormat> {
        names
            .iter()
            .map(|name| ScreenFormat::new(*name, 800, 600))
            .collect()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test_case(1, 1, 1; "single case")]
    #[test_case(2, 3, 4; "full grid")]
    #[test_case(3, 2, 0; "no routes yields empty matrix")]
    fn cardinality_is_product_of_dimensions(browsers: usize, formats_n: usize, routes_n: usize) {
        let browsers: Vec<String> = (0..browsers).map(|i| format!("browser{i}")).collect();
        let formats: Vec<ScreenFormat> = (0..formats_n)
            .map(|i| ScreenFormat::new(format!("format{i}"), 100, 100))
            .collect();
        let routes: Vec<String> = (0..routes_n).map(|i| format!("route/{i}")).collect();

        let cases = expand(&browsers, &formats, &routes);
        assert_eq!(cases.len(), browsers.len() * formats.len() * routes.len());
    }

    #[test]
    fn ordering_is_browser_outer_format_middle_route_inner() {
        let cases = expand(
            &strings(&["chrome", "firefox"]),
            &formats(&["wide", "narrow"]),
            &strings(&["a", "b"]),
        );

        let keys: Vec<(String, String, String)> = cases
            .iter()
            .map(|c| (c.browser.clone(), c.format.name.clone(), c.route.clone()))
            .collect();

        let expected = [
            ("chrome", "wide", "a"),
            ("chrome", "wide", "b"),
            ("chrome", "narrow", "a"),
            ("chrome", "narrow", "b"),
            ("firefox", "wide", "a"),
            ("firefox", "wide", "b"),
            ("firefox", "narrow", "a"),
            ("firefox", "narrow", "b"),
        ];
        let expected: Vec<(String, String, String)> = expected
            .iter()
            .map(|(b, f, r)| (b.to_string(), f.to_string(), r.to_string()))
            .collect();

        assert_eq!(keys, expected);
    }

    #[test_case("app/employee/34", "chrome_wide_app_employee_34"; "forward slashes")]
    #[test_case("demo\\index.html", "chrome_wide_demo_index.html"; "backslashes")]
    #[test_case("", "chrome_wide_index"; "empty route maps to index")]
    #[test_case("home", "chrome_wide_home"; "plain route")]
    fn file_name_sanitizes_route(route: &str, expected: &str) {
        let case = TestCase {
            browser: "chrome".to_string(),
            format: ScreenFormat::new("wide", 800, 600),
            route: route.to_string(),
        };
        assert_eq!(case.file_name(), expected);
    }

    #[test]
    fn file_names_are_unique_across_distinct_tuples() {
        let cases = expand(
            &strings(&["chrome", "firefox"]),
            &formats(&["wide", "narrow"]),
            &strings(&["", "home", "app/x"]),
        );
        let mut names: Vec<String> = cases.iter().map(TestCase::file_name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), cases.len());
    }
}
