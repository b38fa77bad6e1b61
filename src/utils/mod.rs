pub mod error;
pub mod logger;

use std::collections::HashSet;
use std::env;
use std::hash::Hash;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::utils::error::Result;

const PYPI_URL: &str = "https://pypi.org/pypi";

/// Filters a list of paths down to those with the given file extension.
/// The extension may be passed with or without a leading dot.
pub fn filter_files_by_extension(paths: &[String], extension: &str) -> Vec<String> {
    let wanted = extension.trim_start_matches('.');
    paths
        .iter()
        .filter(|path| {
            Path::new(path.as_str())
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == wanted)
        })
        .cloned()
        .collect()
}

fn placeholder_regex() -> Regex {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap()
}

/// Returns the names of all `{PLACEHOLDER}` tokens in a string, in order of
/// appearance, whether or not a matching environment variable exists.
pub fn find_placeholders(input: &str) -> Vec<String> {
    placeholder_regex()
        .captures_iter(input)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Substitutes `{PLACEHOLDER}` tokens with the value of the corresponding
/// environment variable. Placeholders without a set variable are left intact.
pub fn substitute_env_vars(input: &str) -> String {
    placeholder_regex()
        .replace_all(input, |caps: &regex::Captures| match env::var(&caps[1]) {
            Ok(value) => value,
            Err(_) => caps[0].to_string(),
        })
        .into_owned()
}

/// Converts a camelCase or PascalCase string to snake_case, keeping acronym
/// runs together (getHTTPResponseCode -> get_http_response_code).
pub fn camel_to_snake(input: &str) -> String {
    let first = Regex::new(r"(.)([A-Z][a-z]+)").unwrap();
    let second = Regex::new(r"([a-z0-9])([A-Z])").unwrap();

    let pass = first.replace_all(input, "${1}_${2}");
    second.replace_all(&pass, "${1}_${2}").to_lowercase()
}

/// Checks that the key extracted from every config entry is unique across the list.
pub fn config_uniqueness_check<T, K, F>(configs: &[T], key_fn: F) -> bool
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    configs.iter().all(|config| seen.insert(key_fn(config)))
}

#[derive(Debug, Deserialize)]
struct PackageInfo {
    version: String,
}

#[derive(Debug, Deserialize)]
struct PackageResponse {
    info: PackageInfo,
}

/// Looks up the latest released version of a package on PyPI. Generated
/// workloads pin the platform package to this version.
pub async fn get_latest_package_version(package_name: &str) -> Result<String> {
    get_latest_package_version_from(PYPI_URL, package_name).await
}

pub async fn get_latest_package_version_from(index_url: &str, package_name: &str) -> Result<String> {
    let url = format!("{index_url}/{package_name}/json");
    let response = reqwest::get(&url).await?.error_for_status()?;
    let package: PackageResponse = response.json().await?;
    Ok(package.info.version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_files_by_extension() {
        let paths: Vec<String> = [
            "test1.csv", "test2.txt", "test3.csv", "test4.doc", "test5.pdf", "test6", "test7/csv",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        assert_eq!(filter_files_by_extension(&paths, "csv"), vec!["test1.csv", "test3.csv"]);
        assert_eq!(filter_files_by_extension(&paths, "txt"), vec!["test2.txt"]);
        assert_eq!(filter_files_by_extension(&paths, ".pdf"), vec!["test5.pdf"]);
    }

    #[test]
    fn test_find_placeholders() {
        assert_eq!(
            find_placeholders("abfss://raw@{ADLS_ACCOUNT}.dfs.core.windows.net/table_name"),
            vec!["ADLS_ACCOUNT"]
        );
        assert_eq!(find_placeholders("abcd{VAR_ONE}{VAR_TWO}"), vec!["VAR_ONE", "VAR_TWO"]);
        assert!(find_placeholders("no placeholders here").is_empty());
    }

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("STACKS_TEST_VAR1", "value1");
        std::env::set_var("STACKS_TEST_VAR2", "value2");

        let input = "{STACKS_TEST_VAR1}_{STACKS_TEST_VAR2}_{STACKS_NONEXISTENT_VAR}";
        assert_eq!(substitute_env_vars(input), "value1_value2_{STACKS_NONEXISTENT_VAR}");
    }

    #[test]
    fn test_camel_to_snake() {
        assert_eq!(camel_to_snake("camelCase"), "camel_case");
        assert_eq!(camel_to_snake("CamelCase"), "camel_case");
        assert_eq!(camel_to_snake("CamelCamelCase"), "camel_camel_case");
        assert_eq!(camel_to_snake("Camel2Camel2Case"), "camel2_camel2_case");
        assert_eq!(camel_to_snake("getHTTPResponseCode"), "get_http_response_code");
        assert_eq!(camel_to_snake("get2HTTP"), "get2_http");
        assert_eq!(camel_to_snake("HTTPResponseCode"), "http_response_code");
        assert_eq!(camel_to_snake("noChange"), "no_change");
        assert_eq!(camel_to_snake(""), "");
    }

    #[test]
    fn test_config_uniqueness_check() {
        let unique = vec![("a", 1), ("b", 2), ("c", 3)];
        assert!(config_uniqueness_check(&unique, |entry| entry.0));

        let duplicated = vec![("a", 1), ("b", 2), ("a", 3)];
        assert!(!config_uniqueness_check(&duplicated, |entry| entry.0));
    }
}
