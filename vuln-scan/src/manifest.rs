//! Dependency manifest parsing (spec §4.5): extracts `{name, ecosystem,
//! cleaned_version}` triples from the lockfile subset this scanner
//! understands. Manifests it can't parse are skipped, not fatal.

use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ecosystem {
    Npm,
    PyPI,
    Go,
}

impl Ecosystem {
    pub fn as_osv_str(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "npm",
            Ecosystem::PyPI => "PyPI",
            Ecosystem::Go => "Go",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub ecosystem: Ecosystem,
    pub cleaned_version: String,
}

/// Strips leading non-digit characters, then keeps only the leading
/// digit/dot run — the version-cleaning rule from spec §4.5 ("cleaned
/// version strips leading non-digit characters and anything from the
/// first non-version char").
pub fn clean_version(raw: &str) -> String {
    let trimmed = raw.trim();
    let after_prefix = trimmed.trim_start_matches(|c: char| !c.is_ascii_digit());
    after_prefix
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

#[derive(Debug, Deserialize)]
struct PackageJson {
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: BTreeMap<String, String>,
}

/// Parses `package.json`-style manifests (npm ecosystem).
pub fn parse_package_json(contents: &str) -> Vec<Dependency> {
    let Ok(parsed) = serde_json::from_str::<PackageJson>(contents) else {
        return Vec::new();
    };
    parsed
        .dependencies
        .into_iter()
        .chain(parsed.dev_dependencies)
        .map(|(name, version)| Dependency {
            name,
            ecosystem: Ecosystem::Npm,
            cleaned_version: clean_version(&version),
        })
        .collect()
}

/// Parses `requirements.txt` (PyPI ecosystem): one `name==version` (or
/// `>=`/`~=`/`<=`) spec per non-comment, non-blank line.
pub fn parse_requirements_txt(contents: &str) -> Vec<Dependency> {
    let mut deps = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
            continue;
        }
        let line = line.split('#').next().unwrap_or(line).trim();
        let split_at = line
            .find(|c| matches!(c, '=' | '>' | '<' | '~' | '!'))
            .unwrap_or(line.len());
        let name = line[..split_at].trim();
        if name.is_empty() {
            continue;
        }
        let version = line[split_at..].trim_start_matches(|c| matches!(c, '=' | '>' | '<' | '~' | '!'));
        deps.push(Dependency {
            name: name.to_string(),
            ecosystem: Ecosystem::PyPI,
            cleaned_version: clean_version(version),
        });
    }
    deps
}

/// Parses the `[project.dependencies]`/`[tool.poetry.dependencies]`
/// surface of `pyproject.toml` well enough to extract name/version pairs
/// without a full TOML parser dependency — line-oriented, tolerant of the
/// common shapes this scanner needs.
pub fn parse_pyproject_toml(contents: &str) -> Vec<Dependency> {
    let mut deps = Vec::new();
    let mut in_deps_array = false;
    let mut in_poetry_table = false;
    for raw_line in contents.lines() {
        let line = raw_line.trim();
        if line.starts_with("dependencies") && line.contains('[') {
            in_deps_array = true;
            in_poetry_table = false;
            continue;
        }
        if line.starts_with("[tool.poetry.dependencies]") {
            in_poetry_table = true;
            in_deps_array = false;
            continue;
        }
        if line.starts_with('[') {
            in_poetry_table = false;
            if !line.starts_with("dependencies") {
                in_deps_array = false;
            }
            continue;
        }
        if in_deps_array {
            if line.contains(']') {
                in_deps_array = false;
            }
            if let Some(spec) = extract_quoted(line) {
                if let Some(dep) = parse_pep508_spec(&spec) {
                    deps.push(dep);
                }
            }
        } else if in_poetry_table {
            if let Some((name, version)) = line.split_once('=') {
                let name = name.trim();
                let version = version.trim().trim_matches(['"', '\'', ' ']);
                if !name.is_empty() && name != "python" {
                    deps.push(Dependency {
                        name: name.to_string(),
                        ecosystem: Ecosystem::PyPI,
                        cleaned_version: clean_version(version),
                    });
                }
            }
        }
    }
    deps
}

fn extract_quoted(line: &str) -> Option<String> {
    let start = line.find(['"', '\''])?;
    let quote = line.as_bytes()[start] as char;
    let rest = &line[start + 1..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string())
}

/// Parses a PEP 508-ish `name>=version` or `name==version` spec string.
fn parse_pep508_spec(spec: &str) -> Option<Dependency> {
    let split_at = spec.find(|c| matches!(c, '=' | '>' | '<' | '~' | '!' | ';'))?;
    let name = spec[..split_at].trim();
    if name.is_empty() {
        return None;
    }
    let rest = spec[split_at..].trim_start_matches(|c| matches!(c, '=' | '>' | '<' | '~' | '!'));
    Some(Dependency {
        name: name.to_string(),
        ecosystem: Ecosystem::PyPI,
        cleaned_version: clean_version(rest),
    })
}

/// Parses `go.mod` `require` directives (single-line and block form).
pub fn parse_go_mod(contents: &str) -> Vec<Dependency> {
    let mut deps = Vec::new();
    let mut in_block = false;
    for raw_line in contents.lines() {
        let line = raw_line.split("//").next().unwrap_or(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("require (") {
            in_block = true;
            continue;
        }
        if in_block && line == ")" {
            in_block = false;
            continue;
        }
        let spec = if in_block {
            line
        } else if let Some(rest) = line.strip_prefix("require ") {
            rest
        } else {
            continue;
        };
        let mut parts = spec.split_whitespace();
        let Some(name) = parts.next() else { continue };
        let Some(version) = parts.next() else { continue };
        deps.push(Dependency {
            name: name.to_string(),
            ecosystem: Ecosystem::Go,
            cleaned_version: clean_version(version),
        });
    }
    deps
}

/// Dispatches on file name to the right parser, given file contents.
pub fn parse_manifest(file_name: &str, contents: &str) -> Vec<Dependency> {
    match file_name {
        "package.json" => parse_package_json(contents),
        "requirements.txt" => parse_requirements_txt(contents),
        "pyproject.toml" => parse_pyproject_toml(contents),
        "go.mod" => parse_go_mod(contents),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleans_caret_and_tilde_prefixes() {
        assert_eq!(clean_version("^4.17.11"), "4.17.11");
        assert_eq!(clean_version("~1.2.3"), "1.2.3");
        assert_eq!(clean_version(">=2.0"), "2.0");
    }

    #[test]
    fn strips_trailing_non_version_chars() {
        assert_eq!(clean_version("1.2.3-beta.1"), "1.2.3");
        assert_eq!(clean_version("v1.2.3"), "1.2.3");
    }

    #[test]
    fn package_json_merges_dependencies_and_dev() {
        let json = r#"{"dependencies":{"lodash":"^4.17.11"},"devDependencies":{"eslint":"~8.0.0"}}"#;
        let deps = parse_package_json(json);
        assert_eq!(deps.len(), 2);
        let lodash = deps.iter().find(|d| d.name == "lodash").unwrap();
        assert_eq!(lodash.cleaned_version, "4.17.11");
        assert_eq!(lodash.ecosystem, Ecosystem::Npm);
    }

    #[test]
    fn requirements_txt_parses_pinned_and_ranged() {
        let contents = "requests==2.31.0\nflask>=2.0,<3.0\n# a comment\n\n-r other.txt\n";
        let deps = parse_requirements_txt(contents);
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].name, "requests");
        assert_eq!(deps[0].cleaned_version, "2.31.0");
        assert_eq!(deps[1].name, "flask");
    }

    #[test]
    fn go_mod_parses_block_requires() {
        let contents = "module example.com/x\n\ngo 1.21\n\nrequire (\n\tgithub.com/foo/bar v1.2.3\n\tgithub.com/baz/qux v0.0.1 // indirect\n)\n";
        let deps = parse_go_mod(contents);
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].name, "github.com/foo/bar");
        assert_eq!(deps[0].cleaned_version, "1.2.3");
        assert_eq!(deps[1].ecosystem, Ecosystem::Go);
    }

    #[test]
    fn pyproject_parses_project_dependencies_array() {
        let contents = "[project]\nname = \"x\"\ndependencies = [\n  \"django>=4.2\",\n  \"requests==2.31.0\",\n]\n";
        let deps = parse_pyproject_toml(contents);
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].name, "django");
        assert_eq!(deps[1].cleaned_version, "2.31.0");
    }
}
