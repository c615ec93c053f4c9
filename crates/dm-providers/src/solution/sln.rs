//! Visual Studio solution file parsing.
//!
//! Only the header line and the `Project(...)` declarations matter here;
//! global sections, configurations, and nesting are ignored.

use std::sync::OnceLock;

use dm_core::ProjectEntry;
use regex::Regex;

/// The line every solution file opens with, followed by the format number.
pub const SOLUTION_HEADER: &str = "Microsoft Visual Studio Solution File, Format Version";

/// Matches one project declaration:
/// `Project("{TYPE}") = "Name", "Relative\Path.csproj", "{GUID}"`.
const PROJECT_PATTERN: &str = r#"^Project\(\s*"\{(?P<type>[^}]*)\}"\s*\)\s*=\s*"(?P<name>[^"]*)"\s*,\s*"(?P<path>[^"]*)"\s*,\s*"\{(?P<guid>[^}]*)\}"\s*$"#;

/// Global cache for the compiled declaration pattern.
static PROJECT_REGEX: OnceLock<Regex> = OnceLock::new();

/// Errors produced while parsing a solution file.
#[derive(Debug, thiserror::Error)]
pub enum SolutionError {
    /// The document does not start with the solution header.
    #[error("missing solution header")]
    MissingHeader,

    /// A `Project(` line does not have the declaration shape.
    #[error("malformed project declaration on line {line}")]
    MalformedProject {
        /// 1-based line number.
        line: usize,
    },

    /// The declaration pattern failed to compile.
    #[error("failed to compile project pattern: {0}")]
    Pattern(#[from] regex::Error),
}

fn project_regex() -> Result<&'static Regex, SolutionError> {
    if let Some(regex) = PROJECT_REGEX.get() {
        return Ok(regex);
    }
    let regex = Regex::new(PROJECT_PATTERN)?;
    Ok(PROJECT_REGEX.get_or_init(|| regex))
}

/// Parses the project declarations of a solution, in declaration order.
///
/// Blank lines and a byte order mark before the header are allowed.
///
/// # Errors
///
/// Returns [`SolutionError`] if the header is missing or a declaration is
/// malformed.
///
/// # Examples
///
/// ```
/// use dm_providers::solution::parse_solution;
///
/// let projects = parse_solution(
///     "Microsoft Visual Studio Solution File, Format Version 12.00\n\
///      Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"App\", \"App\\App.csproj\", \"{11111111-2222-3333-4444-555555555555}\"\n\
///      EndProject\n",
/// )?;
/// assert_eq!(projects[0].name, "App");
/// assert_eq!(projects[0].relative_path, r"App\App.csproj");
/// # Ok::<(), dm_providers::solution::SolutionError>(())
/// ```
pub fn parse_solution(text: &str) -> Result<Vec<ProjectEntry>, SolutionError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line.trim()));

    let has_header = lines
        .by_ref()
        .find(|(_, line)| !line.is_empty())
        .is_some_and(|(_, line)| line.starts_with(SOLUTION_HEADER));
    if !has_header {
        return Err(SolutionError::MissingHeader);
    }

    let regex = project_regex()?;
    let mut projects = Vec::new();
    for (line_number, line) in lines {
        if !line.starts_with("Project(") {
            continue;
        }
        let captures = regex
            .captures(line)
            .ok_or(SolutionError::MalformedProject { line: line_number })?;

        projects.push(ProjectEntry {
            name: captures["name"].to_owned(),
            relative_path: captures["path"].to_owned(),
            type_guid: captures["type"].to_owned(),
            project_guid: captures["guid"].to_owned(),
        });
    }
    Ok(projects)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLUTION: &str = "\u{feff}
Microsoft Visual Studio Solution File, Format Version 12.00
# Visual Studio 15
VisualStudioVersion = 15.0.28307.1000
Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"Widgets\", \"src\\Widgets\\Widgets.csproj\", \"{6F0D5C1A-23B4-4C8E-9A1F-0B2C3D4E5F60}\"
EndProject
Project(\"{2150E333-8FDC-42A3-9474-1A3956D46DE8}\") = \"build\", \"build\", \"{0C1C3A8E-8D4B-4E3A-9F0A-7E9D1D2B6C11}\"
EndProject
Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"Widgets.Tests\", \"tests\\Widgets.Tests\\Widgets.Tests.csproj\", \"{A1B2C3D4-E5F6-4711-8899-AABBCCDDEEFF}\"
	ProjectSection(ProjectDependencies) = postProject
	EndProjectSection
EndProject
Global
	GlobalSection(SolutionConfigurationPlatforms) = preSolution
		Debug|Any CPU = Debug|Any CPU
	EndGlobalSection
EndGlobal
";

    #[test]
    fn test_parse_solution_in_declaration_order() {
        let projects = parse_solution(SOLUTION).unwrap();
        let names: Vec<_> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Widgets", "build", "Widgets.Tests"]);

        assert_eq!(projects[0].relative_path, r"src\Widgets\Widgets.csproj");
        assert_eq!(projects[0].type_guid, "FAE04EC0-301F-11D3-BF4B-00C04F79EFBC");
        assert_eq!(projects[0].project_guid, "6F0D5C1A-23B4-4C8E-9A1F-0B2C3D4E5F60");
        assert!(projects[1].is_solution_folder());
        assert!(!projects[2].is_solution_folder());
    }

    #[test]
    fn test_parse_solution_without_projects() {
        let projects =
            parse_solution("Microsoft Visual Studio Solution File, Format Version 12.00\nGlobal\nEndGlobal\n")
                .unwrap();
        assert!(projects.is_empty());
    }

    #[test]
    fn test_parse_solution_missing_header() {
        let err = parse_solution("<Project />").unwrap_err();
        assert!(matches!(err, SolutionError::MissingHeader));

        let err = parse_solution("").unwrap_err();
        assert!(matches!(err, SolutionError::MissingHeader));
    }

    #[test]
    fn test_parse_solution_malformed_declaration() {
        let text = "Microsoft Visual Studio Solution File, Format Version 12.00\n\
                    Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"Broken\"\n";
        let err = parse_solution(text).unwrap_err();
        assert!(matches!(err, SolutionError::MalformedProject { line: 2 }));
    }
}
