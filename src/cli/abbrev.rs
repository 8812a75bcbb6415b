// Command abbreviation matching for the senko CLI

/// Find all commands that start with the given prefix (case-insensitive)
pub fn find_matching_commands<'a>(prefix: &str, commands: &'a [&str]) -> Vec<&'a str> {
    let prefix_lower = prefix.to_lowercase();
    commands.iter()
        .filter(|cmd| cmd.to_lowercase().starts_with(&prefix_lower))
        .copied()
        .collect()
}

/// Find a unique command match for the given prefix
/// Returns Ok(command) if exactly one match, Err(matches) if ambiguous, Err(empty) if no match
/// Exact matches take precedence over prefix matches
pub fn find_unique_command<'a>(prefix: &str, commands: &'a [&str]) -> Result<&'a str, Vec<&'a str>> {
    let prefix_lower = prefix.to_lowercase();
    if let Some(cmd) = commands.iter().find(|cmd| cmd.to_lowercase() == prefix_lower) {
        return Ok(*cmd);
    }

    let matches = find_matching_commands(prefix, commands);
    if matches.len() == 1 {
        Ok(matches[0])
    } else {
        Err(matches)
    }
}

/// Top-level commands
pub const TOP_LEVEL_COMMANDS: &[&str] = &[
    "stages", "tasks", "statuses", "summary", "check", "export", "init", "help"
];

pub const STAGE_COMMANDS: &[&str] = &[
    "list", "show", "add", "modify", "delete", "restore", "reorder"
];

pub const TASK_COMMANDS: &[&str] = &[
    "list", "add", "modify", "delete", "reorder", "template"
];

pub const STATUS_COMMANDS: &[&str] = &[
    "list", "add", "modify", "remove", "move", "template", "validate"
];

/// Get subcommands for a given top-level command
pub fn get_subcommands(command: &str) -> Option<&'static [&'static str]> {
    match command {
        "stages" => Some(STAGE_COMMANDS),
        "tasks" => Some(TASK_COMMANDS),
        "statuses" => Some(STATUS_COMMANDS),
        _ => None,
    }
}

fn is_candidate(arg: &str) -> bool {
    !arg.starts_with('-') && !arg.contains('=') && arg.parse::<i64>().is_err()
}

/// Expand command abbreviations in the argument list.
///
/// Only the first argument and, for commands with subcommands, the second
/// are expanded; everything after passes through untouched. Unknown words
/// also pass through so clap can report them.
pub fn expand_command_abbreviations(args: Vec<String>) -> Result<Vec<String>, String> {
    let mut args = args.into_iter();
    let mut expanded = Vec::new();

    let Some(first) = args.next() else {
        return Ok(expanded);
    };
    if !is_candidate(&first) {
        expanded.push(first);
        expanded.extend(args);
        return Ok(expanded);
    }

    let command = match find_unique_command(&first, TOP_LEVEL_COMMANDS) {
        Ok(full) => full.to_string(),
        Err(matches) if matches.is_empty() => first,
        Err(matches) => {
            return Err(format!(
                "Ambiguous command '{}'. Did you mean one of: {}?",
                first,
                matches.join(", ")
            ));
        }
    };

    if let Some(subcommands) = get_subcommands(&command) {
        expanded.push(command);
        if let Some(second) = args.next() {
            if is_candidate(&second) {
                match find_unique_command(&second, subcommands) {
                    Ok(full) => expanded.push(full.to_string()),
                    Err(matches) if matches.is_empty() => expanded.push(second),
                    Err(matches) => {
                        return Err(format!(
                            "Ambiguous subcommand '{}'. Did you mean one of: {}?",
                            second,
                            matches.join(", ")
                        ));
                    }
                }
            } else {
                expanded.push(second);
            }
        }
    } else {
        expanded.push(command);
    }

    expanded.extend(args);
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_find_matching_commands() {
        assert_eq!(find_matching_commands("st", TOP_LEVEL_COMMANDS), vec!["stages", "statuses"]);
        assert_eq!(find_matching_commands("SU", TOP_LEVEL_COMMANDS), vec!["summary"]);
        assert!(find_matching_commands("x", TOP_LEVEL_COMMANDS).is_empty());
    }

    #[test]
    fn test_find_unique_command() {
        assert_eq!(find_unique_command("stag", TOP_LEVEL_COMMANDS), Ok("stages"));
        assert_eq!(find_unique_command("stat", TOP_LEVEL_COMMANDS), Ok("statuses"));
        assert_eq!(find_unique_command("e", TOP_LEVEL_COMMANDS), Ok("export"));

        let matches = find_unique_command("s", TOP_LEVEL_COMMANDS).unwrap_err();
        assert_eq!(matches.len(), 3);
    }

    #[test]
    fn test_expand_command_abbreviations() {
        assert_eq!(
            expand_command_abbreviations(strings(&["su", "--json"])),
            Ok(strings(&["summary", "--json"]))
        );
        assert_eq!(
            expand_command_abbreviations(strings(&["stag", "mod", "offer", "display=内定"])),
            Ok(strings(&["stages", "modify", "offer", "display=内定"]))
        );
        assert_eq!(
            expand_command_abbreviations(strings(&["stat", "mov", "first_interview", "passed", "2"])),
            Ok(strings(&["statuses", "move", "first_interview", "passed", "2"]))
        );

        let err = expand_command_abbreviations(strings(&["st", "list"])).unwrap_err();
        assert!(err.contains("Ambiguous command"));

        let err = expand_command_abbreviations(strings(&["stages", "re", "1"])).unwrap_err();
        assert!(err.contains("Ambiguous subcommand"));
        assert!(err.contains("restore, reorder"));
    }

    #[test]
    fn test_arguments_pass_through() {
        // Only command positions are expanded; "add" here is a stage name
        assert_eq!(
            expand_command_abbreviations(strings(&["tasks", "list", "add"])),
            Ok(strings(&["tasks", "list", "add"]))
        );
        assert_eq!(
            expand_command_abbreviations(strings(&["--version"])),
            Ok(strings(&["--version"]))
        );
        assert_eq!(
            expand_command_abbreviations(strings(&["frobnicate"])),
            Ok(strings(&["frobnicate"]))
        );
        assert_eq!(
            expand_command_abbreviations(strings(&["tasks", "--help"])),
            Ok(strings(&["tasks", "--help"]))
        );
    }
}
