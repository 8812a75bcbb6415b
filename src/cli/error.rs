// Error handling utilities for consistent error messages and exit codes

use std::process;
use crate::error::ConfigError;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing resources, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Print an error returned from `run` and pick the exit code.
///
/// Validation and not-found failures anywhere in the chain are user errors;
/// everything else (store, I/O, config) is internal and gets its causes
/// printed.
pub fn report(err: &anyhow::Error) -> i32 {
    if let Some(config_err) = err.chain().find_map(|e| e.downcast_ref::<ConfigError>()) {
        if config_err.is_user_error() {
            eprintln!("Error: {}", config_err);
            return 1;
        }
    }

    eprintln!("Internal error: {}", err);
    let mut causes = err.chain().skip(1).peekable();
    if causes.peek().is_some() {
        eprintln!("\nCaused by:");
        for (indent, cause) in causes.enumerate() {
            eprintln!("{:indent$}  {}", "", cause, indent = indent + 1);
        }
    }
    2
}

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate that an id is a positive integer
pub fn validate_id(id_str: &str, entity: &str) -> Result<i64, String> {
    id_str.parse::<i64>()
        .map_err(|_| format!("Invalid {} ID: '{}'. {} ID must be a number.", entity.to_lowercase(), id_str, entity))
        .and_then(|id| {
            if id > 0 {
                Ok(id)
            } else {
                Err(format!("Invalid {} ID: {}. {} ID must be positive.", entity.to_lowercase(), id, entity))
            }
        })
}

/// Parse a 1-based list position into a 0-based index
pub fn validate_position(pos_str: &str) -> Result<usize, String> {
    pos_str.parse::<usize>()
        .ok()
        .filter(|p| *p >= 1)
        .map(|p| p - 1)
        .ok_or_else(|| format!("Invalid position: '{}'. Positions start at 1.", pos_str))
}

/// Parse `<id>=<sort order>` pairs used by the reorder commands
pub fn parse_sort_pairs(args: &[String], entity: &str) -> Result<Vec<(String, i64)>, String> {
    if args.is_empty() {
        return Err(format!("At least one {}=<order> pair is required", entity.to_lowercase()));
    }
    args.iter()
        .map(|arg| {
            let (key, order) = arg.split_once('=')
                .ok_or_else(|| format!("Invalid reorder token '{}'. Expected <{}>=<order>.", arg, entity.to_lowercase()))?;
            validate_non_empty(key, entity)?;
            let order = order.parse::<i64>()
                .map_err(|_| format!("Invalid sort order '{}' for '{}'", order, key))?;
            Ok((key.to_string(), order))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationErrors;

    #[test]
    fn test_validate_non_empty() {
        assert!(validate_non_empty("test", "field").is_ok());
        assert!(validate_non_empty("", "field").is_err());
        assert!(validate_non_empty("   ", "field").is_err());
    }

    #[test]
    fn test_validate_id() {
        assert_eq!(validate_id("1", "Task"), Ok(1));
        assert_eq!(validate_id("42", "Task"), Ok(42));
        assert!(validate_id("0", "Task").is_err());
        assert!(validate_id("-1", "Task").is_err());
        let err = validate_id("abc", "Task").unwrap_err();
        assert!(err.contains("Invalid task ID"));
    }

    #[test]
    fn test_validate_position() {
        assert_eq!(validate_position("1"), Ok(0));
        assert_eq!(validate_position("3"), Ok(2));
        assert!(validate_position("0").is_err());
        assert!(validate_position("x").is_err());
    }

    #[test]
    fn test_parse_sort_pairs() {
        let args = vec!["offer=10".to_string(), "3=2".to_string()];
        assert_eq!(
            parse_sort_pairs(&args, "Stage").unwrap(),
            vec![("offer".to_string(), 10), ("3".to_string(), 2)]
        );
        assert!(parse_sort_pairs(&["offer".to_string()], "Stage").is_err());
        assert!(parse_sort_pairs(&["offer=x".to_string()], "Stage").is_err());
        assert!(parse_sort_pairs(&[], "Stage").is_err());
    }

    #[test]
    fn test_report_exit_codes() {
        let user: anyhow::Error = ConfigError::Validation(ValidationErrors::single("Stage name is required")).into();
        assert_eq!(report(&user), 1);

        let missing: anyhow::Error = anyhow::Error::from(ConfigError::not_found("Stage", 3))
            .context("Failed to delete stage");
        assert_eq!(report(&missing), 1);

        let internal = anyhow::anyhow!("Failed to open database");
        assert_eq!(report(&internal), 2);
    }
}
