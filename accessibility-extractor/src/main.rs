//! CLI entry point for the accessibility extractor.
//!
//! # Usage
//!
//! ```bash
//! # Check if accessibility permissions are granted
//! ax-extractor --check-permissions
//!
//! # Print the focused text of the frontmost application
//! ax-extractor --focused
//!
//! # Show the system permission prompt
//! ax-extractor --request-permissions
//! ```

use std::env;
use std::process;

use accessibility_extractor::AccessibilityExtractor;

/// CLI command to execute
#[derive(Debug, Clone, PartialEq)]
enum Command {
    /// Check if accessibility permissions are granted
    CheckPermissions,
    /// Show the system permission prompt
    RequestPermissions,
    /// Read the focused text of the frontmost application
    Focused,
    /// Show help message
    Help,
}

/// Parse command line arguments (without the program name).
fn parse_args(args: &[String]) -> Result<Command, String> {
    let Some(first) = args.first() else {
        return Ok(Command::Help);
    };

    match first.as_str() {
        "--check-permissions" | "-c" => Ok(Command::CheckPermissions),
        "--request-permissions" | "-r" => Ok(Command::RequestPermissions),
        "--focused" | "-f" => Ok(Command::Focused),
        "--help" | "-h" => Ok(Command::Help),
        arg => Err(format!("Unknown argument: {}", arg)),
    }
}

fn print_help() {
    println!("ax-extractor - Read the focused text of the frontmost application");
    println!();
    println!("USAGE:");
    println!("    ax-extractor [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --check-permissions      Check if accessibility permissions are granted");
    println!("    -r, --request-permissions    Show the system accessibility prompt");
    println!("    -f, --focused                Print the focused text of the frontmost app");
    println!("    -h, --help                   Print this help message");
    println!();
    println!("OUTPUT:");
    println!("    All output is JSON formatted to stdout.");
    println!("    Errors are written to stderr.");
}

fn print_json(value: &serde_json::Value) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("[AX-EXTRACTOR] Error serializing output: {}", e);
            1
        }
    }
}

fn handle_check_permissions() -> i32 {
    let enabled = AccessibilityExtractor::is_enabled();

    let output = serde_json::json!({
        "enabled": enabled,
        "message": if enabled {
            "Accessibility permissions are granted"
        } else {
            "Accessibility permissions are NOT granted. Please enable in System Settings."
        }
    });

    match print_json(&output) {
        0 if enabled => 0,
        _ => 1,
    }
}

fn handle_request_permissions() -> i32 {
    let enabled = AccessibilityExtractor::request_permissions();
    #[cfg(target_os = "macos")]
    if !enabled {
        use accessibility_extractor::platform::macos::{
            open_accessibility_preferences, permission_instructions,
        };

        eprintln!("{}", permission_instructions());
        if let Err(e) = open_accessibility_preferences() {
            eprintln!("[AX-EXTRACTOR] Could not open System Settings: {}", e);
        }
    }

    let output = serde_json::json!({ "enabled": enabled });
    match print_json(&output) {
        0 if enabled => 0,
        _ => 1,
    }
}

fn handle_focused() -> i32 {
    match AccessibilityExtractor::extract_focused() {
        Ok(focused) => {
            eprintln!(
                "[AX-EXTRACTOR] Read {} characters via {}",
                focused.text.len(),
                focused.origin.as_str()
            );
            let output = serde_json::json!({
                "text": focused.text,
                "origin": focused.origin,
                "length": focused.text.len(),
            });
            print_json(&output)
        }
        Err(e) => {
            eprintln!("[AX-EXTRACTOR] No text found: {}", e);
            1
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information.");
            process::exit(1);
        }
    };

    log::debug!("Executing command: {:?}", command);

    let exit_code = match command {
        Command::CheckPermissions => handle_check_permissions(),
        Command::RequestPermissions => handle_request_permissions(),
        Command::Focused => handle_focused(),
        Command::Help => {
            print_help();
            0
        }
    };

    process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_empty_is_help() {
        assert_eq!(parse_args(&[]), Ok(Command::Help));
    }

    #[test]
    fn test_parse_args_long_and_short_flags() {
        assert_eq!(parse_args(&args(&["--check-permissions"])), Ok(Command::CheckPermissions));
        assert_eq!(parse_args(&args(&["-c"])), Ok(Command::CheckPermissions));
        assert_eq!(parse_args(&args(&["--focused"])), Ok(Command::Focused));
        assert_eq!(parse_args(&args(&["-f"])), Ok(Command::Focused));
        assert_eq!(parse_args(&args(&["-r"])), Ok(Command::RequestPermissions));
    }

    #[test]
    fn test_parse_args_unknown_flag() {
        let err = parse_args(&args(&["--extract"])).unwrap_err();
        assert!(err.contains("Unknown argument"));
    }
}
