//! Permission handling for the macOS Accessibility API.
//!
//! Reading another application's UI tree requires the process to be trusted
//! under Privacy & Security > Accessibility. These helpers check, request and
//! explain that trust.

use std::process::Command;

/// Settings URL for the Accessibility privacy pane.
pub const ACCESSIBILITY_PREFERENCES_URL: &str =
    "x-apple.systempreferences:com.apple.preference.security?Privacy_Accessibility";

/// Check if accessibility permissions are granted without prompting the user.
///
/// # Examples
///
/// ```no_run
/// use accessibility_extractor::platform::macos::permissions::is_trusted;
///
/// if !is_trusted() {
///     println!("Accessibility permissions are NOT granted.");
/// }
/// ```
pub fn is_trusted() -> bool {
    macos_accessibility_client::accessibility::application_is_trusted()
}

/// Check if accessibility permissions are granted, showing the system prompt if not.
///
/// The prompt is asynchronous, so this may return `false` even though the
/// user grants access a moment later. The process usually has to be
/// restarted before the new trust takes effect.
pub fn is_trusted_with_prompt() -> bool {
    macos_accessibility_client::accessibility::application_is_trusted_with_prompt()
}

/// Open System Settings at the Accessibility pane.
///
/// # Errors
///
/// Returns an `std::io::Error` if the `open` command cannot be spawned.
pub fn open_accessibility_preferences() -> std::io::Result<()> {
    Command::new("open")
        .arg(ACCESSIBILITY_PREFERENCES_URL)
        .spawn()?;
    Ok(())
}

/// Human-readable steps for granting accessibility permissions.
pub fn permission_instructions() -> &'static str {
    r#"
To let Event Sniffer read the text of the active window:

1. Open System Settings (System Preferences on older macOS)
2. Go to Privacy & Security > Accessibility
3. Click the lock icon to make changes if it is shown
4. Enable the terminal or app that runs event-sniffer
5. If it is not listed, click '+' and add it
6. Restart event-sniffer

Until access is granted every scan finds no text.
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_instructions_contain_key_steps() {
        let instructions = permission_instructions();
        assert!(instructions.contains("Privacy & Security"));
        assert!(instructions.contains("Accessibility"));
        assert!(instructions.contains("1."));
        assert!(instructions.to_lowercase().contains("restart"));
    }

    #[test]
    fn test_preferences_url_targets_accessibility_pane() {
        assert!(ACCESSIBILITY_PREFERENCES_URL.starts_with("x-apple.systempreferences:"));
        assert!(ACCESSIBILITY_PREFERENCES_URL.ends_with("Privacy_Accessibility"));
    }
}
