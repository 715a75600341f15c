// Environment detection utilities

/// Check whether a visible browser window can be opened
///
/// A display is assumed to be missing when:
/// - SSH_TTY or SSH_CONNECTION is set without X11 forwarding
/// - On Linux: neither DISPLAY nor WAYLAND_DISPLAY is set
///
/// Note: macOS and Windows always have a window server, so only the SSH
/// check applies there
pub fn display_available() -> bool {
    display_available_with(|name| std::env::var_os(name).is_some())
}

fn display_available_with(is_set: impl Fn(&str) -> bool) -> bool {
    let has_x11 = is_set("DISPLAY");
    let has_wayland = is_set("WAYLAND_DISPLAY");

    if (is_set("SSH_TTY") || is_set("SSH_CONNECTION")) && !has_x11 {
        tracing::debug!("No display: SSH session without X11 forwarding");
        return false;
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    {
        if !has_x11 && !has_wayland {
            tracing::debug!("No display: DISPLAY and WAYLAND_DISPLAY not set");
            return false;
        }
    }

    #[cfg(not(all(unix, not(target_os = "macos"))))]
    let _ = has_wayland;

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_vars(vars: &'static [&'static str]) -> impl Fn(&str) -> bool {
        move |name| vars.contains(&name)
    }

    #[test]
    fn test_ssh_without_forwarding_has_no_display() {
        assert!(!display_available_with(with_vars(&["SSH_TTY"])));
        assert!(!display_available_with(with_vars(&["SSH_CONNECTION", "WAYLAND_DISPLAY"])));
    }

    #[test]
    fn test_forwarded_x11_is_a_display() {
        assert!(display_available_with(with_vars(&["SSH_TTY", "DISPLAY"])));
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn test_linux_needs_a_display_server() {
        assert!(!display_available_with(with_vars(&[])));
        assert!(display_available_with(with_vars(&["WAYLAND_DISPLAY"])));
    }
}
