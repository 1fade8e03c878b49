//! Formatted output helpers for CLI commands.

use peerboot_common::types::ContainerState;

/// Renders a command line that can be pasted into a POSIX shell.
#[must_use]
pub fn format_command(program: &str, args: &[String]) -> String {
    shell_words::join(std::iter::once(program).chain(args.iter().map(String::as_str)))
}

/// Column headings for the status table.
#[must_use]
pub fn status_header() -> String {
    format!("{:<20} {:<10} {:<36} {:<16}", "NAME", "STATE", "IMAGE", "IP")
}

/// One row of the status table.
#[must_use]
pub fn status_row(name: &str, state: &ContainerState) -> String {
    let ip = match state {
        ContainerState::Running { ip: Some(ip), .. } => ip.as_str(),
        _ => "-",
    };
    format!(
        "{:<20} {:<10} {:<36} {:<16}",
        name,
        state.to_string(),
        state.image().unwrap_or("-"),
        ip
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_command_leaves_plain_words_bare() {
        let args = vec!["run".to_string(), "-d".to_string(), "--name".to_string(), "d".to_string()];
        assert_eq!(format_command("docker", &args), "docker run -d --name d");
    }

    #[test]
    fn format_command_quotes_special_words() {
        let args = vec!["a b".to_string(), "it's".to_string()];
        assert_eq!(format_command("docker", &args), r"docker 'a b' 'it'\''s'");
    }

    #[test]
    fn status_row_shows_ip_for_running() {
        let row = status_row(
            "weave",
            &ContainerState::Running {
                image: "weaveworks/weave:latest".into(),
                ip: Some("172.17.0.2".into()),
            },
        );
        assert!(row.starts_with("weave "));
        assert!(row.contains("running"));
        assert!(row.contains("172.17.0.2"));
    }

    #[test]
    fn status_row_absent_uses_placeholders() {
        let row = status_row("weavediscovery", &ContainerState::Absent);
        assert!(row.contains("absent"));
        assert_eq!(row.matches('-').count(), 2);
        assert!(row.trim_end().ends_with('-'));
    }
}
