use git_version::git_version;

// include -modified if the working tree has uncommitted changes
const COMMIT: &str = git_version!(
    args = ["--abbrev=10", "--always", "--dirty=-modified"],
    fallback = "unknown"
);

/// Version string assembled from the tags `build.rs` exports.
fn version_label(release: Option<&str>, latest: &str, ahead: &str) -> String {
    match release {
        Some(tag) if !tag.is_empty() => format!("release {tag}"),
        _ if !latest.is_empty() && !ahead.is_empty() => {
            format!("{ahead} commits ahead of {latest}")
        }
        _ if !latest.is_empty() => format!("ahead of {latest}"),
        _ => "development".to_string(),
    }
}

/// One-line-per-fact build description, logged at startup.
pub fn get_system_info() -> String {
    let profile = if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    };
    let version = version_label(
        option_env!("RELEASE_VERSION"),
        option_env!("LATEST_TAG").unwrap_or(""),
        option_env!("COMMITS_AHEAD").unwrap_or(""),
    );

    format!(
        "{} {} ({version})\ncommit {COMMIT}\n{profile} build",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    )
}
